//! # cfnkit_resources
//!
//! Builders for the AWS resources cfnkit knows how to render: Lambda
//! functions, CodeBuild projects, CodePipeline pipelines, IAM roles and
//! policies, and S3 buckets.
//!
//! Leaf builders are finalized first and their results handed to the
//! composite builders that contain them. Cross-resource links are stored as
//! [`cfnkit_core::Reference`]s and checked when the document renders.
//!
//! ## Example
//!
//! ```rust
//! use cfnkit_core::Document;
//! use cfnkit_resources::s3::{AccessControl, BucketBuilder};
//!
//! let bucket = BucketBuilder::new()
//!     .name("site-bucket")
//!     .access_control(AccessControl::PublicRead)
//!     .build()
//!     .unwrap();
//!
//! let mut doc = Document::new();
//! doc.add_resource(&bucket).unwrap();
//! assert!(doc.render().unwrap().contains("\"PublicRead\""));
//! ```

pub mod awslambda;
pub mod codebuild;
pub mod codepipeline;
pub mod iam;
pub mod s3;
pub mod samples;

pub use awslambda::{Function, FunctionBuilder, Runtime};
pub use codebuild::{Project, ProjectBuilder};
pub use codepipeline::{Action, ActionBuilder, Pipeline, PipelineBuilder, Stage, StageBuilder};
pub use iam::{PolicyDocument, PolicyStatement, Role, RoleBuilder};
pub use s3::{AccessControl, Bucket, BucketBuilder};
pub use samples::Sample;
