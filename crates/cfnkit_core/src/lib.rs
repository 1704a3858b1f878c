//! # cfnkit_core
//!
//! Validated builder drafts, deferred references and document rendering.
//!
//! Builders accumulate fields into a [`Draft`] and check them with a
//! [`RequiredFields`] checklist when they finalize. Finalized resources are
//! collected in a [`Document`], which resolves every [`Reference`] when it
//! renders.
//!
//! ## Example
//!
//! ```rust
//! use cfnkit_core::{Document, OutputBuilder, ParameterBuilder, ParameterType, Reference};
//!
//! let parameter = ParameterBuilder::new()
//!     .name("DeployLambdaFunction")
//!     .description("Lambda Function Name to run in Deploy Stage")
//!     .parameter_type(ParameterType::String)
//!     .build()
//!     .unwrap();
//!
//! let output = OutputBuilder::new()
//!     .name("DeployTarget")
//!     .value(Reference::name("DeployLambdaFunction"))
//!     .build()
//!     .unwrap();
//!
//! let mut doc = Document::new();
//! doc.add_parameter(parameter).unwrap();
//! doc.add_output(output).unwrap();
//! println!("{}", doc.render().unwrap());
//! ```

pub mod config;
pub mod document;
pub mod draft;
pub mod error;
pub mod output;
pub mod parameter;
pub mod reference;
pub mod required;
pub mod value;

pub use config::{Format, RenderConfig, MAX_INDENT};
pub use document::{is_valid_logical_name, Document, Resource, ResourceEntry};
pub use draft::{Draft, DraftState};
pub use error::{CfnError, CfnResult};
pub use output::{Output, OutputBuilder};
pub use parameter::{Parameter, ParameterBuilder, ParameterType};
pub use reference::{Reference, PSEUDO_PARAMETER_PREFIX, STACK_NAME_TOKEN};
pub use required::RequiredFields;
pub use value::{Properties, Value};
