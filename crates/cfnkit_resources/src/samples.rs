//! Bundled sample documents.

use serde::{Deserialize, Serialize};
use tracing::debug;

use cfnkit_core::{
    CfnResult, Document, OutputBuilder, ParameterBuilder, ParameterType, Reference, RenderConfig,
};

use crate::awslambda::{FunctionBuilder, Runtime};
use crate::codebuild::{
    ArtifactsType, BuildArtifactsBuilder, BuildEnvironmentBuilder, BuildSourceBuilder,
    ComputeType, EnvironmentType, Project, ProjectBuilder, SourceType,
};
use crate::codepipeline::{
    ActionBuilder, ActionTypeIdBuilder, PipelineBuilder, Stage, StageBuilder,
};
use crate::iam::policies::{assume_role_policy, codepipeline_service_policy};
use crate::iam::{Role, RoleBuilder};
use crate::s3::{AccessControl, Bucket, BucketBuilder};

const ELM_APP_NAME: &str = "ExampleElmAppBuilder";
const ELM_BUILD_SPEC: &str = "version: 0.2

phases:
  build:
    commands:
      - elm-make Main.elm --yes
artifacts:
  files:
    - index.html
";

const LAMBDA_BASIC_EXECUTION_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// A named sample document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sample {
    Codebuild,
    Lambda,
    Role,
    Parameter,
    Pipeline,
    Website,
}

impl Sample {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sample::Codebuild => "codebuild",
            Sample::Lambda => "lambda",
            Sample::Role => "role",
            Sample::Parameter => "parameter",
            Sample::Pipeline => "pipeline",
            Sample::Website => "website",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "codebuild" => Some(Sample::Codebuild),
            "lambda" => Some(Sample::Lambda),
            "role" => Some(Sample::Role),
            "parameter" => Some(Sample::Parameter),
            "pipeline" => Some(Sample::Pipeline),
            "website" => Some(Sample::Website),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Sample::Codebuild,
            Sample::Lambda,
            Sample::Role,
            Sample::Parameter,
            Sample::Pipeline,
            Sample::Website,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Sample::Codebuild => "CodeBuild project that compiles an Elm app",
            Sample::Lambda => "Inline Node.js function with its execution role",
            Sample::Role => "CodePipeline service role with the one-click policy",
            Sample::Parameter => "String parameter naming the deploy Lambda function",
            Sample::Pipeline => "Source, build and deploy pipeline for the Elm app",
            Sample::Website => "Public-read bucket serving a static website",
        }
    }

    /// Build with default render settings.
    pub fn build(&self) -> CfnResult<Document> {
        self.build_with(RenderConfig::default())
    }

    /// Build with `config`. The sample's own description fills in when
    /// `config` has none.
    pub fn build_with(&self, config: RenderConfig) -> CfnResult<Document> {
        debug!("Building sample document {}", self);

        let mut doc = Document::new().with_config(config);
        if doc.config().description.is_none() {
            doc = doc.with_description(self.description());
        }

        match self {
            Sample::Codebuild => codebuild(&mut doc)?,
            Sample::Lambda => lambda(&mut doc)?,
            Sample::Role => role(&mut doc)?,
            Sample::Parameter => parameter(&mut doc)?,
            Sample::Pipeline => pipeline(&mut doc)?,
            Sample::Website => website(&mut doc)?,
        }
        Ok(doc)
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn codebuild_role() -> CfnResult<Role> {
    RoleBuilder::new()
        .name("ExampleCodeBuildRole")
        .assume_role_policy(assume_role_policy("codebuild.amazonaws.com")?)
        .add_managed_policy_arn("arn:aws:iam::aws:policy/AWSCodeBuildDeveloperAccess")
        .build()
}

fn elm_project(role: &Role) -> CfnResult<Project> {
    let environment = BuildEnvironmentBuilder::new()
        .compute_type(ComputeType::Small)
        .image("emmanuelrosa/elm-base")
        .environment_type(EnvironmentType::LinuxContainer)
        .add_environment_variable("APP_NAME", ELM_APP_NAME)
        .build()?;
    let source = BuildSourceBuilder::new()
        .source_type(SourceType::CodePipeline)
        .build_spec(ELM_BUILD_SPEC)
        .build()?;
    let artifacts = BuildArtifactsBuilder::new()
        .artifacts_type(ArtifactsType::CodePipeline)
        .build()?;

    ProjectBuilder::new()
        .name(ELM_APP_NAME)
        .environment(environment)
        .source(source)
        .artifacts(artifacts)
        .service_role(role)
        .build()
}

fn codebuild(doc: &mut Document) -> CfnResult<()> {
    let role = codebuild_role()?;
    let project = elm_project(&role)?;
    doc.add_resource(&role)?.add_resource(&project)?;
    Ok(())
}

fn lambda(doc: &mut Document) -> CfnResult<()> {
    let role = RoleBuilder::new()
        .name("ExampleLambdaRole")
        .assume_role_policy(assume_role_policy("lambda.amazonaws.com")?)
        .add_managed_policy_arn(LAMBDA_BASIC_EXECUTION_ARN)
        .build()?;

    let function = FunctionBuilder::new()
        .name("ExampleHelloFunction")
        .source_code([
            "exports.handler = async (event) => {\n",
            "  return { statusCode: 200, body: process.env.GREETING };\n",
            "};\n",
        ])
        .handler("index.handler")
        .role(&role)
        .runtime(Runtime::Nodejs20x)
        .memory(256)
        .timeout(30)
        .add_environment_variable("GREETING", "hello")
        .build()?;

    let output = OutputBuilder::new()
        .name("ExampleHelloFunctionArn")
        .description("ARN of the hello function")
        .value(function.arn())
        .export_name(Reference::substitution("ExampleHelloFunctionArn", "-"))
        .build()?;

    doc.add_resource(&role)?
        .add_resource(&function)?
        .add_output(output)?;
    Ok(())
}

fn pipeline_role() -> CfnResult<Role> {
    RoleBuilder::new()
        .name("ExamplePipelineRole")
        .assume_role_policy(assume_role_policy("codepipeline.amazonaws.com")?)
        .add_policy("CodePipelineServicePolicy", codepipeline_service_policy()?)
        .build()
}

fn role(doc: &mut Document) -> CfnResult<()> {
    doc.add_resource(&pipeline_role()?)?;
    Ok(())
}

fn parameter(doc: &mut Document) -> CfnResult<()> {
    let parameter = ParameterBuilder::new()
        .name("DeployLambdaFunction")
        .description("Lambda Function Name to run in Deploy Stage")
        .parameter_type(ParameterType::String)
        .build()?;
    doc.add_parameter(parameter)?;
    Ok(())
}

fn source_stage(repo: &str, branch: &str) -> CfnResult<Stage> {
    let action_type = ActionTypeIdBuilder::new().code_commit_source("1").build()?;
    let action = ActionBuilder::new()
        .name("ExampleSourceAction")
        .action_type(action_type)
        .configuration_entry("BranchName", branch)
        .configuration_entry("RepositoryName", repo)
        .add_output_artifact("ElmCodeOutput")
        .build()?;

    StageBuilder::new()
        .name("ExampleSourceStage")
        .add_action(action)
        .build()
}

fn build_stage(project: &Project) -> CfnResult<Stage> {
    let action_type = ActionTypeIdBuilder::new().code_build("1").build()?;
    let action = ActionBuilder::new()
        .name("ExampleBuildAction")
        .action_type(action_type)
        .configuration_entry("ProjectName", Reference::name(project.name()))
        .add_input_artifact("ElmCodeOutput")
        .add_output_artifact("ElmBuildOutput")
        .build()?;

    StageBuilder::new()
        .name("ExampleBuildStage")
        .add_action(action)
        .build()
}

fn deploy_stage(site: &Bucket) -> CfnResult<Stage> {
    let action_type = ActionTypeIdBuilder::new().s3_deploy("1").build()?;
    let action = ActionBuilder::new()
        .name("ExampleDeployAction")
        .action_type(action_type)
        .configuration_entry("BucketName", site.reference())
        .configuration_entry("Extract", "true")
        .add_input_artifact("ElmBuildOutput")
        .build()?;

    StageBuilder::new()
        .name("ExampleDeployStage")
        .add_action(action)
        .build()
}

fn website_bucket() -> CfnResult<Bucket> {
    BucketBuilder::static_website()
        .name("ExampleWebsite")
        .access_control(AccessControl::PublicRead)
        .error_document("error.html")
        .build()
}

fn pipeline(doc: &mut Document) -> CfnResult<()> {
    let artifacts = BucketBuilder::new()
        .name("ExampleArtifactBucket")
        .access_control(AccessControl::Private)
        .build()?;
    let site = website_bucket()?;
    let build_role = codebuild_role()?;
    let project = elm_project(&build_role)?;
    let role = pipeline_role()?;

    let pipeline = PipelineBuilder::new()
        .name("ExampleElmPipeline")
        .role(&role)
        .artifact_store(&artifacts)
        .add_stage(source_stage("user/exampleRepoName", "master")?)
        .add_stage(build_stage(&project)?)
        .add_stage(deploy_stage(&site)?)
        .disable_inbound_transition(
            "ExampleDeployStage",
            "Deploys are released by hand",
        )
        .build()?;

    doc.add_resource(&artifacts)?
        .add_resource(&site)?
        .add_resource(&build_role)?
        .add_resource(&project)?
        .add_resource(&role)?
        .add_resource(&pipeline)?;
    Ok(())
}

fn website(doc: &mut Document) -> CfnResult<()> {
    let site = website_bucket()?;
    let url = OutputBuilder::new()
        .name("ExampleWebsiteURL")
        .description("URL of the static website")
        .value(Reference::attribute(site.name(), "WebsiteURL"))
        .build()?;

    doc.add_resource(&site)?.add_output(url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnkit_core::Format;

    #[test]
    fn test_names_round_trip() {
        for sample in Sample::all() {
            assert_eq!(Sample::from_str(sample.as_str()), Some(sample));
        }
        assert_eq!(Sample::from_str("PIPELINE"), Some(Sample::Pipeline));
        assert_eq!(Sample::from_str("ec2"), None);
    }

    #[test]
    fn test_every_sample_renders() {
        for sample in Sample::all() {
            let doc = sample.build().unwrap();
            assert!(doc.render().is_ok(), "{} failed to render", sample);
            assert!(doc.render_as(Format::Yaml).is_ok(), "{} failed as YAML", sample);
        }
    }

    #[test]
    fn test_sample_description_yields_to_config() {
        let doc = Sample::Parameter
            .build_with(RenderConfig::default().with_description("Deploy inputs"))
            .unwrap();
        assert_eq!(doc.config().description.as_deref(), Some("Deploy inputs"));

        let doc = Sample::Parameter.build().unwrap();
        assert_eq!(
            doc.config().description.as_deref(),
            Some(Sample::Parameter.description())
        );
    }

    #[test]
    fn test_codebuild_sample_matches_elm_project() {
        let tree = Sample::Codebuild.build().unwrap().resolve().unwrap();
        let project = &tree["Resources"][ELM_APP_NAME];

        assert_eq!(project["Type"], "AWS::CodeBuild::Project");
        let env = &project["Properties"]["Environment"];
        assert_eq!(env["Image"], "emmanuelrosa/elm-base");
        assert_eq!(env["ComputeType"], "BUILD_GENERAL1_SMALL");
        assert_eq!(
            env["EnvironmentVariables"][0],
            serde_json::json!({ "Name": "APP_NAME", "Value": ELM_APP_NAME })
        );
        assert_eq!(project["Properties"]["Source"]["BuildSpec"], ELM_BUILD_SPEC);
    }

    #[test]
    fn test_pipeline_sample_stages() {
        let tree = Sample::Pipeline.build().unwrap().resolve().unwrap();
        let props = &tree["Resources"]["ExampleElmPipeline"]["Properties"];

        let stages: Vec<_> = props["Stages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["Name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            stages,
            vec!["ExampleSourceStage", "ExampleBuildStage", "ExampleDeployStage"]
        );
        assert_eq!(
            props["Stages"][0]["Actions"][0]["Configuration"]["RepositoryName"],
            "user/exampleRepoName"
        );
    }
}
