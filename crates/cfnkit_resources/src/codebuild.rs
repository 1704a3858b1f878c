//! CodeBuild projects and their environment, source and artifacts.

use serde::{Deserialize, Serialize};

use cfnkit_core::{
    CfnError, CfnResult, Draft, Properties, Reference, RequiredFields, Resource, Value,
};

use crate::iam::Role;

/// Build host size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeType {
    Small,
    Medium,
    Large,
    XLarge2,
}

impl ComputeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeType::Small => "BUILD_GENERAL1_SMALL",
            ComputeType::Medium => "BUILD_GENERAL1_MEDIUM",
            ComputeType::Large => "BUILD_GENERAL1_LARGE",
            ComputeType::XLarge2 => "BUILD_GENERAL1_2XLARGE",
        }
    }
}

/// Build container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentType {
    LinuxContainer,
    LinuxGpuContainer,
    ArmContainer,
    WindowsServer2019Container,
}

impl EnvironmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentType::LinuxContainer => "LINUX_CONTAINER",
            EnvironmentType::LinuxGpuContainer => "LINUX_GPU_CONTAINER",
            EnvironmentType::ArmContainer => "ARM_CONTAINER",
            EnvironmentType::WindowsServer2019Container => "WINDOWS_SERVER_2019_CONTAINER",
        }
    }
}

/// Where the build reads its source from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    CodePipeline,
    CodeCommit,
    GitHub,
    S3,
    NoSource,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::CodePipeline => "CODEPIPELINE",
            SourceType::CodeCommit => "CODECOMMIT",
            SourceType::GitHub => "GITHUB",
            SourceType::S3 => "S3",
            SourceType::NoSource => "NO_SOURCE",
        }
    }
}

/// Where the build writes its artifacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactsType {
    CodePipeline,
    S3,
    NoArtifacts,
}

impl ArtifactsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactsType::CodePipeline => "CODEPIPELINE",
            ArtifactsType::S3 => "S3",
            ArtifactsType::NoArtifacts => "NO_ARTIFACTS",
        }
    }
}

/// A finalized build environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    compute_type: ComputeType,
    image: String,
    environment_type: EnvironmentType,
    variables: Vec<(String, String)>,
}

impl BuildEnvironment {
    pub fn builder() -> BuildEnvironmentBuilder {
        BuildEnvironmentBuilder::new()
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn to_value(&self) -> Value {
        let variables = self
            .variables
            .iter()
            .map(|(name, value)| Value::map([("Name", name.clone()), ("Value", value.clone())]))
            .collect();
        Value::map([
            ("ComputeType", Value::from(self.compute_type.as_str())),
            ("Image", Value::from(self.image.clone())),
            ("Type", Value::from(self.environment_type.as_str())),
            ("EnvironmentVariables", Value::List(variables)),
        ])
    }
}

#[derive(Debug, Default)]
struct EnvironmentDraft {
    compute_type: Option<ComputeType>,
    image: Option<String>,
    environment_type: Option<EnvironmentType>,
    variables: Vec<(String, String)>,
}

/// Builder for [`BuildEnvironment`].
#[derive(Debug)]
pub struct BuildEnvironmentBuilder {
    draft: Draft<EnvironmentDraft>,
}

impl BuildEnvironmentBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("BuildEnvironmentBuilder"),
        }
    }

    pub fn compute_type(&mut self, compute_type: ComputeType) -> &mut Self {
        self.draft
            .update("compute_type", |d| d.compute_type = Some(compute_type));
        self
    }

    pub fn image(&mut self, image: impl Into<String>) -> &mut Self {
        let image = image.into();
        self.draft.update("image", |d| d.image = Some(image));
        self
    }

    pub fn environment_type(&mut self, environment_type: EnvironmentType) -> &mut Self {
        self.draft
            .update("environment_type", |d| d.environment_type = Some(environment_type));
        self
    }

    pub fn add_environment_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let variable = (name.into(), value.into());
        self.draft
            .update("add_environment_variable", |d| d.variables.push(variable));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<BuildEnvironment> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("BuildEnvironmentBuilder")
                .check("compute_type", &d.compute_type)
                .check("image", &d.image)
                .check("environment_type", &d.environment_type);
            let (Some(compute_type), Some(image), Some(environment_type)) =
                (d.compute_type, d.image, d.environment_type)
            else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(BuildEnvironment {
                compute_type,
                image,
                environment_type,
                variables: d.variables,
            })
        })
    }
}

impl Default for BuildEnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized build source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSource {
    source_type: SourceType,
    build_spec: String,
    location: Option<String>,
}

impl BuildSource {
    pub fn builder() -> BuildSourceBuilder {
        BuildSourceBuilder::new()
    }

    pub fn build_spec(&self) -> &str {
        &self.build_spec
    }

    pub fn to_value(&self) -> Value {
        let mut body = Properties::new();
        body.insert("Type".to_string(), self.source_type.as_str().into());
        body.insert("BuildSpec".to_string(), self.build_spec.clone().into());
        if let Some(location) = &self.location {
            body.insert("Location".to_string(), location.clone().into());
        }
        Value::Map(body)
    }
}

#[derive(Debug, Default)]
struct SourceDraft {
    source_type: Option<SourceType>,
    build_spec: Option<String>,
    location: Option<String>,
}

/// Builder for [`BuildSource`].
#[derive(Debug)]
pub struct BuildSourceBuilder {
    draft: Draft<SourceDraft>,
}

impl BuildSourceBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("BuildSourceBuilder"),
        }
    }

    pub fn source_type(&mut self, source_type: SourceType) -> &mut Self {
        self.draft
            .update("source_type", |d| d.source_type = Some(source_type));
        self
    }

    /// Inline buildspec YAML.
    pub fn build_spec(&mut self, build_spec: impl Into<String>) -> &mut Self {
        let build_spec = build_spec.into();
        self.draft
            .update("build_spec", |d| d.build_spec = Some(build_spec));
        self
    }

    pub fn location(&mut self, location: impl Into<String>) -> &mut Self {
        let location = location.into();
        self.draft.update("location", |d| d.location = Some(location));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<BuildSource> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("BuildSourceBuilder")
                .check("source_type", &d.source_type)
                .check("build_spec", &d.build_spec);
            let (Some(source_type), Some(build_spec)) = (d.source_type, d.build_spec) else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(BuildSource {
                source_type,
                build_spec,
                location: d.location,
            })
        })
    }
}

impl Default for BuildSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Finalized build artifacts settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifacts {
    artifacts_type: ArtifactsType,
}

impl BuildArtifacts {
    pub fn builder() -> BuildArtifactsBuilder {
        BuildArtifactsBuilder::new()
    }

    pub fn to_value(&self) -> Value {
        Value::map([("Type", self.artifacts_type.as_str())])
    }
}

#[derive(Debug, Default)]
struct ArtifactsDraft {
    artifacts_type: Option<ArtifactsType>,
}

/// Builder for [`BuildArtifacts`].
#[derive(Debug)]
pub struct BuildArtifactsBuilder {
    draft: Draft<ArtifactsDraft>,
}

impl BuildArtifactsBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("BuildArtifactsBuilder"),
        }
    }

    pub fn artifacts_type(&mut self, artifacts_type: ArtifactsType) -> &mut Self {
        self.draft
            .update("artifacts_type", |d| d.artifacts_type = Some(artifacts_type));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<BuildArtifacts> {
        self.draft.finalize(|d| {
            let required =
                RequiredFields::new("BuildArtifactsBuilder").check("artifacts_type", &d.artifacts_type);
            let Some(artifacts_type) = d.artifacts_type else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(BuildArtifacts { artifacts_type })
        })
    }
}

impl Default for BuildArtifactsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized CodeBuild project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    environment: BuildEnvironment,
    source: BuildSource,
    artifacts: BuildArtifacts,
    service_role: Value,
}

impl Project {
    pub fn builder() -> ProjectBuilder {
        ProjectBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &BuildEnvironment {
        &self.environment
    }
}

impl Resource for Project {
    fn logical_name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        "AWS::CodeBuild::Project"
    }

    fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert(
            "Name".to_string(),
            Reference::substitution(self.name.clone(), "-").into(),
        );
        props.insert("Environment".to_string(), self.environment.to_value());
        props.insert("Source".to_string(), self.source.to_value());
        props.insert("Artifacts".to_string(), self.artifacts.to_value());
        props.insert("ServiceRole".to_string(), self.service_role.clone());
        props
    }
}

#[derive(Debug, Default)]
struct ProjectDraft {
    name: Option<String>,
    environment: Option<BuildEnvironment>,
    source: Option<BuildSource>,
    artifacts: Option<BuildArtifacts>,
    service_role: Option<Value>,
}

/// Builder for [`Project`].
#[derive(Debug)]
pub struct ProjectBuilder {
    draft: Draft<ProjectDraft>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("ProjectBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    pub fn environment(&mut self, environment: BuildEnvironment) -> &mut Self {
        self.draft
            .update("environment", |d| d.environment = Some(environment));
        self
    }

    pub fn source(&mut self, source: BuildSource) -> &mut Self {
        self.draft.update("source", |d| d.source = Some(source));
        self
    }

    pub fn artifacts(&mut self, artifacts: BuildArtifacts) -> &mut Self {
        self.draft.update("artifacts", |d| d.artifacts = Some(artifacts));
        self
    }

    /// Service role defined in the same document.
    pub fn service_role(&mut self, role: &Role) -> &mut Self {
        let arn = Value::from(role.arn());
        self.draft.update("service_role", |d| d.service_role = Some(arn));
        self
    }

    /// Service role given as a literal ARN.
    pub fn service_role_arn(&mut self, arn: impl Into<String>) -> &mut Self {
        let arn = Value::Str(arn.into());
        self.draft
            .update("service_role_arn", |d| d.service_role = Some(arn));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Project> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("ProjectBuilder")
                .check("name", &d.name)
                .check("environment", &d.environment)
                .check("source", &d.source)
                .check("artifacts", &d.artifacts)
                .check("service_role", &d.service_role);
            let (Some(name), Some(environment), Some(source), Some(artifacts), Some(service_role)) =
                (d.name, d.environment, d.source, d.artifacts, d.service_role)
            else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(Project {
                name,
                environment,
                source,
                artifacts,
                service_role,
            })
        })
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}
