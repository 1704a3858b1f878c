//! CodePipeline pipelines, stages and actions.
//!
//! Composition runs bottom-up: an [`ActionTypeId`] is finalized first and
//! handed to an [`ActionBuilder`], finalized actions go into a
//! [`StageBuilder`], and finalized stages go into a [`PipelineBuilder`].
//! Every level checks only its own fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cfnkit_core::{
    CfnError, CfnResult, Draft, Properties, Reference, RequiredFields, Resource, Value,
};

use crate::iam::Role;
use crate::s3::Bucket;

/// Default position of an action within its stage.
pub const DEFAULT_RUN_ORDER: u32 = 1;

/// Action category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    Source,
    Build,
    Test,
    Deploy,
    Approval,
    Invoke,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Source => "Source",
            ActionCategory::Build => "Build",
            ActionCategory::Test => "Test",
            ActionCategory::Deploy => "Deploy",
            ActionCategory::Approval => "Approval",
            ActionCategory::Invoke => "Invoke",
        }
    }
}

/// Who provides the action implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionOwner {
    Aws,
    ThirdParty,
    Custom,
}

impl ActionOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOwner::Aws => "AWS",
            ActionOwner::ThirdParty => "ThirdParty",
            ActionOwner::Custom => "Custom",
        }
    }
}

/// A finalized action-type identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypeId {
    category: ActionCategory,
    owner: ActionOwner,
    version: String,
    provider: String,
}

impl ActionTypeId {
    pub fn builder() -> ActionTypeIdBuilder {
        ActionTypeIdBuilder::new()
    }

    pub fn category(&self) -> ActionCategory {
        self.category
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("Category", Value::from(self.category.as_str())),
            ("Owner", Value::from(self.owner.as_str())),
            ("Version", Value::from(self.version.clone())),
            ("Provider", Value::from(self.provider.clone())),
        ])
    }
}

#[derive(Debug, Default)]
struct ActionTypeIdDraft {
    category: Option<ActionCategory>,
    owner: Option<ActionOwner>,
    version: Option<String>,
    provider: Option<String>,
}

/// Builder for [`ActionTypeId`].
#[derive(Debug)]
pub struct ActionTypeIdBuilder {
    draft: Draft<ActionTypeIdDraft>,
}

impl ActionTypeIdBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("ActionTypeIdBuilder"),
        }
    }

    pub fn category(&mut self, category: ActionCategory) -> &mut Self {
        self.draft.update("category", |d| d.category = Some(category));
        self
    }

    pub fn owner(&mut self, owner: ActionOwner) -> &mut Self {
        self.draft.update("owner", |d| d.owner = Some(owner));
        self
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        let version = version.into();
        self.draft.update("version", |d| d.version = Some(version));
        self
    }

    pub fn provider(&mut self, provider: impl Into<String>) -> &mut Self {
        let provider = provider.into();
        self.draft.update("provider", |d| d.provider = Some(provider));
        self
    }

    /// CodeCommit source action.
    pub fn code_commit_source(&mut self, version: impl Into<String>) -> &mut Self {
        self.category(ActionCategory::Source)
            .owner(ActionOwner::Aws)
            .version(version)
            .provider("CodeCommit")
    }

    /// CodeBuild build action.
    pub fn code_build(&mut self, version: impl Into<String>) -> &mut Self {
        self.category(ActionCategory::Build)
            .owner(ActionOwner::Aws)
            .version(version)
            .provider("CodeBuild")
    }

    /// S3 deploy action.
    pub fn s3_deploy(&mut self, version: impl Into<String>) -> &mut Self {
        self.category(ActionCategory::Deploy)
            .owner(ActionOwner::Aws)
            .version(version)
            .provider("S3")
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<ActionTypeId> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("ActionTypeIdBuilder")
                .check("category", &d.category)
                .check("owner", &d.owner)
                .check("version", &d.version)
                .check("provider", &d.provider);
            let (Some(category), Some(owner), Some(version), Some(provider)) =
                (d.category, d.owner, d.version, d.provider)
            else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(ActionTypeId {
                category,
                owner,
                version,
                provider,
            })
        })
    }
}

impl Default for ActionTypeIdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized pipeline action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
    action_type: ActionTypeId,
    outputs: Vec<String>,
    inputs: Vec<String>,
    run_order: u32,
    configuration: Properties,
}

impl Action {
    pub fn builder() -> ActionBuilder {
        ActionBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run_order(&self) -> u32 {
        self.run_order
    }

    pub fn to_value(&self) -> Value {
        let artifacts = |names: &[String]| {
            Value::List(
                names
                    .iter()
                    .map(|name| Value::map([("Name", name.clone())]))
                    .collect(),
            )
        };
        Value::map([
            ("Name", Value::from(self.name.clone())),
            ("ActionTypeId", self.action_type.to_value()),
            ("OutputArtifacts", artifacts(&self.outputs)),
            ("InputArtifacts", artifacts(&self.inputs)),
            ("RunOrder", Value::Str(self.run_order.to_string())),
            ("Configuration", Value::Map(self.configuration.clone())),
        ])
    }
}

#[derive(Debug)]
struct ActionDraft {
    name: Option<String>,
    action_type: Option<ActionTypeId>,
    outputs: Vec<String>,
    inputs: Vec<String>,
    run_order: u32,
    configuration: Properties,
}

impl Default for ActionDraft {
    fn default() -> Self {
        Self {
            name: None,
            action_type: None,
            outputs: Vec::new(),
            inputs: Vec::new(),
            run_order: DEFAULT_RUN_ORDER,
            configuration: Properties::new(),
        }
    }
}

/// Builder for [`Action`].
#[derive(Debug)]
pub struct ActionBuilder {
    draft: Draft<ActionDraft>,
}

impl ActionBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("ActionBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    pub fn action_type(&mut self, action_type: ActionTypeId) -> &mut Self {
        self.draft
            .update("action_type", |d| d.action_type = Some(action_type));
        self
    }

    pub fn add_output_artifact(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("add_output_artifact", |d| d.outputs.push(name));
        self
    }

    pub fn add_input_artifact(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("add_input_artifact", |d| d.inputs.push(name));
        self
    }

    pub fn run_order(&mut self, run_order: u32) -> &mut Self {
        self.draft.update("run_order", |d| d.run_order = run_order);
        self
    }

    /// Add one provider-specific configuration entry.
    pub fn configuration_entry(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        let (key, value) = (key.into(), value.into());
        self.draft.update("configuration_entry", |d| {
            d.configuration.insert(key, value);
        });
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Action> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("ActionBuilder")
                .check("name", &d.name)
                .check("action_type", &d.action_type);
            let (Some(name), Some(action_type)) = (d.name, d.action_type) else {
                return Err(required.into_error());
            };
            required.finish()?;

            if d.run_order == 0 {
                return Err(CfnError::InvalidValue {
                    field: "run_order",
                    reason: "run order starts at 1".to_string(),
                });
            }

            Ok(Action {
                name,
                action_type,
                outputs: d.outputs,
                inputs: d.inputs,
                run_order: d.run_order,
                configuration: d.configuration,
            })
        })
    }
}

impl Default for ActionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    actions: Vec<Action>,
}

impl Stage {
    pub fn builder() -> StageBuilder {
        StageBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("Name", Value::from(self.name.clone())),
            (
                "Actions",
                Value::List(self.actions.iter().map(Action::to_value).collect()),
            ),
        ])
    }
}

#[derive(Debug, Default)]
struct StageDraft {
    name: Option<String>,
    actions: Vec<Action>,
}

/// Builder for [`Stage`].
#[derive(Debug)]
pub struct StageBuilder {
    draft: Draft<StageDraft>,
}

impl StageBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("StageBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    pub fn add_action(&mut self, action: Action) -> &mut Self {
        self.draft.update("add_action", |d| d.actions.push(action));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Stage> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("StageBuilder")
                .check("name", &d.name)
                .check_non_empty("actions", &d.actions);
            let Some(name) = d.name else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(Stage {
                name,
                actions: d.actions,
            })
        })
    }
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An inbound transition disabled at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledTransition {
    pub stage_name: String,
    pub reason: String,
}

/// A finalized pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    name: String,
    role: Reference,
    artifact_store: Reference,
    stages: Vec<Stage>,
    disabled_transitions: Vec<DisabledTransition>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

impl Resource for Pipeline {
    fn logical_name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        "AWS::CodePipeline::Pipeline"
    }

    fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("RoleArn".to_string(), self.role.clone().into());
        props.insert(
            "Stages".to_string(),
            Value::List(self.stages.iter().map(Stage::to_value).collect()),
        );
        props.insert(
            "ArtifactStore".to_string(),
            Value::map([
                ("Type", Value::from("S3")),
                ("Location", Value::from(self.artifact_store.clone())),
            ]),
        );
        if !self.disabled_transitions.is_empty() {
            let transitions = self
                .disabled_transitions
                .iter()
                .map(|t| {
                    Value::map([
                        ("StageName", t.stage_name.clone()),
                        ("Reason", t.reason.clone()),
                    ])
                })
                .collect();
            props.insert(
                "DisableInboundStageTransitions".to_string(),
                Value::List(transitions),
            );
        }
        props
    }
}

#[derive(Debug, Default)]
struct PipelineDraft {
    name: Option<String>,
    role: Option<Reference>,
    artifact_store: Option<Reference>,
    stages: Vec<Stage>,
    disabled_transitions: Vec<DisabledTransition>,
}

/// Builder for [`Pipeline`].
#[derive(Debug)]
pub struct PipelineBuilder {
    draft: Draft<PipelineDraft>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("PipelineBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    /// Service role; rendered as a lookup of its ARN.
    pub fn role(&mut self, role: &Role) -> &mut Self {
        let arn = role.arn();
        self.draft.update("role", |d| d.role = Some(arn));
        self
    }

    pub fn role_name(&mut self, name: impl Into<String>) -> &mut Self {
        let arn = Reference::arn(name);
        self.draft.update("role_name", |d| d.role = Some(arn));
        self
    }

    /// Bucket holding pipeline artifacts.
    pub fn artifact_store(&mut self, bucket: &Bucket) -> &mut Self {
        let location = bucket.reference();
        self.draft
            .update("artifact_store", |d| d.artifact_store = Some(location));
        self
    }

    pub fn artifact_store_name(&mut self, name: impl Into<String>) -> &mut Self {
        let location = Reference::name(name);
        self.draft
            .update("artifact_store_name", |d| d.artifact_store = Some(location));
        self
    }

    pub fn add_stage(&mut self, stage: Stage) -> &mut Self {
        self.draft.update("add_stage", |d| d.stages.push(stage));
        self
    }

    /// Keep the transition into `stage_name` disabled until it is enabled by hand.
    pub fn disable_inbound_transition(
        &mut self,
        stage_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> &mut Self {
        let transition = DisabledTransition {
            stage_name: stage_name.into(),
            reason: reason.into(),
        };
        self.draft.update("disable_inbound_transition", |d| {
            d.disabled_transitions.push(transition)
        });
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Pipeline> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("PipelineBuilder")
                .check("name", &d.name)
                .check("role", &d.role)
                .check("artifact_store", &d.artifact_store)
                .check_non_empty("stages", &d.stages);
            let (Some(name), Some(role), Some(artifact_store)) =
                (d.name, d.role, d.artifact_store)
            else {
                return Err(required.into_error());
            };
            required.finish()?;

            let mut stage_names = HashSet::new();
            for stage in &d.stages {
                if !stage_names.insert(stage.name()) {
                    return Err(CfnError::InvalidValue {
                        field: "stages",
                        reason: format!("stage {:?} appears more than once", stage.name()),
                    });
                }
            }
            for transition in &d.disabled_transitions {
                if !stage_names.contains(transition.stage_name.as_str()) {
                    return Err(CfnError::InvalidValue {
                        field: "disable_inbound_transition",
                        reason: format!("no stage named {:?}", transition.stage_name),
                    });
                }
            }

            Ok(Pipeline {
                name,
                role,
                artifact_store,
                stages: d.stages,
                disabled_transitions: d.disabled_transitions,
            })
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnkit_core::STACK_NAME_TOKEN;
    use serde_json::json;

    fn source_action() -> Action {
        let action_type = ActionTypeIdBuilder::new()
            .code_commit_source("1")
            .build()
            .unwrap();
        ActionBuilder::new()
            .name("ExampleSourceAction")
            .action_type(action_type)
            .configuration_entry("BranchName", "master")
            .configuration_entry("RepositoryName", "user/exampleRepoName")
            .add_output_artifact("ElmCodeOutput")
            .build()
            .unwrap()
    }

    fn stage(name: &str) -> Stage {
        StageBuilder::new()
            .name(name)
            .add_action(source_action())
            .build()
            .unwrap()
    }

    #[test]
    fn test_action_defaults_render_run_order_and_empty_configuration() {
        let action_type = ActionTypeIdBuilder::new().code_build("1").build().unwrap();
        let action = ActionBuilder::new()
            .name("Build")
            .action_type(action_type)
            .build()
            .unwrap();

        assert_eq!(
            action.to_value().to_json(STACK_NAME_TOKEN),
            json!({
                "Name": "Build",
                "ActionTypeId": {
                    "Category": "Build",
                    "Owner": "AWS",
                    "Version": "1",
                    "Provider": "CodeBuild"
                },
                "OutputArtifacts": [],
                "InputArtifacts": [],
                "RunOrder": "1",
                "Configuration": {}
            })
        );
    }

    #[test]
    fn test_source_action_value() {
        let rendered = source_action().to_value().to_json(STACK_NAME_TOKEN);
        assert_eq!(rendered["OutputArtifacts"], json!([{ "Name": "ElmCodeOutput" }]));
        assert_eq!(
            rendered["Configuration"],
            json!({ "BranchName": "master", "RepositoryName": "user/exampleRepoName" })
        );
    }

    #[test]
    fn test_action_type_requires_all_fields() {
        let err = ActionTypeIdBuilder::new()
            .category(ActionCategory::Deploy)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. }
                if fields == &vec!["owner", "version", "provider"]
        ));
    }

    #[test]
    fn test_action_required_fields() {
        let setters: [(&str, fn(&mut ActionBuilder)); 2] = [
            ("name", |b: &mut ActionBuilder| {
                b.name("Build");
            }),
            ("action_type", |b: &mut ActionBuilder| {
                b.action_type(ActionTypeIdBuilder::new().code_build("1").build().unwrap());
            }),
        ];

        for skipped in 0..setters.len() {
            let mut builder = ActionBuilder::new();
            for (i, (_, set)) in setters.iter().enumerate() {
                if i != skipped {
                    set(&mut builder);
                }
            }
            match builder.build() {
                Err(CfnError::MissingRequiredField { kind, fields }) => {
                    assert_eq!(kind, "ActionBuilder");
                    assert_eq!(fields, vec![setters[skipped].0]);
                }
                other => panic!("expected missing {}, got {other:?}", setters[skipped].0),
            }
        }

        let err = ActionBuilder::new().build().unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. } if fields == &vec!["name", "action_type"]
        ));
    }

    #[test]
    fn test_stage_without_actions_rejected() {
        let err = StageBuilder::new().name("Empty").build().unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. } if fields == &vec!["actions"]
        ));
    }

    #[test]
    fn test_pipeline_without_stages_rejected() {
        let err = PipelineBuilder::new()
            .name("Pipeline")
            .role_name("PipelineRole")
            .artifact_store_name("ArtifactBucket")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. } if fields == &vec!["stages"]
        ));
    }

    #[test]
    fn test_pipeline_properties() {
        let pipeline = PipelineBuilder::new()
            .name("Pipeline")
            .role_name("PipelineRole")
            .artifact_store_name("ArtifactBucket")
            .add_stage(stage("Source"))
            .add_stage(stage("CopyToS3"))
            .disable_inbound_transition("CopyToS3", "Disabling transition until tests are completed")
            .build()
            .unwrap();

        let props = Value::Map(pipeline.properties()).to_json(STACK_NAME_TOKEN);
        assert_eq!(props["RoleArn"], json!({ "Fn::GetAtt": ["PipelineRole", "Arn"] }));
        assert_eq!(
            props["ArtifactStore"],
            json!({ "Type": "S3", "Location": { "Ref": "ArtifactBucket" } })
        );
        assert_eq!(props["Stages"].as_array().unwrap().len(), 2);
        assert_eq!(
            props["DisableInboundStageTransitions"][0]["StageName"],
            "CopyToS3"
        );
    }

    #[test]
    fn test_disabled_transition_must_name_a_stage() {
        let err = PipelineBuilder::new()
            .name("Pipeline")
            .role_name("PipelineRole")
            .artifact_store_name("ArtifactBucket")
            .add_stage(stage("Source"))
            .disable_inbound_transition("Deploy", "not yet")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CfnError::InvalidValue { field: "disable_inbound_transition", .. }
        ));
    }

    #[test]
    fn test_duplicate_stage_names_rejected() {
        let err = PipelineBuilder::new()
            .name("Pipeline")
            .role_name("PipelineRole")
            .artifact_store_name("ArtifactBucket")
            .add_stage(stage("Source"))
            .add_stage(stage("Source"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CfnError::InvalidValue { field: "stages", .. }));
    }

    #[test]
    fn test_add_action_after_build_is_illegal() {
        let mut builder = StageBuilder::new();
        builder.name("Source").add_action(source_action());
        let stage = builder.build().unwrap();

        builder.add_action(source_action());
        assert!(matches!(
            builder.build(),
            Err(CfnError::IllegalState { operation: "add_action", .. })
        ));
        assert_eq!(stage.actions().len(), 1);
    }
}
