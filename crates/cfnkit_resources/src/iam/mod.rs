//! IAM roles and policy documents.

pub mod policies;

use serde::{Deserialize, Serialize};

use cfnkit_core::{
    CfnError, CfnResult, Draft, Properties, Reference, RequiredFields, Resource, Value,
};

/// Version string of the IAM policy language.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `service:Operation` action identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Action {
    service: String,
    operation: String,
}

impl Action {
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
        }
    }

    /// Every action of `service` (`service:*`).
    pub fn all(service: impl Into<String>) -> Self {
        Self::new(service, "*")
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.service, self.operation)
    }
}

/// Statement principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Service(Vec<String>),
    Aws(Vec<String>),
    Everyone,
}

impl Principal {
    pub fn service(service: impl Into<String>) -> Self {
        Principal::Service(vec![service.into()])
    }

    fn to_value(&self) -> Value {
        match self {
            Principal::Service(services) => Value::map([("Service", Value::list(services.clone()))]),
            Principal::Aws(accounts) => Value::map([("AWS", Value::list(accounts.clone()))]),
            Principal::Everyone => Value::from("*"),
        }
    }
}

/// A finalized policy statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    sid: Option<String>,
    effect: Effect,
    principal: Option<Principal>,
    actions: Vec<Action>,
    resources: Vec<String>,
}

impl PolicyStatement {
    pub fn builder() -> PolicyStatementBuilder {
        PolicyStatementBuilder::new()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn to_value(&self) -> Value {
        let mut body = Properties::new();
        if let Some(sid) = &self.sid {
            body.insert("Sid".to_string(), sid.clone().into());
        }
        body.insert("Effect".to_string(), self.effect.as_str().into());
        if let Some(principal) = &self.principal {
            body.insert("Principal".to_string(), principal.to_value());
        }
        body.insert(
            "Action".to_string(),
            Value::list(self.actions.iter().map(|a| a.to_string())),
        );
        // Trust statements name a principal and carry no resource.
        if !self.resources.is_empty() {
            body.insert("Resource".to_string(), Value::list(self.resources.clone()));
        } else if self.principal.is_none() {
            body.insert("Resource".to_string(), Value::list(["*"]));
        }
        Value::Map(body)
    }
}

#[derive(Debug, Default)]
struct StatementDraft {
    sid: Option<String>,
    effect: Option<Effect>,
    principal: Option<Principal>,
    actions: Vec<Action>,
    resources: Vec<String>,
}

/// Builder for [`PolicyStatement`].
#[derive(Debug)]
pub struct PolicyStatementBuilder {
    draft: Draft<StatementDraft>,
}

impl PolicyStatementBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("PolicyStatementBuilder"),
        }
    }

    pub fn sid(&mut self, sid: impl Into<String>) -> &mut Self {
        let sid = sid.into();
        self.draft.update("sid", |d| d.sid = Some(sid));
        self
    }

    pub fn effect(&mut self, effect: Effect) -> &mut Self {
        self.draft.update("effect", |d| d.effect = Some(effect));
        self
    }

    pub fn principal(&mut self, principal: Principal) -> &mut Self {
        self.draft.update("principal", |d| d.principal = Some(principal));
        self
    }

    pub fn add_action(&mut self, action: Action) -> &mut Self {
        self.draft.update("add_action", |d| d.actions.push(action));
        self
    }

    pub fn add_resource(&mut self, resource: impl Into<String>) -> &mut Self {
        let resource = resource.into();
        self.draft.update("add_resource", |d| d.resources.push(resource));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<PolicyStatement> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("PolicyStatementBuilder")
                .check("effect", &d.effect)
                .check_non_empty("actions", &d.actions);
            let Some(effect) = d.effect else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(PolicyStatement {
                sid: d.sid,
                effect,
                principal: d.principal,
                actions: d.actions,
                resources: d.resources,
            })
        })
    }
}

impl Default for PolicyStatementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized policy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    version: String,
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn builder() -> PolicyDocumentBuilder {
        PolicyDocumentBuilder::new()
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("Version", Value::from(self.version.clone())),
            (
                "Statement",
                Value::List(self.statements.iter().map(|s| s.to_value()).collect()),
            ),
        ])
    }
}

#[derive(Debug)]
struct DocumentDraft {
    version: String,
    statements: Vec<PolicyStatement>,
}

impl Default for DocumentDraft {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements: Vec::new(),
        }
    }
}

/// Builder for [`PolicyDocument`].
#[derive(Debug)]
pub struct PolicyDocumentBuilder {
    draft: Draft<DocumentDraft>,
}

impl PolicyDocumentBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("PolicyDocumentBuilder"),
        }
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        let version = version.into();
        self.draft.update("version", |d| d.version = version);
        self
    }

    pub fn add_statement(&mut self, statement: PolicyStatement) -> &mut Self {
        self.draft
            .update("add_statement", |d| d.statements.push(statement));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<PolicyDocument> {
        self.draft.finalize(|d| {
            RequiredFields::new("PolicyDocumentBuilder")
                .check_non_empty("statements", &d.statements)
                .finish()?;

            Ok(PolicyDocument {
                version: d.version,
                statements: d.statements,
            })
        })
    }
}

impl Default for PolicyDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized IAM role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    name: String,
    assume_role_policy: PolicyDocument,
    path: Option<String>,
    managed_policy_arns: Vec<String>,
    policies: Vec<(String, PolicyDocument)>,
}

impl Role {
    pub fn builder() -> RoleBuilder {
        RoleBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Fn::GetAtt` of the role's ARN.
    pub fn arn(&self) -> Reference {
        Reference::arn(self.name.clone())
    }
}

impl Resource for Role {
    fn logical_name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        "AWS::IAM::Role"
    }

    fn properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert(
            "AssumeRolePolicyDocument".to_string(),
            self.assume_role_policy.to_value(),
        );
        if let Some(path) = &self.path {
            props.insert("Path".to_string(), path.clone().into());
        }
        if !self.managed_policy_arns.is_empty() {
            props.insert(
                "ManagedPolicyArns".to_string(),
                Value::list(self.managed_policy_arns.clone()),
            );
        }
        if !self.policies.is_empty() {
            let policies = self
                .policies
                .iter()
                .map(|(name, document)| {
                    Value::map([
                        ("PolicyName", Value::from(name.clone())),
                        ("PolicyDocument", document.to_value()),
                    ])
                })
                .collect();
            props.insert("Policies".to_string(), Value::List(policies));
        }
        props
    }
}

#[derive(Debug, Default)]
struct RoleDraft {
    name: Option<String>,
    assume_role_policy: Option<PolicyDocument>,
    path: Option<String>,
    managed_policy_arns: Vec<String>,
    policies: Vec<(String, PolicyDocument)>,
}

/// Builder for [`Role`].
#[derive(Debug)]
pub struct RoleBuilder {
    draft: Draft<RoleDraft>,
}

impl RoleBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("RoleBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    /// Trust policy deciding who may assume the role.
    pub fn assume_role_policy(&mut self, document: PolicyDocument) -> &mut Self {
        self.draft
            .update("assume_role_policy", |d| d.assume_role_policy = Some(document));
        self
    }

    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        self.draft.update("path", |d| d.path = Some(path));
        self
    }

    pub fn add_managed_policy_arn(&mut self, arn: impl Into<String>) -> &mut Self {
        let arn = arn.into();
        self.draft
            .update("add_managed_policy_arn", |d| d.managed_policy_arns.push(arn));
        self
    }

    /// Attach an inline permissions policy.
    pub fn add_policy(&mut self, name: impl Into<String>, document: PolicyDocument) -> &mut Self {
        let name = name.into();
        self.draft
            .update("add_policy", |d| d.policies.push((name, document)));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Role> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("RoleBuilder")
                .check("name", &d.name)
                .check("assume_role_policy", &d.assume_role_policy);
            let (Some(name), Some(assume_role_policy)) = (d.name, d.assume_role_policy) else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(Role {
                name,
                assume_role_policy,
                path: d.path,
                managed_policy_arns: d.managed_policy_arns,
                policies: d.policies,
            })
        })
    }
}

impl Default for RoleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfnkit_core::STACK_NAME_TOKEN;
    use serde_json::json;

    fn read_statement() -> PolicyStatement {
        PolicyStatementBuilder::new()
            .effect(Effect::Allow)
            .add_action(Action::new("s3", "GetObject"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_statement_defaults_resource_to_wildcard() {
        assert_eq!(
            read_statement().to_value().to_json(STACK_NAME_TOKEN),
            json!({ "Effect": "Allow", "Action": ["s3:GetObject"], "Resource": ["*"] })
        );
    }

    #[test]
    fn test_trust_statement_has_no_resource() {
        let statement = PolicyStatementBuilder::new()
            .effect(Effect::Allow)
            .principal(Principal::service("lambda.amazonaws.com"))
            .add_action(Action::new("sts", "AssumeRole"))
            .build()
            .unwrap();
        assert_eq!(
            statement.to_value().to_json(STACK_NAME_TOKEN),
            json!({
                "Effect": "Allow",
                "Principal": { "Service": ["lambda.amazonaws.com"] },
                "Action": ["sts:AssumeRole"]
            })
        );
    }

    #[test]
    fn test_statement_requires_effect_and_action() {
        let err = PolicyStatementBuilder::new().build().unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. } if fields == &vec!["effect", "actions"]
        ));

        let err = PolicyStatementBuilder::new()
            .effect(Effect::Deny)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. } if fields == &vec!["actions"]
        ));
    }

    #[test]
    fn test_empty_policy_document_rejected() {
        assert!(matches!(
            PolicyDocumentBuilder::new().build(),
            Err(CfnError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_role_properties() {
        let trust = PolicyDocumentBuilder::new()
            .add_statement(read_statement())
            .build()
            .unwrap();
        let role = RoleBuilder::new()
            .name("ReaderRole")
            .assume_role_policy(trust.clone())
            .add_policy("Read", trust)
            .add_managed_policy_arn("arn:aws:iam::aws:policy/ReadOnlyAccess")
            .build()
            .unwrap();

        assert_eq!(role.resource_type(), "AWS::IAM::Role");
        let props = role.properties();
        let keys: Vec<_> = props.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["AssumeRolePolicyDocument", "ManagedPolicyArns", "Policies"]
        );
        assert_eq!(role.arn(), Reference::arn("ReaderRole"));
    }

    #[test]
    fn test_role_required_fields() {
        let trust = || super::policies::assume_role_policy("lambda.amazonaws.com").unwrap();

        let err = RoleBuilder::new().name("ExecRole").build().unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { kind: "RoleBuilder", ref fields }
                if fields == &vec!["assume_role_policy"]
        ));

        let err = RoleBuilder::new()
            .assume_role_policy(trust())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CfnError::MissingRequiredField { ref fields, .. } if fields == &vec!["name"]
        ));

        assert!(RoleBuilder::new()
            .name("ExecRole")
            .assume_role_policy(trust())
            .build()
            .is_ok());
    }

    #[test]
    fn test_role_setter_after_build() {
        let trust = PolicyDocumentBuilder::new()
            .add_statement(read_statement())
            .build()
            .unwrap();
        let mut builder = RoleBuilder::new();
        builder.name("ReaderRole").assume_role_policy(trust);
        let role = builder.build().unwrap();

        builder.name("Renamed");
        assert!(matches!(
            builder.build(),
            Err(CfnError::IllegalState { operation: "name", .. })
        ));
        assert_eq!(role.name(), "ReaderRole");
    }
}
