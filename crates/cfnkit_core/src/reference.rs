//! Deferred cross-resource references.

use serde_json::json;

/// Suffix token standing in for "this deployment instance".
pub const STACK_NAME_TOKEN: &str = "${AWS::StackName}";

/// Prefix of the pseudo parameters supplied by the provisioning engine.
pub const PSEUDO_PARAMETER_PREFIX: &str = "AWS::";

/// A pointer to another document member, resolved at render time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// The member's own declared name (`Ref`).
    Name(String),
    /// `base + separator + <suffix token>` (`Fn::Sub`).
    Substitution { base: String, separator: String },
    /// A named attribute of another resource (`Fn::GetAtt`).
    Attribute { target: String, attribute: String },
}

impl Reference {
    pub fn name(name: impl Into<String>) -> Self {
        Reference::Name(name.into())
    }

    pub fn substitution(base: impl Into<String>, separator: impl Into<String>) -> Self {
        Reference::Substitution {
            base: base.into(),
            separator: separator.into(),
        }
    }

    pub fn attribute(target: impl Into<String>, attribute: impl Into<String>) -> Self {
        Reference::Attribute {
            target: target.into(),
            attribute: attribute.into(),
        }
    }

    /// Shorthand for the `Arn` attribute of `target`.
    pub fn arn(target: impl Into<String>) -> Self {
        Self::attribute(target, "Arn")
    }

    /// The `AWS::StackName` pseudo parameter.
    pub fn stack_name() -> Self {
        Reference::Name(format!("{PSEUDO_PARAMETER_PREFIX}StackName"))
    }

    /// Name of the member this reference must resolve to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Reference::Name(name) => Some(name),
            Reference::Attribute { target, .. } => Some(target),
            Reference::Substitution { .. } => None,
        }
    }

    /// Whether the target is a pseudo parameter rather than a document member.
    pub fn is_pseudo(&self) -> bool {
        matches!(self, Reference::Name(name) if name.starts_with(PSEUDO_PARAMETER_PREFIX))
    }

    /// Render to the intrinsic function form.
    pub fn to_json(&self, suffix_token: &str) -> serde_json::Value {
        match self {
            Reference::Name(name) => json!({ "Ref": name }),
            Reference::Substitution { base, separator } => {
                json!({ "Fn::Sub": format!("{base}{separator}{suffix_token}") })
            }
            Reference::Attribute { target, attribute } => {
                json!({ "Fn::GetAtt": [target, attribute] })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_is_plain_concatenation() {
        let reference = Reference::substitution("ExampleBuilder", "-");
        assert_eq!(
            reference.to_json(STACK_NAME_TOKEN),
            json!({ "Fn::Sub": "ExampleBuilder-${AWS::StackName}" })
        );
        assert_eq!(
            Reference::substitution("Fn", "").to_json("${Env}"),
            json!({ "Fn::Sub": "Fn${Env}" })
        );
        assert_eq!(reference.target(), None);
    }

    #[test]
    fn test_attribute_lookup_shape() {
        let reference = Reference::arn("LambdaRole");
        assert_eq!(reference.target(), Some("LambdaRole"));
        assert_eq!(
            reference.to_json(STACK_NAME_TOKEN),
            json!({ "Fn::GetAtt": ["LambdaRole", "Arn"] })
        );
    }

    #[test]
    fn test_pseudo_parameters() {
        assert!(Reference::stack_name().is_pseudo());
        assert!(!Reference::name("ArtifactBucket").is_pseudo());
        assert!(!Reference::attribute("AWS::Thing", "Arn").is_pseudo());
    }
}
