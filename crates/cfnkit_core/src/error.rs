//! Error types for document construction and rendering.

use thiserror::Error;

/// Result type alias for cfnkit operations.
pub type CfnResult<T> = Result<T, CfnError>;

/// Errors that can occur while building or rendering a document.
#[derive(Error, Debug)]
pub enum CfnError {
    #[error("{kind}: missing required field(s): {}", fields.join(", "))]
    MissingRequiredField {
        kind: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{kind}: `{operation}` called on a finalized builder")]
    IllegalState {
        kind: &'static str,
        operation: &'static str,
    },

    #[error("Unresolved reference to `{target}` from `{referenced_by}`")]
    UnresolvedReference { target: String, referenced_by: String },

    #[error("Duplicate name in document: {0}")]
    DuplicateName(String),

    #[error("Invalid logical name: {0:?}")]
    InvalidName(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CfnError {
    /// Name of the field or document member the error points at, if any.
    pub fn subject(&self) -> Option<String> {
        match self {
            CfnError::MissingRequiredField { fields, .. } => Some(fields.join(", ")),
            CfnError::IllegalState { operation, .. } => Some(operation.to_string()),
            CfnError::UnresolvedReference { target, .. } => Some(target.clone()),
            CfnError::DuplicateName(name) | CfnError::InvalidName(name) => Some(name.clone()),
            CfnError::InvalidValue { field, .. } => Some(field.to_string()),
            _ => None,
        }
    }
}
