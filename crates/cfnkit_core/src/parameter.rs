//! Template parameters.

use serde::{Deserialize, Serialize};

use crate::draft::Draft;
use crate::error::{CfnError, CfnResult};
use crate::required::RequiredFields;
use crate::value::{Properties, Value};

/// Parameter types understood by the provisioning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    Number,
    NumberList,
    CommaDelimitedList,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::Number => "Number",
            ParameterType::NumberList => "List<Number>",
            ParameterType::CommaDelimitedList => "CommaDelimitedList",
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A finalized template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    description: String,
    parameter_type: ParameterType,
    default: Option<String>,
    allowed_values: Vec<String>,
}

impl Parameter {
    pub fn builder() -> ParameterBuilder {
        ParameterBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Body of the `Parameters` entry.
    pub fn to_value(&self) -> Value {
        let mut body = Properties::new();
        body.insert("Description".to_string(), self.description.clone().into());
        body.insert("Type".to_string(), self.parameter_type.as_str().into());
        if let Some(default) = &self.default {
            body.insert("Default".to_string(), default.clone().into());
        }
        if !self.allowed_values.is_empty() {
            body.insert(
                "AllowedValues".to_string(),
                Value::list(self.allowed_values.iter().cloned()),
            );
        }
        Value::Map(body)
    }
}

#[derive(Debug, Default)]
struct ParameterDraft {
    name: Option<String>,
    description: Option<String>,
    parameter_type: Option<ParameterType>,
    default: Option<String>,
    allowed_values: Vec<String>,
}

/// Builder for [`Parameter`].
#[derive(Debug)]
pub struct ParameterBuilder {
    draft: Draft<ParameterDraft>,
}

impl ParameterBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("ParameterBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        let description = description.into();
        self.draft
            .update("description", |d| d.description = Some(description));
        self
    }

    pub fn parameter_type(&mut self, parameter_type: ParameterType) -> &mut Self {
        self.draft
            .update("parameter_type", |d| d.parameter_type = Some(parameter_type));
        self
    }

    pub fn default_value(&mut self, default: impl Into<String>) -> &mut Self {
        let default = default.into();
        self.draft.update("default_value", |d| d.default = Some(default));
        self
    }

    pub fn add_allowed_value(&mut self, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        self.draft
            .update("add_allowed_value", |d| d.allowed_values.push(value));
        self
    }

    /// Error recorded by a setter called after `build`.
    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Parameter> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("ParameterBuilder")
                .check("name", &d.name)
                .check("description", &d.description)
                .check("parameter_type", &d.parameter_type);
            let (Some(name), Some(description), Some(parameter_type)) =
                (d.name, d.description, d.parameter_type)
            else {
                return Err(required.into_error());
            };
            required.finish()?;

            if let Some(default) = &d.default {
                if !d.allowed_values.is_empty() && !d.allowed_values.contains(default) {
                    return Err(CfnError::InvalidValue {
                        field: "default_value",
                        reason: format!("{default:?} is not one of the allowed values"),
                    });
                }
            }

            Ok(Parameter {
                name,
                description,
                parameter_type,
                default: d.default,
                allowed_values: d.allowed_values,
            })
        })
    }
}

impl Default for ParameterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
