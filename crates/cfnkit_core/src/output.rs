//! Template outputs.

use crate::draft::Draft;
use crate::error::{CfnError, CfnResult};
use crate::required::RequiredFields;
use crate::value::{Properties, Value};

/// A finalized template output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    name: String,
    value: Value,
    description: Option<String>,
    export_name: Option<Value>,
}

impl Output {
    pub fn builder() -> OutputBuilder {
        OutputBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Body of the `Outputs` entry.
    pub fn to_value(&self) -> Value {
        let mut body = Properties::new();
        if let Some(description) = &self.description {
            body.insert("Description".to_string(), description.clone().into());
        }
        body.insert("Value".to_string(), self.value.clone());
        if let Some(export_name) = &self.export_name {
            body.insert(
                "Export".to_string(),
                Value::map([("Name", export_name.clone())]),
            );
        }
        Value::Map(body)
    }
}

#[derive(Debug, Default)]
struct OutputDraft {
    name: Option<String>,
    value: Option<Value>,
    description: Option<String>,
    export_name: Option<Value>,
}

/// Builder for [`Output`].
#[derive(Debug)]
pub struct OutputBuilder {
    draft: Draft<OutputDraft>,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self {
            draft: Draft::new("OutputBuilder"),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.draft.update("name", |d| d.name = Some(name));
        self
    }

    /// Exported value; usually a reference to a resource.
    pub fn value(&mut self, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        self.draft.update("value", |d| d.value = Some(value));
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        let description = description.into();
        self.draft
            .update("description", |d| d.description = Some(description));
        self
    }

    pub fn export_name(&mut self, export_name: impl Into<Value>) -> &mut Self {
        let export_name = export_name.into();
        self.draft
            .update("export_name", |d| d.export_name = Some(export_name));
        self
    }

    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.draft.fault()
    }

    pub fn build(&mut self) -> CfnResult<Output> {
        self.draft.finalize(|d| {
            let required = RequiredFields::new("OutputBuilder")
                .check("name", &d.name)
                .check("value", &d.value);
            let (Some(name), Some(value)) = (d.name, d.value) else {
                return Err(required.into_error());
            };
            required.finish()?;

            Ok(Output {
                name,
                value,
                description: d.description,
                export_name: d.export_name,
            })
        })
    }
}

impl Default for OutputBuilder {
    fn default() -> Self {
        Self::new()
    }
}
