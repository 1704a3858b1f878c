//! Document assembly and rendering.
//!
//! A [`Document`] collects parameters, resources and outputs under unique
//! logical names. Members are checked when they are added, so a name
//! collision shows up at the `add_*` call. References are only checked when
//! the document is rendered, which lets resources refer to members that are
//! added later.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map};
use tracing::{debug, info};

use crate::config::{Format, RenderConfig};
use crate::error::{CfnError, CfnResult};
use crate::output::Output;
use crate::parameter::Parameter;
use crate::reference::Reference;
use crate::value::{Properties, Value};

/// A finalized, top-level resource.
pub trait Resource {
    /// Declared logical name, unique within a document.
    fn logical_name(&self) -> &str;

    /// Resource type discriminator, e.g. `AWS::S3::Bucket`.
    fn resource_type(&self) -> &'static str;

    /// Property map, in the order it should be rendered.
    fn properties(&self) -> Properties;
}

/// Snapshot of a resource taken when it was added to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub resource_type: &'static str,
    pub properties: Properties,
}

impl ResourceEntry {
    pub fn from_resource<R: Resource + ?Sized>(resource: &R) -> Self {
        Self {
            resource_type: resource.resource_type(),
            properties: resource.properties(),
        }
    }

    fn to_value(&self) -> Value {
        let mut body = Properties::new();
        body.insert("Type".to_string(), self.resource_type.into());
        body.insert("Properties".to_string(), Value::Map(self.properties.clone()));
        Value::Map(body)
    }
}

fn logical_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$").expect("valid logical name pattern")
    })
}

/// Whether `name` can be used as a logical name.
pub fn is_valid_logical_name(name: &str) -> bool {
    logical_name_pattern().is_match(name)
}

/// Root collection of parameters, resources and outputs.
#[derive(Debug, Clone, Default)]
pub struct Document {
    config: RenderConfig,
    parameters: IndexMap<String, Parameter>,
    resources: IndexMap<String, ResourceEntry>,
    outputs: IndexMap<String, Output>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.config.description = Some(description.into());
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Add a parameter. Parameters share their namespace with resources.
    pub fn add_parameter(&mut self, parameter: Parameter) -> CfnResult<&mut Self> {
        let name = parameter.name().to_string();
        self.claim_member_name(&name)?;
        debug!("Adding parameter {}", name);
        self.parameters.insert(name, parameter);
        Ok(self)
    }

    /// Add a resource.
    pub fn add_resource<R: Resource + ?Sized>(&mut self, resource: &R) -> CfnResult<&mut Self> {
        let name = resource.logical_name().to_string();
        self.claim_member_name(&name)?;
        debug!("Adding resource {} ({})", name, resource.resource_type());
        self.resources
            .insert(name, ResourceEntry::from_resource(resource));
        Ok(self)
    }

    /// Add an output. Outputs have a namespace of their own.
    pub fn add_output(&mut self, output: Output) -> CfnResult<&mut Self> {
        let name = output.name().to_string();
        check_logical_name(&name)?;
        if self.outputs.contains_key(&name) {
            return Err(CfnError::DuplicateName(name));
        }
        debug!("Adding output {}", name);
        self.outputs.insert(name, output);
        Ok(self)
    }

    fn claim_member_name(&self, name: &str) -> CfnResult<()> {
        check_logical_name(name)?;
        if self.contains(name) {
            return Err(CfnError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Whether a parameter or resource with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name) || self.resources.contains_key(name)
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.get(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(|s| s.as_str()).collect()
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.keys().map(|s| s.as_str()).collect()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.keys().map(|s| s.as_str()).collect()
    }

    /// Number of parameters, resources and outputs.
    pub fn len(&self) -> usize {
        self.parameters.len() + self.resources.len() + self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every reference, then build the document tree.
    pub fn resolve(&self) -> CfnResult<serde_json::Value> {
        for (name, entry) in &self.resources {
            for value in entry.properties.values() {
                self.check_references(name, value)?;
            }
        }
        for (name, output) in &self.outputs {
            self.check_references(name, &output.to_value())?;
        }

        let token = self.config.suffix_token.as_str();
        let mut root = Map::new();
        root.insert(
            "AWSTemplateFormatVersion".to_string(),
            json!(self.config.format_version),
        );
        if let Some(description) = &self.config.description {
            root.insert("Description".to_string(), json!(description));
        }
        if !self.parameters.is_empty() {
            let parameters = self
                .parameters
                .iter()
                .map(|(name, p)| (name.clone(), p.to_value().to_json(token)))
                .collect();
            root.insert("Parameters".to_string(), serde_json::Value::Object(parameters));
        }
        let resources = self
            .resources
            .iter()
            .map(|(name, r)| (name.clone(), r.to_value().to_json(token)))
            .collect();
        root.insert("Resources".to_string(), serde_json::Value::Object(resources));
        if !self.outputs.is_empty() {
            let outputs = self
                .outputs
                .iter()
                .map(|(name, o)| (name.clone(), o.to_value().to_json(token)))
                .collect();
            root.insert("Outputs".to_string(), serde_json::Value::Object(outputs));
        }

        Ok(serde_json::Value::Object(root))
    }

    fn check_references(&self, owner: &str, value: &Value) -> CfnResult<()> {
        let mut result = Ok(());
        value.for_each_reference(&mut |reference| {
            if result.is_err() {
                return;
            }
            let resolved = match reference {
                Reference::Name(name) => reference.is_pseudo() || self.contains(name),
                Reference::Attribute { target, .. } => self.resources.contains_key(target),
                Reference::Substitution { .. } => true,
            };
            if !resolved {
                result = Err(CfnError::UnresolvedReference {
                    target: reference.target().unwrap_or_default().to_string(),
                    referenced_by: owner.to_string(),
                });
            }
        });
        result
    }

    /// Render in the configured format.
    pub fn render(&self) -> CfnResult<String> {
        self.render_as(self.config.format)
    }

    pub fn render_as(&self, format: Format) -> CfnResult<String> {
        self.config.validate()?;
        let tree = self.resolve()?;
        info!(
            "Rendering document as {} ({} parameters, {} resources, {} outputs)",
            format,
            self.parameters.len(),
            self.resources.len(),
            self.outputs.len()
        );

        match format {
            Format::Json => {
                let indent = " ".repeat(self.config.indent);
                let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
                let mut buf = Vec::new();
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                tree.serialize(&mut serializer)?;
                Ok(String::from_utf8_lossy(&buf).into_owned())
            }
            Format::Yaml => Ok(serde_yaml::to_string(&tree)?),
        }
    }

    pub fn to_json(&self) -> CfnResult<String> {
        self.render_as(Format::Json)
    }

    pub fn to_yaml(&self) -> CfnResult<String> {
        self.render_as(Format::Yaml)
    }
}

fn check_logical_name(name: &str) -> CfnResult<()> {
    if is_valid_logical_name(name) {
        Ok(())
    } else {
        Err(CfnError::InvalidName(name.to_string()))
    }
}
