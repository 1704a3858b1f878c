//! Render configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CfnError, CfnResult};
use crate::reference::STACK_NAME_TOKEN;

/// Widest JSON indentation accepted.
pub const MAX_INDENT: usize = 16;

/// Serialization format of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings applied when a document is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub format: Format,
    pub description: Option<String>,
    /// Appended to substitution references.
    pub suffix_token: String,
    pub format_version: String,
    /// JSON indentation width.
    pub indent: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: Format::Json,
            description: None,
            suffix_token: STACK_NAME_TOKEN.to_string(),
            format_version: "2010-09-09".to_string(),
            indent: 4,
        }
    }
}

impl RenderConfig {
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_suffix_token(mut self, token: impl Into<String>) -> Self {
        self.suffix_token = token.into();
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Load from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file.
    pub fn from_file(path: &Path) -> CfnResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        debug!("Loading render config from {:?}", path);
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "toml" => Self::from_toml(&content),
            other => Err(CfnError::Config(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }

    pub fn from_yaml(yaml: &str) -> CfnResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> CfnResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the renderer can not honor.
    pub fn validate(&self) -> CfnResult<()> {
        if self.indent > MAX_INDENT {
            return Err(CfnError::Config(format!(
                "indent {} exceeds the maximum of {}",
                self.indent, MAX_INDENT
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> CfnResult<String> {
        serde_yaml::to_string(self).map_err(CfnError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.suffix_token, "${AWS::StackName}");
        assert_eq!(config.format_version, "2010-09-09");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RenderConfig::from_yaml("format: yaml\ndescription: Demo stack\n").unwrap();
        assert_eq!(config.format, Format::Yaml);
        assert_eq!(config.description.as_deref(), Some("Demo stack"));
        assert_eq!(config.indent, 4);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfnkit.toml");
        std::fs::write(&path, "suffix_token = \"${Env}\"\nindent = 2\n").unwrap();

        let config = RenderConfig::from_file(&path).unwrap();
        assert_eq!(config.suffix_token, "${Env}");
        assert_eq!(config.indent, 2);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfnkit.ini");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(
            RenderConfig::from_file(&path),
            Err(CfnError::Config(_))
        ));
    }

    #[test]
    fn test_oversized_indent_is_rejected() {
        assert!(matches!(
            RenderConfig::from_yaml("indent: 18446744073709551615\n"),
            Err(CfnError::Config(_))
        ));

        let dir = tempdir().unwrap();
        let path = dir.path().join("cfnkit.toml");
        std::fs::write(&path, "indent = 4096\n").unwrap();
        assert!(matches!(
            RenderConfig::from_file(&path),
            Err(CfnError::Config(_))
        ));
        assert!(RenderConfig::from_yaml("indent: 16\n").is_ok());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(Format::from_str("YML"), Some(Format::Yaml));
        assert_eq!(Format::from_str("xml"), None);
    }
}
