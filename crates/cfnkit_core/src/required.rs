//! Required-field checklist evaluated when a builder finalizes.
//!
//! Every builder lists its required slots explicitly instead of scanning its
//! fields. A slot with a default value is never listed, so a default can not
//! hide a missing value.

use crate::error::{CfnError, CfnResult};

/// Accumulates missing required fields for one builder.
#[derive(Debug)]
#[must_use = "call `finish()` to surface missing fields"]
pub struct RequiredFields {
    kind: &'static str,
    missing: Vec<&'static str>,
}

impl RequiredFields {
    /// Start a checklist for the builder named `kind`.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            missing: Vec::new(),
        }
    }

    /// Record `field` as missing when the slot is unset.
    pub fn check<T>(mut self, field: &'static str, slot: &Option<T>) -> Self {
        if slot.is_none() {
            self.missing.push(field);
        }
        self
    }

    /// Record `field` as missing when the collection has no entries.
    pub fn check_non_empty<T>(mut self, field: &'static str, items: &[T]) -> Self {
        if items.is_empty() {
            self.missing.push(field);
        }
        self
    }

    /// Fields recorded as missing so far.
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    /// Fail with [`CfnError::MissingRequiredField`] if anything is missing.
    pub fn finish(self) -> CfnResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// The error for every field recorded so far, for use once a required
    /// slot turned out to be unset.
    pub fn into_error(self) -> CfnError {
        CfnError::MissingRequiredField {
            kind: self.kind,
            fields: self.missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_slots_set_passes() {
        let name = Some("Bucket".to_string());
        let items = vec![1];
        RequiredFields::new("Test")
            .check("name", &name)
            .check_non_empty("items", &items)
            .finish()
            .unwrap();
    }

    #[test]
    fn test_reports_fields_in_declaration_order() {
        let name: Option<String> = None;
        let handler = Some("index.handler");
        let role: Option<String> = None;
        let err = RequiredFields::new("FunctionBuilder")
            .check("name", &name)
            .check("handler", &handler)
            .check("role", &role)
            .finish()
            .unwrap_err();

        match err {
            CfnError::MissingRequiredField { kind, fields } => {
                assert_eq!(kind, "FunctionBuilder");
                assert_eq!(fields, vec!["name", "role"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_collection_is_missing() {
        let stages: Vec<String> = Vec::new();
        let check = RequiredFields::new("PipelineBuilder").check_non_empty("stages", &stages);
        assert_eq!(check.missing(), &["stages"]);
        assert!(check.finish().is_err());
    }
}
