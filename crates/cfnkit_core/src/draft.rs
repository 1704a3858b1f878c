//! Two-state builder lifecycle.
//!
//! A [`Draft`] starts out `Accumulating` and moves to `Finalized` exactly once,
//! when `finalize` is called. It stays `Finalized` whether or not the
//! finalize closure succeeded. Setters routed through [`Draft::update`] after
//! that point leave the draft untouched and record the offending operation,
//! which is reported as [`CfnError::IllegalState`].

use tracing::{debug, warn};

use crate::error::{CfnError, CfnResult};

/// Lifecycle state of a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState<D> {
    Accumulating(D),
    Finalized,
}

/// Mutable, exclusively owned state of a builder.
#[derive(Debug, Clone)]
pub struct Draft<D> {
    kind: &'static str,
    state: DraftState<D>,
    fault: Option<&'static str>,
}

impl<D: Default> Draft<D> {
    /// Create an empty draft for the builder named `kind`.
    pub fn new(kind: &'static str) -> Self {
        Self::from_draft(kind, D::default())
    }
}

impl<D> Draft<D> {
    /// Create a draft seeded with preset values.
    pub fn from_draft(kind: &'static str, draft: D) -> Self {
        Self {
            kind,
            state: DraftState::Accumulating(draft),
            fault: None,
        }
    }

    /// Builder name used in error messages.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, DraftState::Finalized)
    }

    /// Read the accumulated state, if the draft has not been finalized yet.
    pub fn peek(&self) -> Option<&D> {
        match &self.state {
            DraftState::Accumulating(draft) => Some(draft),
            DraftState::Finalized => None,
        }
    }

    /// Apply a setter. On a finalized draft the first offending operation is
    /// recorded and the draft is left as is.
    pub fn update(&mut self, operation: &'static str, apply: impl FnOnce(&mut D)) {
        match &mut self.state {
            DraftState::Accumulating(draft) => apply(draft),
            DraftState::Finalized => {
                warn!("{}: `{}` called after build", self.kind, operation);
                self.fault.get_or_insert(operation);
            }
        }
    }

    /// The illegal-state error recorded by a setter call after finalize.
    #[must_use = "a setter called after build() is only reported here and by the next build()"]
    pub fn fault(&self) -> Option<CfnError> {
        self.fault.map(|operation| CfnError::IllegalState {
            kind: self.kind,
            operation,
        })
    }

    /// Consume the accumulated state. Only the first call reaches `finish`.
    pub fn finalize<R>(&mut self, finish: impl FnOnce(D) -> CfnResult<R>) -> CfnResult<R> {
        if let Some(err) = self.fault() {
            return Err(err);
        }

        match std::mem::replace(&mut self.state, DraftState::Finalized) {
            DraftState::Accumulating(draft) => {
                let result = finish(draft);
                match &result {
                    Ok(_) => debug!("{}: finalized", self.kind),
                    Err(e) => debug!("{}: finalize failed: {}", self.kind, e),
                }
                result
            }
            DraftState::Finalized => Err(CfnError::IllegalState {
                kind: self.kind,
                operation: "build",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn test_update_then_finalize() {
        let mut draft: Draft<Counter> = Draft::new("Counter");
        draft.update("increment", |c| c.value += 1);
        draft.update("increment", |c| c.value += 1);

        let value = draft.finalize(|c| Ok(c.value)).unwrap();
        assert_eq!(value, 2);
        assert!(draft.is_finalized());
        assert!(draft.peek().is_none());
    }

    #[test]
    fn test_second_finalize_is_illegal() {
        let mut draft: Draft<Counter> = Draft::new("Counter");
        draft.finalize(|c| Ok(c.value)).unwrap();

        let err = draft.finalize(|c| Ok(c.value)).unwrap_err();
        assert!(matches!(
            err,
            CfnError::IllegalState {
                kind: "Counter",
                operation: "build"
            }
        ));
    }

    #[test]
    fn test_update_after_finalize_records_first_fault() {
        let mut draft: Draft<Counter> = Draft::new("Counter");
        draft.finalize(|c| Ok(c.value)).unwrap();

        draft.update("increment", |c| c.value += 1);
        draft.update("reset", |c| c.value = 0);

        assert!(matches!(
            draft.fault(),
            Some(CfnError::IllegalState {
                operation: "increment",
                ..
            })
        ));
        assert!(matches!(
            draft.finalize(|c| Ok(c.value)),
            Err(CfnError::IllegalState {
                operation: "increment",
                ..
            })
        ));
    }

    #[test]
    fn test_failed_finalize_still_consumes_draft() {
        let mut draft: Draft<Counter> = Draft::new("Counter");
        let err = draft
            .finalize(|_| -> CfnResult<u32> {
                Err(CfnError::MissingRequiredField {
                    kind: "Counter",
                    fields: vec!["value"],
                })
            })
            .unwrap_err();
        assert!(matches!(err, CfnError::MissingRequiredField { .. }));
        assert!(draft.is_finalized());
    }
}
