//! Filing novelty tracking.

use crate::model::FilingSummary;

/// Per-engine memory of the last filing that produced a resolution.
///
/// Lives only in process memory; a restart forgets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    last_resolved_filing_id: Option<String>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_resolved_filing_id(&self) -> Option<&str> {
        self.last_resolved_filing_id.as_deref()
    }

    /// Record a successful resolution. Only the engine's terminal step calls this.
    pub(crate) fn mark_resolved(&mut self, filing_id: &str) {
        self.last_resolved_filing_id = Some(filing_id.to_string());
    }
}

/// `true` when `filing` has not already produced a resolution.
pub fn is_new(filing: &FilingSummary, state: &EngineState) -> bool {
    state.last_resolved_filing_id() != Some(filing.filing_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filing(id: &str) -> FilingSummary {
        FilingSummary {
            form_type: "10-Q".into(),
            filing_id: id.into(),
            filed_on: "2023-08-04".into(),
        }
    }

    #[test]
    fn empty_state_is_always_new() {
        assert!(is_new(&filing("0001-23-000123"), &EngineState::new()));
    }

    #[test]
    fn same_id_is_not_new() {
        let mut state = EngineState::new();
        state.mark_resolved("0001-23-000123");
        assert!(!is_new(&filing("0001-23-000123"), &state));
    }

    #[test]
    fn different_id_is_new() {
        let mut state = EngineState::new();
        state.mark_resolved("0001-23-000123");
        assert!(is_new(&filing("0001-23-000456"), &state));
        assert_eq!(state.last_resolved_filing_id(), Some("0001-23-000123"));
    }
}
