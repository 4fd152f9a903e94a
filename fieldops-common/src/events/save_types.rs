//! Completion save type definitions
//!
//! Supporting types for the installation completion save pipeline, shared
//! by the pipeline crate and anything that listens to its events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the completion save pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveStep {
    /// Local field validation
    Validate,
    /// Network access credential issuance
    Credentials,
    /// Batched media upload
    Media,
    /// Job order record update
    JobRecord,
    /// Linked application record update
    Application,
    /// Item ledger reconciliation
    Ledger,
}

impl SaveStep {
    /// All steps in execution order
    pub const ALL: [SaveStep; 6] = [
        SaveStep::Validate,
        SaveStep::Credentials,
        SaveStep::Media,
        SaveStep::JobRecord,
        SaveStep::Application,
        SaveStep::Ledger,
    ];

    /// Progress weight (weights of all steps sum to 100)
    pub fn weight(self) -> u8 {
        match self {
            SaveStep::Validate => 5,
            SaveStep::Credentials => 15,
            SaveStep::Media => 30,
            SaveStep::JobRecord => 25,
            SaveStep::Application => 10,
            SaveStep::Ledger => 15,
        }
    }

    /// Short label shown next to the progress bar
    pub fn label(self) -> &'static str {
        match self {
            SaveStep::Validate => "Validating form",
            SaveStep::Credentials => "Issuing network credentials",
            SaveStep::Media => "Uploading images",
            SaveStep::JobRecord => "Saving job order",
            SaveStep::Application => "Updating application",
            SaveStep::Ledger => "Syncing items",
        }
    }
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Step ran and every write succeeded
    Completed,
    /// Step did not apply to this submit (or an earlier step stopped the run)
    Skipped,
    /// Step ran but some of its writes failed; the pipeline continued
    Warning,
    /// Step failed and the pipeline stopped
    Failed,
}

/// Save button lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "step", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveState {
    /// Nothing in flight, submit control enabled
    Idle,
    /// Checking required fields
    Validating,
    /// Validation rejected the form; no side effects were attempted
    InvalidStop,
    /// Executing the given step
    Running(SaveStep),
    /// Aggregating step outcomes into the report
    Reporting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_100() {
        let total: u32 = SaveStep::ALL.iter().map(|s| s.weight() as u32).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_steps_are_ordered() {
        let mut sorted = SaveStep::ALL;
        sorted.sort();
        assert_eq!(sorted, SaveStep::ALL);
    }

    #[test]
    fn test_save_state_serialization() {
        let json = serde_json::to_string(&SaveState::Running(SaveStep::Media)).unwrap();
        assert_eq!(json, r#"{"state":"RUNNING","step":"MEDIA"}"#);

        let json = serde_json::to_string(&SaveState::Idle).unwrap();
        assert_eq!(json, r#"{"state":"IDLE"}"#);
    }
}
