//! Save outcome reporting
//!
//! The report is the single source of truth for what a submit did. It is
//! always shown in full: independent steps fail independently, and the user
//! needs to know, for example, that the job saved but one image did not.

use chrono::{DateTime, Utc};
use fieldops_common::events::{SaveStep, StepStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Report entry severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// One user-facing line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub severity: Severity,
    pub message: String,
}

/// How one pipeline step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: SaveStep,
    pub status: StepStatus,
}

/// Aggregate, ordered outcome of one completion submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReport {
    pub session_id: Uuid,
    pub job_id: String,
    pub entries: Vec<ReportEntry>,
    pub steps: Vec<StepOutcome>,
    pub percentage: u8,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl SaveReport {
    pub fn new(session_id: Uuid, job_id: impl Into<String>) -> Self {
        Self {
            session_id,
            job_id: job_id.into(),
            entries: Vec::new(),
            steps: Vec::new(),
            percentage: 0,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(ReportEntry {
            severity,
            message: message.into(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn record_step(&mut self, step: SaveStep, status: StepStatus) {
        self.steps.push(StepOutcome { step, status });
    }

    /// Count entries by severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn step_status(&self, step: SaveStep) -> Option<StepStatus> {
        self.steps.iter().find(|o| o.step == step).map(|o| o.status)
    }

    /// The job record itself was written
    pub fn job_saved(&self) -> bool {
        self.step_status(SaveStep::JobRecord) == Some(StepStatus::Completed)
    }
}
