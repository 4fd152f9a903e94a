//! Data models for fieldops-install
//!
//! - Completion form state and its media slots
//! - Back-office request/response bodies
//! - Save session state machine and the save report

pub mod form;
pub mod media;
pub mod records;
pub mod save_report;
pub mod save_session;

pub use form::{CompletionForm, JobStatus, LedgerItem, OnsiteStatus};
pub use media::{content_type_for, CapturedImage, MediaAsset, MediaKind};
pub use records::{
    ApplicationUpdate, Credential, CredentialRequest, EnsuredCredential, InstallationFields,
    IssuedCredential, JobRecord, JobUpdate, LedgerItemPatch, NewLedgerItem, PersistedLedgerItem,
};
pub use save_report::{ReportEntry, SaveReport, Severity, StepOutcome};
pub use save_session::{SaveProgress, SaveSession, StateTransition};
