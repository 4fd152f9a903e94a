//! fieldops-install library interface
//!
//! Installation completion save pipeline: dependent selection resolution,
//! media normalization, credential issuance, item ledger reconciliation and
//! the orchestrator that sequences them against the back-office API.

pub mod backend;
pub mod error;
pub mod input;
pub mod models;
pub mod resolver;
pub mod services;

pub use crate::error::{InstallError, InstallResult};
pub use crate::backend::{BackendError, JobOrderBackend, RestBackend};
pub use crate::services::{CompletionOrchestrator, SubmitError};
