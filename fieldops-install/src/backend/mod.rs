//! Back-office API boundary
//!
//! The pipeline only talks to the job, application and item-ledger
//! resources through [`JobOrderBackend`]. Transport, auth and retry policy
//! belong to the implementation ([`RestBackend`] in production, in-memory
//! fakes in tests).

pub mod rest;

pub use rest::RestBackend;

use crate::models::{
    ApplicationUpdate, CapturedImage, CredentialRequest, IssuedCredential, JobRecord, JobUpdate,
    LedgerItemPatch, MediaKind, NewLedgerItem, PersistedLedgerItem,
};
use std::collections::BTreeMap;
use thiserror::Error;

/// Back-office call errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Remote resources the completion pipeline reads and writes
#[async_trait::async_trait]
pub trait JobOrderBackend: Send + Sync {
    /// `GET job/{id}`
    async fn get_job(&self, job_id: &str) -> Result<JobRecord, BackendError>;

    /// `POST job/{id}/credentials`
    async fn issue_credentials(
        &self,
        job_id: &str,
        request: &CredentialRequest,
    ) -> Result<IssuedCredential, BackendError>;

    /// `POST job/{id}/media`, one multipart call for every pending asset
    ///
    /// Partial success is legal: kinds missing from the returned map failed.
    async fn upload_media(
        &self,
        job_id: &str,
        folder_name: &str,
        uploads: &[(MediaKind, &CapturedImage)],
    ) -> Result<BTreeMap<MediaKind, String>, BackendError>;

    /// `PUT job/{id}`
    async fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<(), BackendError>;

    /// `PUT application/{id}`
    async fn update_application(
        &self,
        application_id: &str,
        update: &ApplicationUpdate,
    ) -> Result<(), BackendError>;

    /// `GET item-ledger?job={id}`
    async fn list_ledger_items(&self, job_id: &str)
        -> Result<Vec<PersistedLedgerItem>, BackendError>;

    /// `POST item-ledger` (batch)
    async fn create_ledger_items(&self, items: &[NewLedgerItem]) -> Result<(), BackendError>;

    /// `PUT item-ledger/{row}`
    async fn update_ledger_item(
        &self,
        row_id: i64,
        patch: &LedgerItemPatch,
    ) -> Result<(), BackendError>;

    /// `DELETE item-ledger/{row}`
    async fn delete_ledger_item(&self, row_id: i64) -> Result<(), BackendError>;
}
