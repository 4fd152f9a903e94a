//! Idempotent network-credential issuance
//!
//! A job's credential is issued at most once. The job record is checked
//! first; the issuing endpoint is only called when no complete credential
//! is on record. Every failure here is fatal to the submit.

use crate::backend::{BackendError, JobOrderBackend};
use crate::models::{Credential, CredentialRequest, EnsuredCredential, JobRecord};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Failed to check existing credentials for job {job_id}: {source}")]
    Lookup {
        job_id: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to issue credentials for job {job_id}: {source}")]
    Issuance {
        job_id: String,
        #[source]
        source: BackendError,
    },

    #[error("Credential issuer returned an incomplete credential for job {0}")]
    Incomplete(String),
}

/// Ensures a job has exactly one network credential
pub struct CredentialIssuer<'a> {
    backend: &'a dyn JobOrderBackend,
}

impl<'a> CredentialIssuer<'a> {
    pub fn new(backend: &'a dyn JobOrderBackend) -> Self {
        Self { backend }
    }

    /// Return the job's credential, issuing one only if none is on record
    pub async fn ensure_credential(&self, job_id: &str) -> Result<EnsuredCredential, CredentialError> {
        self.ensure_credential_with_record(job_id)
            .await
            .map(|(ensured, _)| ensured)
    }

    /// As [`ensure_credential`](Self::ensure_credential), also returning the fetched job record
    pub async fn ensure_credential_with_record(
        &self,
        job_id: &str,
    ) -> Result<(EnsuredCredential, JobRecord), CredentialError> {
        let job = self
            .backend
            .get_job(job_id)
            .await
            .map_err(|source| CredentialError::Lookup {
                job_id: job_id.to_string(),
                source,
            })?;

        if let Some(credential) = job.credential() {
            tracing::debug!(job_id = %job_id, "Credential already on record");
            return Ok((
                EnsuredCredential {
                    credential,
                    existed: true,
                },
                job,
            ));
        }

        tracing::info!(job_id = %job_id, "Issuing network credential");
        let issued = self
            .backend
            .issue_credentials(job_id, &CredentialRequest::from(&job))
            .await
            .map_err(|source| CredentialError::Issuance {
                job_id: job_id.to_string(),
                source,
            })?;

        if issued.username.trim().is_empty() || issued.password.trim().is_empty() {
            return Err(CredentialError::Incomplete(job_id.to_string()));
        }

        if issued.credentials_exist {
            tracing::warn!(job_id = %job_id, "Issuer reports credential already existed");
        }

        Ok((
            EnsuredCredential {
                credential: Credential {
                    username: issued.username,
                    password: issued.password,
                },
                existed: issued.credentials_exist,
            },
            job,
        ))
    }
}
