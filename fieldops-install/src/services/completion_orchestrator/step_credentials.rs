//! Step: CREDENTIALS
//!
//! Fatal on any error. A credential that was already on record is reused
//! and reported as a warning.

use super::{CompletionOrchestrator, SaveRun};
use crate::services::credential_issuer::CredentialIssuer;
use fieldops_common::events::StepStatus;

impl CompletionOrchestrator {
    pub(super) async fn step_credentials(&self, run: &mut SaveRun) -> StepStatus {
        let issuer = CredentialIssuer::new(self.backend.as_ref());

        match issuer.ensure_credential_with_record(run.job_id()).await {
            Ok((ensured, job)) => {
                run.job_record = Some(job);
                run.credential = Some(ensured.credential);
                if ensured.existed {
                    run.report.warning(format!(
                        "Credentials already exist for job {}; reusing them",
                        run.form.job_id
                    ));
                    StepStatus::Warning
                } else {
                    tracing::info!(job_id = %run.job_id(), "Network credential issued");
                    StepStatus::Completed
                }
            }
            Err(e) => {
                tracing::error!(job_id = %run.job_id(), error = %e, "Credential step failed, halting save");
                run.report.error(e.to_string());
                StepStatus::Failed
            }
        }
    }
}
