//! Step: JOB_RECORD

use super::{CompletionOrchestrator, SaveRun};
use crate::models::JobUpdate;
use fieldops_common::events::StepStatus;

impl CompletionOrchestrator {
    /// Failure halts the save: the application and ledger are not touched
    pub(super) async fn step_job_record(&self, run: &mut SaveRun) -> StepStatus {
        let update = JobUpdate::from_form(&run.form, &run.media_urls, run.credential.as_ref());

        match self.backend.update_job(&run.form.job_id, &update).await {
            Ok(()) => {
                tracing::info!(
                    job_id = %run.form.job_id,
                    media_urls = update.media_urls.len(),
                    "Job order saved"
                );
                run.report
                    .success(format!("Job order {} saved", run.form.job_id));
                StepStatus::Completed
            }
            Err(e) => {
                tracing::error!(job_id = %run.form.job_id, error = %e, "Job order update failed");
                run.report
                    .error(format!("Failed to save job order {}: {}", run.form.job_id, e));
                StepStatus::Failed
            }
        }
    }
}
