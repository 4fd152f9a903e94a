//! Step: APPLICATION

use super::{CompletionOrchestrator, SaveRun};
use crate::models::ApplicationUpdate;
use fieldops_common::events::StepStatus;

impl CompletionOrchestrator {
    /// Fetch the job when neither the form nor an earlier step supplied it,
    /// so a linked application is found on every submit path
    ///
    /// A failed lookup is a warning and leaves the application untouched.
    pub(super) async fn link_application(&self, run: &mut SaveRun) -> Option<StepStatus> {
        if run.application_id().is_some() || run.job_record.is_some() {
            return None;
        }

        match self.backend.get_job(&run.form.job_id).await {
            Ok(job) => {
                run.job_record = Some(job);
                None
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %run.form.job_id,
                    error = %e,
                    "Linked application lookup failed"
                );
                run.report.warning(format!(
                    "Could not look up the linked application for job {}: {}",
                    run.form.job_id, e
                ));
                Some(StepStatus::Warning)
            }
        }
    }

    pub(super) async fn step_application(&self, run: &mut SaveRun) -> StepStatus {
        let Some(application_id) = run.application_id() else {
            return StepStatus::Skipped;
        };

        let update = ApplicationUpdate::from(&run.form);
        match self.backend.update_application(&application_id, &update).await {
            Ok(()) => {
                tracing::debug!(
                    job_id = %run.form.job_id,
                    application_id = %application_id,
                    "Application updated"
                );
                StepStatus::Completed
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %run.form.job_id,
                    application_id = %application_id,
                    error = %e,
                    "Application update failed"
                );
                run.report.warning(format!(
                    "Failed to update application {}: {}",
                    application_id, e
                ));
                StepStatus::Warning
            }
        }
    }
}
