//! Step: LEDGER
//!
//! Reconciles the form's items against the persisted rows. Nothing here is
//! fatal: a failed fetch skips reconciliation, failed writes are warnings.

use super::{CompletionOrchestrator, SaveRun};
use crate::services::ledger_reconciler;
use fieldops_common::events::StepStatus;

impl CompletionOrchestrator {
    pub(super) async fn step_ledger(&self, run: &mut SaveRun) -> StepStatus {
        let job_id = run.form.job_id.clone();

        let persisted = match self.backend.list_ledger_items(&job_id).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to load item ledger");
                run.report.warning(format!(
                    "Items were not saved: could not load the item ledger: {}",
                    e
                ));
                return StepStatus::Warning;
            }
        };

        let plan = ledger_reconciler::reconcile(&job_id, &run.form.items, &persisted);
        tracing::debug!(
            job_id = %job_id,
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "Item ledger plan"
        );

        let outcome =
            ledger_reconciler::apply(&plan, self.backend.as_ref(), self.ledger_concurrency).await;

        tracing::info!(
            job_id = %job_id,
            created = outcome.created,
            updated = outcome.updated,
            deleted = outcome.deleted,
            failed = outcome.failures.len(),
            "Item ledger reconciled"
        );

        if outcome.failures.is_empty() {
            return StepStatus::Completed;
        }
        for failure in outcome.failures {
            run.report.warning(failure);
        }
        StepStatus::Warning
    }
}
