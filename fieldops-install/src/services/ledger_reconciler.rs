//! Item ledger reconciliation
//!
//! The desired item list on the form is reconciled against the rows
//! persisted for the job, keyed by item name rather than list position:
//!
//! - desired, not persisted → create (one batch call)
//! - desired and persisted → update the first persisted row
//! - persisted, not desired → delete
//! - persisted duplicates beyond the first row → delete
//!
//! Updates and deletes touch disjoint rows and run concurrently.

use crate::backend::JobOrderBackend;
use crate::models::{LedgerItem, LedgerItemPatch, NewLedgerItem, PersistedLedgerItem};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};

/// Quantity change for one persisted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub row_id: i64,
    pub identity: String,
    pub quantity: u32,
}

/// Writes needed to make the persisted ledger match the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_create: Vec<NewLedgerItem>,
    pub to_update: Vec<LedgerUpdate>,
    pub to_delete: Vec<PersistedLedgerItem>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn write_count(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Compute the plan for `job_id`
///
/// Later duplicates of an identity in `desired` are ignored.
pub fn reconcile(
    job_id: &str,
    desired: &[LedgerItem],
    persisted: &[PersistedLedgerItem],
) -> ReconcilePlan {
    // First persisted row per identity keeps its id
    let mut keepers: HashMap<&str, &PersistedLedgerItem> = HashMap::new();
    for row in persisted {
        keepers.entry(row.item_name.trim()).or_insert(row);
    }

    let mut plan = ReconcilePlan::default();
    let mut matched: HashSet<i64> = HashSet::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for item in desired {
        let identity = item.identity.trim();
        if !seen.insert(identity) {
            continue;
        }
        match keepers.get(identity) {
            Some(row) => {
                matched.insert(row.id);
                plan.to_update.push(LedgerUpdate {
                    row_id: row.id,
                    identity: identity.to_string(),
                    quantity: item.quantity,
                });
            }
            None => plan.to_create.push(NewLedgerItem {
                job_id: job_id.to_string(),
                item_name: identity.to_string(),
                quantity: item.quantity,
            }),
        }
    }

    plan.to_delete = persisted
        .iter()
        .filter(|row| !matched.contains(&row.id))
        .cloned()
        .collect();

    plan
}

/// What [`apply`] managed to write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// One user-facing message per failed write, sorted
    pub failures: Vec<String>,
}

enum RowWrite<'p> {
    Update(&'p LedgerUpdate),
    Delete(&'p PersistedLedgerItem),
}

/// Execute a plan; individual write failures are collected, never fatal
pub async fn apply(
    plan: &ReconcilePlan,
    backend: &dyn JobOrderBackend,
    concurrency: usize,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    if !plan.to_create.is_empty() {
        match backend.create_ledger_items(&plan.to_create).await {
            Ok(()) => outcome.created = plan.to_create.len(),
            Err(e) => {
                let names: Vec<&str> = plan.to_create.iter().map(|i| i.item_name.as_str()).collect();
                tracing::warn!(error = %e, count = names.len(), "Item ledger batch create failed");
                outcome
                    .failures
                    .push(format!("Failed to add items {}: {}", names.join(", "), e));
            }
        }
    }

    let writes = plan
        .to_update
        .iter()
        .map(RowWrite::Update)
        .chain(plan.to_delete.iter().map(RowWrite::Delete));

    let results: Vec<(RowWrite<'_>, Result<(), String>)> = stream::iter(writes)
        .map(|write| async move {
            let result = match &write {
                RowWrite::Update(update) => backend
                    .update_ledger_item(
                        update.row_id,
                        &LedgerItemPatch {
                            quantity: update.quantity,
                        },
                    )
                    .await,
                RowWrite::Delete(row) => backend.delete_ledger_item(row.id).await,
            };
            (write, result.map_err(|e| e.to_string()))
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for (write, result) in results {
        match (write, result) {
            (RowWrite::Update(_), Ok(())) => outcome.updated += 1,
            (RowWrite::Delete(_), Ok(())) => outcome.deleted += 1,
            (RowWrite::Update(update), Err(e)) => {
                tracing::warn!(row_id = update.row_id, error = %e, "Item ledger update failed");
                outcome.failures.push(format!(
                    "Failed to update item {} (quantity {}): {}",
                    update.identity, update.quantity, e
                ));
            }
            (RowWrite::Delete(row), Err(e)) => {
                tracing::warn!(row_id = row.id, error = %e, "Item ledger delete failed");
                outcome
                    .failures
                    .push(format!("Failed to remove item {}: {}", row.item_name, e));
            }
        }
    }

    outcome.failures.sort();
    outcome
}
