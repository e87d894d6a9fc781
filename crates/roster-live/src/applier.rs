//! Per-field patch application.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use roster_core::error::{Error, StoreError};
use roster_core::{
    FieldEdit, FieldEditOutcome, FieldRejection, FieldUpdate, PatchError, RecordStore,
};

use crate::config::LiveConfig;
use crate::validator::RecordHandle;

/// Applies the edits of one patch to one record.
///
/// Every edit gets exactly one outcome, in input order. A rejected edit
/// never prevents its siblings from being applied.
#[derive(Clone)]
pub struct PatchApplier {
    store: Arc<dyn RecordStore>,
    config: LiveConfig,
}

impl PatchApplier {
    pub fn new(store: Arc<dyn RecordStore>, config: LiveConfig) -> Self {
        Self { store, config }
    }

    /// Apply `edits` to the record behind `handle`.
    ///
    /// Edits that name an unknown column or carry a value the column cannot
    /// hold are rejected without reaching the store. The remaining edits go
    /// to the store as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::StoreUnavailable`] only when the store cannot run
    /// the batch at all; per-field failures are reported as outcomes.
    #[instrument(skip(self, edits), fields(collection = %handle.collection(), id = %handle.id(), count = edits.len()))]
    pub async fn apply(
        &self,
        handle: &RecordHandle,
        edits: &[FieldEdit],
    ) -> Result<Vec<FieldEditOutcome>, PatchError> {
        let planned: Vec<Result<FieldUpdate, FieldRejection>> =
            edits.iter().map(|edit| plan(handle, edit)).collect();

        let updates: Vec<FieldUpdate> = planned
            .iter()
            .filter_map(|p| p.as_ref().ok().cloned())
            .collect();

        let mut written = if updates.is_empty() {
            Vec::new()
        } else {
            self.write(handle, &updates).await?
        }
        .into_iter();

        let outcomes: Vec<FieldEditOutcome> = edits
            .iter()
            .zip(planned)
            .map(|(edit, plan)| {
                let result = plan.and_then(|_| {
                    written.next().unwrap_or_else(|| {
                        Err(FieldRejection::Store("store returned no result".to_string()))
                    })
                });
                match result {
                    Ok(()) => FieldEditOutcome::applied(&edit.field),
                    Err(rejection) => {
                        warn!(field = %edit.field, %rejection, "Field edit rejected");
                        FieldEditOutcome::rejected(&edit.field, &rejection)
                    }
                }
            })
            .collect();

        debug!(
            applied = outcomes.iter().filter(|o| o.is_applied()).count(),
            "Patch applied"
        );
        Ok(outcomes)
    }

    async fn write(
        &self,
        handle: &RecordHandle,
        updates: &[FieldUpdate],
    ) -> Result<Vec<Result<(), FieldRejection>>, PatchError> {
        let ms = self.config.store_timeout_ms();
        let deadline = Instant::now() + self.config.store_timeout;
        let call = self
            .store
            .update_fields(handle.collection(), handle.id(), updates, deadline);

        // The store itself refuses to commit past `deadline`; the outer bound
        // only catches stores that stop responding altogether.
        let guard = self.config.store_timeout.saturating_mul(2);

        match timeout(guard, call).await {
            Ok(Ok(results)) => Ok(results
                .into_iter()
                .map(|r| r.map_err(|e| rejection_from_store(e, ms)))
                .collect()),
            Ok(Err(e)) => Err(PatchError::StoreUnavailable(e.to_string())),
            Err(_) => {
                warn!(timeout_ms = ms, "Store stopped responding to batch");
                Ok(updates
                    .iter()
                    .map(|_| Err(FieldRejection::Timeout(ms)))
                    .collect())
            }
        }
    }
}

/// Resolve an edit against the catalog without touching the store.
fn plan(handle: &RecordHandle, edit: &FieldEdit) -> Result<FieldUpdate, FieldRejection> {
    let collection = handle.collection();
    let column = collection
        .column(&edit.field)
        .ok_or_else(|| FieldRejection::UnknownColumn {
            collection: collection.as_str().to_string(),
            column: edit.field.clone(),
        })?;

    let value = column
        .coerce(&edit.value)
        .map_err(FieldRejection::InvalidValue)?;

    Ok(FieldUpdate { column, value })
}

fn rejection_from_store(err: Error, timeout_ms: u64) -> FieldRejection {
    match err {
        Error::Store(StoreError::Timeout) => FieldRejection::Timeout(timeout_ms),
        Error::Store(inner) => FieldRejection::Store(inner.to_string()),
        other => FieldRejection::Store(other.to_string()),
    }
}
