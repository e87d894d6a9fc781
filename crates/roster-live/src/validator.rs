//! Patch target validation.

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, instrument};

use roster_core::{Collection, PatchError, RecordId, RecordStore};

use crate::config::LiveConfig;

/// Address of a record known to exist: enough for the applier to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle {
    collection: Collection,
    id: RecordId,
}

impl RecordHandle {
    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Confirms that a patch target names a recognized collection and an
/// existing record. Never writes.
#[derive(Clone)]
pub struct PatchValidator {
    store: Arc<dyn RecordStore>,
    config: LiveConfig,
}

impl PatchValidator {
    pub fn new(store: Arc<dyn RecordStore>, config: LiveConfig) -> Self {
        Self { store, config }
    }

    /// Resolve a client-supplied target into a [`RecordHandle`].
    ///
    /// The collection name is checked against the catalog before the store
    /// is touched, so an unknown collection costs no store call.
    ///
    /// # Errors
    ///
    /// - [`PatchError::UnknownCollection`] for names outside the catalog
    /// - [`PatchError::Parse`] for an unusable record id
    /// - [`PatchError::RecordNotFound`] when the record does not exist
    /// - [`PatchError::StoreUnavailable`] / [`PatchError::Timeout`] when the lookup fails
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        target_collection: &str,
        target_id: &str,
    ) -> Result<RecordHandle, PatchError> {
        let collection: Collection = target_collection
            .parse()
            .map_err(|_| PatchError::UnknownCollection(target_collection.to_string()))?;

        let id = RecordId::new(target_id)
            .map_err(|e| PatchError::Parse(format!("targetID: {}", e)))?;

        let found = timeout(self.config.store_timeout, self.store.get(collection, &id))
            .await
            .map_err(|_| PatchError::Timeout(self.config.store_timeout_ms()))?
            .map_err(|e| PatchError::StoreUnavailable(e.to_string()))?;

        if found.is_none() {
            return Err(PatchError::RecordNotFound {
                collection: collection.as_str().to_string(),
                id: id.to_string(),
            });
        }

        debug!("Patch target exists");
        Ok(RecordHandle { collection, id })
    }
}
