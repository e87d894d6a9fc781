//! Record store trait.

use std::time::Instant;

use async_trait::async_trait;

use crate::catalog::{Collection, Column};
use crate::error::StoreError;
use crate::types::{FieldValue, Record, RecordId};
use crate::Result;

/// One column write within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// The catalog column being written.
    pub column: &'static Column,
    /// The value to store.
    pub value: FieldValue,
}

/// A store holding every recognized collection, keyed by record id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup of a record.
    async fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<Record>>;

    /// Write a single column of a single record.
    async fn update_field(
        &self,
        collection: Collection,
        id: &RecordId,
        column: &'static Column,
        value: &FieldValue,
    ) -> Result<()>;

    /// Write several columns of one record.
    ///
    /// The outer error means the store could not be used at all; the inner
    /// results report each update independently, in input order.
    ///
    /// No update may take effect after `deadline`. Updates that cannot be
    /// made durable before it report [`StoreError::Timeout`] and leave the
    /// record untouched, so a timeout outcome always means "not written".
    async fn update_fields(
        &self,
        collection: Collection,
        id: &RecordId,
        updates: &[FieldUpdate],
        deadline: Instant,
    ) -> Result<Vec<Result<()>>> {
        let mut results = Vec::with_capacity(updates.len());
        for update in updates {
            if Instant::now() >= deadline {
                results.push(Err(StoreError::Timeout.into()));
                continue;
            }
            results.push(
                self.update_field(collection, id, update.column, &update.value)
                    .await,
            );
        }
        Ok(results)
    }
}
