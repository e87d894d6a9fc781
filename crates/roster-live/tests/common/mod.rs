#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use roster_core::error::StoreError;
use roster_core::{
    Collection, Column, FieldUpdate, FieldValue, Record, RecordId, RecordStore, Result,
    SessionToken, UserIdentity,
};
use roster_live::{LiveConfig, PatchService};
use roster_local::{MemorySessionDirectory, SqliteStore};

/// Token accepted by [`sessions`].
pub const TOKEN: &str = "tok-coordinator";

/// Wraps a [`SqliteStore`] and counts the calls that reach it.
pub struct CountingStore {
    pub inner: SqliteStore,
    gets: AtomicUsize,
    updates: AtomicUsize,
    get_delay: Option<Duration>,
    update_delay: Option<Duration>,
    /// Position within a batch whose update is refused.
    refuse_update: Option<usize>,
}

impl CountingStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            get_delay: None,
            update_delay: None,
            refuse_update: None,
        }
    }

    /// Delay every lookup by `delay`.
    pub fn with_get_delay(mut self, delay: Duration) -> Self {
        self.get_delay = Some(delay);
        self
    }

    /// Delay every write by `delay`.
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    /// Refuse the update at `index` of every batch with a constraint error;
    /// the other updates of the batch go through.
    pub fn refusing_update(mut self, index: usize) -> Self {
        self.refuse_update = Some(index);
        self
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<Record>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        pause(self.get_delay).await;
        self.inner.get(collection, id).await
    }

    async fn update_field(
        &self,
        collection: Collection,
        id: &RecordId,
        column: &'static Column,
        value: &FieldValue,
    ) -> Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        pause(self.update_delay).await;
        self.inner.update_field(collection, id, column, value).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &RecordId,
        updates: &[FieldUpdate],
        deadline: Instant,
    ) -> Result<Vec<Result<()>>> {
        self.updates.fetch_add(updates.len(), Ordering::SeqCst);
        pause(self.update_delay).await;

        let Some(refused) = self.refuse_update.filter(|i| *i < updates.len()) else {
            return self.inner.update_fields(collection, id, updates, deadline).await;
        };

        let mut allowed = updates.to_vec();
        allowed.remove(refused);
        let mut results = self
            .inner
            .update_fields(collection, id, &allowed, deadline)
            .await?;
        results.insert(
            refused,
            Err(StoreError::Constraint {
                message: format!("{} is locked for editing", updates[refused].column.name()),
            }
            .into()),
        );
        Ok(results)
    }
}

pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

/// Store holding student `s1` (Ann Rossi, classroom `c3`) and day `d1`.
pub async fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .insert(
            Collection::Students,
            &RecordId::new("s1").unwrap(),
            &fields(json!({"name": "Ann", "surname": "Rossi", "classroom": "c3"})),
        )
        .await
        .unwrap();
    store
        .insert(
            Collection::Days,
            &RecordId::new("d1").unwrap(),
            &fields(json!({"date": "2024-03-01", "packs": "[]"})),
        )
        .await
        .unwrap();
    store
}

pub fn sessions() -> Arc<MemorySessionDirectory> {
    let sessions = MemorySessionDirectory::new();
    sessions.insert(
        &SessionToken::new(TOKEN).unwrap(),
        UserIdentity::new("coordinator"),
    );
    Arc::new(sessions)
}

pub fn service(store: Arc<CountingStore>, config: LiveConfig) -> PatchService {
    PatchService::new(store, sessions(), config)
}

/// Raw request text as a client would send it.
pub fn request(collection: &str, id: &str, edits: Value) -> String {
    json!({
        "from": "test-client",
        "sessionToken": TOKEN,
        "targetClass": collection,
        "targetID": id,
        "interpolators": edits,
    })
    .to_string()
}

pub async fn read_field(store: &SqliteStore, collection: Collection, id: &str, field: &str) -> Value {
    store
        .get(collection, &RecordId::new(id).unwrap())
        .await
        .unwrap()
        .unwrap()
        .get(field)
        .cloned()
        .unwrap_or(Value::Null)
}
