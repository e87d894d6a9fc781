//! SQLite-backed record store.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params, params_from_iter};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use roster_core::error::{Error, InvalidInputError, StoreError};
use roster_core::traits::FieldUpdate;
use roster_core::{Collection, Column, FieldValue, Record, RecordId, RecordStore, Result};

use crate::schema::init_schema;

fn map_sqlite(err: rusqlite::Error) -> Error {
    let store_error = match &err {
        rusqlite::Error::SqliteFailure(e, message) => {
            let message = message.clone().unwrap_or_else(|| e.to_string());
            match e.code {
                ErrorCode::ConstraintViolation => StoreError::Constraint { message },
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure => StoreError::Unavailable { message },
                _ => StoreError::Other { message },
            }
        }
        _ => StoreError::Other {
            message: err.to_string(),
        },
    };
    Error::Store(store_error)
}

fn to_sql(value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Null => SqlValue::Null,
        FieldValue::Integer(i) => SqlValue::Integer(*i),
        FieldValue::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Write one column of one row; zero affected rows means the row is gone.
fn write_field(
    conn: &Connection,
    collection: Collection,
    id: &str,
    column: &Column,
    value: &FieldValue,
) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET \"{}\" = ?1 WHERE id = ?2",
        collection.as_str(),
        column.name()
    );
    let changed = conn
        .execute(&sql, params![to_sql(value), id])
        .map_err(map_sqlite)?;

    if changed == 0 {
        return Err(StoreError::RecordMissing {
            collection: collection.as_str().to_string(),
            id: id.to_string(),
        }
        .into());
    }

    Ok(())
}

/// SQLite storage for every recognized collection.
///
/// The connection is shared behind a mutex and every call runs on the
/// blocking thread pool, so the store can be used from any async task.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure all tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let conn = Connection::open(path).map_err(map_sqlite)?;
        init_schema(&conn).map_err(map_sqlite)?;
        debug!(path = %path.display(), "Opened record store");

        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_sqlite)?;
        init_schema(&conn).map_err(map_sqlite)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::Unavailable {
                message: "connection mutex poisoned".to_string(),
            })?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable {
            message: format!("store task failed: {}", e),
        })?
    }

    /// Insert a new record.
    ///
    /// Every key of `fields` must be a column of `collection`; values are
    /// coerced the same way patch edits are.
    #[instrument(skip(self, fields), fields(%collection, %id))]
    pub async fn insert(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: &Map<String, Value>,
    ) -> Result<()> {
        let mut names = vec!["\"id\"".to_string()];
        let mut values = vec![SqlValue::Text(id.as_str().to_string())];

        for (name, value) in fields {
            let column = collection.column(name).ok_or_else(|| InvalidInputError::Other {
                message: format!("unknown column '{}' in {}", name, collection),
            })?;
            if column.is_key() {
                continue;
            }
            let value = column
                .coerce(value)
                .map_err(|message| InvalidInputError::Other { message })?;
            names.push(format!("\"{}\"", column.name()));
            values.push(to_sql(&value));
        }

        let placeholders = (1..=values.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            collection.as_str(),
            names.join(", "),
            placeholders
        );

        self.with_conn(move |conn| {
            conn.execute(&sql, params_from_iter(values.iter()))
                .map_err(map_sqlite)?;
            Ok(())
        })
        .await?;

        debug!("Inserted record");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    #[instrument(skip(self), fields(%collection, %id))]
    async fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<Record>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1", collection.as_str());
        let key = id.as_str().to_string();

        let fields = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(map_sqlite)?;
                let names: Vec<String> = stmt
                    .column_names()
                    .into_iter()
                    .map(String::from)
                    .collect();

                stmt.query_row(params![key], |row| {
                    let mut fields = Map::new();
                    for (i, name) in names.iter().enumerate() {
                        fields.insert(name.clone(), to_json(row.get_ref(i)?));
                    }
                    Ok(fields)
                })
                .optional()
                .map_err(map_sqlite)
            })
            .await?;

        Ok(fields.map(|fields| Record {
            collection,
            id: id.clone(),
            fields,
        }))
    }

    #[instrument(skip(self, value), fields(%collection, %id, column = column.name()))]
    async fn update_field(
        &self,
        collection: Collection,
        id: &RecordId,
        column: &'static Column,
        value: &FieldValue,
    ) -> Result<()> {
        let key = id.as_str().to_string();
        let value = value.clone();

        self.with_conn(move |conn| write_field(conn, collection, &key, column, &value))
            .await?;

        debug!("Updated field");
        Ok(())
    }

    /// Applies the whole batch in one transaction, each update in its own
    /// savepoint: a failing update is rolled back alone and the rest commit
    /// together. Lock waits are bounded by `deadline`; once it has passed the
    /// transaction is rolled back and every update reports a timeout.
    #[instrument(skip(self, updates, deadline), fields(%collection, %id, count = updates.len()))]
    async fn update_fields(
        &self,
        collection: Collection,
        id: &RecordId,
        updates: &[FieldUpdate],
        deadline: Instant,
    ) -> Result<Vec<Result<()>>> {
        let key = id.as_str().to_string();
        let updates = updates.to_vec();

        self.with_conn(move |conn| {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return Ok(timed_out(updates.len()));
            };

            conn.busy_timeout(remaining + BUSY_SLACK).map_err(map_sqlite)?;
            let outcome = write_batch(conn, collection, &key, &updates, deadline);
            conn.busy_timeout(BUSY_TIMEOUT).map_err(map_sqlite)?;
            outcome
        })
        .await
    }
}

/// Lock wait outside of deadline-bound batches; matches the schema pragma.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Lets a lock wait run just past the deadline so the overrun is detected
/// before commit rather than reported as a busy database.
const BUSY_SLACK: Duration = Duration::from_millis(10);

fn timed_out(count: usize) -> Vec<Result<()>> {
    (0..count).map(|_| Err(StoreError::Timeout.into())).collect()
}

fn write_batch(
    conn: &mut Connection,
    collection: Collection,
    key: &str,
    updates: &[FieldUpdate],
    deadline: Instant,
) -> Result<Vec<Result<()>>> {
    let mut tx = conn.transaction().map_err(map_sqlite)?;
    let mut results = Vec::with_capacity(updates.len());

    for update in updates {
        let result = match tx.savepoint() {
            Ok(sp) => match write_field(&sp, collection, key, update.column, &update.value) {
                Ok(()) => sp.commit().map_err(map_sqlite),
                // Dropping the savepoint rolls it back.
                Err(e) => Err(e),
            },
            Err(e) => Err(map_sqlite(e)),
        };
        results.push(result);
    }

    if Instant::now() >= deadline {
        warn!(%collection, id = key, "Write deadline passed; rolling back batch");
        tx.rollback().map_err(map_sqlite)?;
        return Ok(timed_out(updates.len()));
    }

    tx.commit().map_err(map_sqlite)?;
    Ok(results)
}
