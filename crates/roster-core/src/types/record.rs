//! Stored record type.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::Collection;

use super::RecordId;

/// A record read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// The collection the record lives in.
    #[serde(serialize_with = "serialize_collection")]
    pub collection: Collection,

    /// The record's primary key.
    pub id: RecordId,

    /// Every column of the row, keyed by column name.
    pub fields: Map<String, Value>,
}

impl Record {
    /// Get a field value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

fn serialize_collection<S>(collection: &Collection, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(collection.as_str())
}
