//! Storable field values.

use serde::Serialize;

/// A value ready to be written into a column.
///
/// Produced by [`Column::coerce`](crate::Column::coerce) from the JSON
/// value a client sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}
