//! The fixed catalog of recognized collections and their columns.
//!
//! Table and column identifiers that reach the store are always taken
//! from this catalog, never from client-supplied strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::error::{Error, InvalidInputError};
use crate::types::FieldValue;

/// Name of the primary-key column shared by every collection.
pub const KEY_COLUMN: &str = "id";

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    DateTime,
}

impl ColumnType {
    /// SQL type name used in table definitions.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::DateTime => "DATETIME",
        }
    }
}

/// A column of a recognized collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    name: &'static str,
    kind: ColumnType,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self { name, kind }
    }

    /// Returns the column name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the column type.
    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    /// Whether this is the primary-key column.
    pub fn is_key(&self) -> bool {
        self.name == KEY_COLUMN
    }

    /// Convert a client-supplied JSON value into something storable in this column.
    ///
    /// Returns a human-readable rejection reason when the value does not fit.
    pub fn coerce(&self, value: &Value) -> Result<FieldValue, String> {
        if self.is_key() {
            return Err(format!("column '{}' is the record key and cannot be edited", self.name));
        }

        if value.is_null() {
            return Ok(FieldValue::Null);
        }

        match self.kind {
            ColumnType::Text => Ok(FieldValue::Text(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })),
            ColumnType::Integer => match value {
                Value::Number(n) => n.as_i64().map(FieldValue::Integer).ok_or_else(|| {
                    format!("column '{}' expects an integer, got {}", self.name, n)
                }),
                Value::Bool(b) => Ok(FieldValue::Integer(i64::from(*b))),
                other => Err(format!(
                    "column '{}' expects an integer, got {}",
                    self.name,
                    json_kind(other)
                )),
            },
            ColumnType::DateTime => match value {
                Value::String(s) if is_datetime(s) => Ok(FieldValue::Text(s.clone())),
                Value::String(s) => Err(format!(
                    "column '{}' expects an RFC 3339 timestamp or YYYY-MM-DD date, got '{}'",
                    self.name, s
                )),
                other => Err(format!(
                    "column '{}' expects a date string, got {}",
                    self.name,
                    json_kind(other)
                )),
            },
        }
    }
}

fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

use ColumnType::{DateTime as Dt, Integer as Int, Text};

const TRANCHES: &[Column] = &[
    Column::new("id", Text),
    Column::new("formal", Text),
    Column::new("date", Dt),
    Column::new("days", Text),
];

const DAYS: &[Column] = &[
    Column::new("id", Text),
    Column::new("date", Dt),
    Column::new("packs", Text),
];

const STUDENTS: &[Column] = &[
    Column::new("id", Text),
    Column::new("name", Text),
    Column::new("surname", Text),
    Column::new("classroom", Text),
    Column::new("attendedPacks", Text),
    Column::new("isGuardian", Text),
    Column::new("isIgnored", Text),
    Column::new("isModerator", Text),
];

const CLASSROOMS: &[Column] = &[
    Column::new("id", Text),
    Column::new("entrance", Text),
    Column::new("position", Text),
    Column::new("num", Text),
    Column::new("name", Text),
    Column::new("max", Int),
    Column::new("formal", Text),
    Column::new("studentsNum", Int),
    Column::new("avaible", Int),
    Column::new("plex", Text),
];

const PACKS: &[Column] = &[
    Column::new("id", Text),
    Column::new("formal", Text),
    Column::new("classroom", Text),
    Column::new("conferences", Text),
    Column::new("arguments", Text),
    Column::new("day", Text),
];

/// A recognized collection (logical table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tranches,
    Days,
    Students,
    Classrooms,
    Packs,
}

impl Collection {
    /// Every recognized collection, in table-creation order.
    pub const ALL: [Collection; 5] = [
        Self::Tranches,
        Self::Days,
        Self::Students,
        Self::Classrooms,
        Self::Packs,
    ];

    /// Returns the table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tranches => "tranches",
            Self::Days => "days",
            Self::Students => "students",
            Self::Classrooms => "classrooms",
            Self::Packs => "packs",
        }
    }

    /// Returns every column of this collection, key column first.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::Tranches => TRANCHES,
            Self::Days => DAYS,
            Self::Students => STUDENTS,
            Self::Classrooms => CLASSROOMS,
            Self::Packs => PACKS,
        }
    }

    /// Look up a column by its exact name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                InvalidInputError::Collection {
                    value: s.to_string(),
                }
                .into()
            })
    }
}
