//! Protocol-level error taxonomy.

use thiserror::Error;

/// A failure that ends the handling of one request.
///
/// None of these close the connection; each is turned into a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The message is not a well-formed patch request.
    #[error("malformed message: {0}")]
    Parse(String),

    /// The session token is missing, unknown or expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The target collection is not part of the catalog.
    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    /// The target record does not exist.
    #[error("record {collection}/{id} not found")]
    RecordNotFound { collection: String, id: String },

    /// The record store (or session directory) cannot be used at all.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A lookup did not finish in time.
    #[error("timed out after {0}ms")]
    Timeout(u64),
}

impl PatchError {
    /// Stable code sent in the `error` field of a reply.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "ParseError",
            Self::Unauthorized(_) => "Unauthorized",
            Self::UnknownCollection(_) => "UnknownCollection",
            Self::RecordNotFound { .. } => "RecordNotFound",
            Self::StoreUnavailable(_) => "StoreUnavailable",
            Self::Timeout(_) => "Timeout",
        }
    }
}

/// Why a single field edit was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldRejection {
    /// The column does not exist in the target collection.
    #[error("unknown column '{column}' in {collection}")]
    UnknownColumn { collection: String, column: String },

    /// The value does not fit the column (or the column is not editable).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The store refused or failed the write.
    #[error("store error: {0}")]
    Store(String),

    /// The write did not finish in time.
    #[error("timeout after {0}ms")]
    Timeout(u64),
}
