//! roster-core - Core types and traits for the roster live-patch channel.
//!
//! This crate has no I/O of its own. It defines the fixed collection
//! catalog, the wire protocol spoken over the live channel, and the
//! collaborator traits ([`RecordStore`], [`SessionDirectory`]) that the
//! patch engine is written against.

pub mod catalog;
pub mod error;
pub mod protocol;
pub mod traits;
pub mod types;

pub use catalog::{Collection, Column, ColumnType};
pub use error::Error;
pub use protocol::{
    ErrorReply, FieldEdit, FieldEditOutcome, FieldRejection, OutcomeStatus, PatchError,
    PatchRequest, PatchResult, Reply,
};
pub use traits::{FieldUpdate, RecordStore, SessionDirectory};
pub use types::{FieldValue, Record, RecordId, SessionToken, UserIdentity};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
