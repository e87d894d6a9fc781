//! Error types for roster operations.
//!
//! Collaborators (record store, session directory, transport) report
//! failures through [`Error`]. The live channel folds these into the
//! protocol-level taxonomy in [`crate::protocol::PatchError`].

use thiserror::Error;

/// The unified error type for roster operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Record store failures (unreachable, constraint violation, missing row).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Session resolution failures.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Live channel transport failures.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Input validation errors (collection names, record ids, values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the call could not run at all.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The store refused the write (NOT NULL, CHECK, UNIQUE, ...).
    #[error("constraint violation: {message}")]
    Constraint { message: String },

    /// The record addressed by an update no longer exists.
    #[error("record {collection}/{id} does not exist")]
    RecordMissing { collection: String, id: String },

    /// The write deadline passed; nothing was committed.
    #[error("deadline passed before the write was committed")]
    Timeout,

    /// Any other store failure.
    #[error("{message}")]
    Other { message: String },
}

/// Session resolution errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The session directory could not be read.
    #[error("session directory unavailable: {message}")]
    DirectoryUnavailable { message: String },

    /// The session directory contents are malformed.
    #[error("session directory is malformed: {message}")]
    Malformed { message: String },
}

/// Live channel transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting, binding or accepting failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The peer closed the channel before a reply arrived.
    #[error("connection closed by peer")]
    Closed,

    /// No reply arrived in time.
    #[error("no reply after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// A frame could not be encoded or decoded.
    #[error("codec error: {message}")]
    Codec { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// The collection name is not part of the catalog.
    #[error("unknown collection '{value}'")]
    Collection { value: String },

    /// Invalid record id.
    #[error("invalid record id '{value}': {reason}")]
    RecordId { value: String, reason: String },

    /// Invalid session token.
    #[error("invalid session token: {reason}")]
    SessionToken { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
