//! Core roster types.
//!
//! Identifier types enforce their invariants at construction time so the
//! patch engine never handles an empty id or token.

mod field_value;
mod record;
mod record_id;
mod session;

pub use field_value::FieldValue;
pub use record::Record;
pub use record_id::RecordId;
pub use session::{SessionToken, UserIdentity};
