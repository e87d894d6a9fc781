//! Collaborator traits consumed by the live-patch engine.

mod sessions;
mod store;

pub use sessions::SessionDirectory;
pub use store::{FieldUpdate, RecordStore};
