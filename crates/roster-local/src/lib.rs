//! roster-local - Local collaborators for the roster live channel.
//!
//! [`SqliteStore`] holds the five scheduling collections in a single SQLite
//! database. [`FileSessionDirectory`] resolves session tokens from the JSON
//! file maintained by the login subsystem; [`MemorySessionDirectory`] is an
//! in-process equivalent for tests and embedders.

mod schema;
mod sessions;
mod store;

pub use schema::table_definition;
pub use sessions::{FileSessionDirectory, MemorySessionDirectory};
pub use store::SqliteStore;
