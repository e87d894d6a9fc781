//! roster-live - The live record-patch channel.
//!
//! A connected client names a collection and a record and sends field-level
//! edits; the server checks the session, validates the target, applies each
//! edit independently and answers on the same connection.
//!
//! The protocol logic lives in [`PatchService`], which maps one raw message
//! to one [`Reply`](roster_core::Reply) and knows nothing about sockets.
//! [`LiveServer`] is the WebSocket adapter around it and [`LiveClient`] the
//! matching client.

mod applier;
mod client;
mod config;
mod registry;
mod server;
mod service;
mod validator;

pub use applier::PatchApplier;
pub use client::LiveClient;
pub use config::LiveConfig;
pub use registry::{ConnectionGuard, ConnectionId, ConnectionInfo, ConnectionRegistry};
pub use server::LiveServer;
pub use service::PatchService;
pub use validator::{PatchValidator, RecordHandle};
