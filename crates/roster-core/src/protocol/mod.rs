//! Wire protocol of the live record-patch channel.
//!
//! Every inbound [`PatchRequest`] is answered with exactly one [`Reply`]:
//! either a [`PatchResult`] carrying per-field outcomes, or an
//! [`ErrorReply`] describing a top-level failure.

mod errors;
mod reply;
mod request;

pub use errors::{FieldRejection, PatchError};
pub use reply::{ErrorReply, FieldEditOutcome, OutcomeStatus, PatchResult, Reply};
pub use request::{FieldEdit, PatchRequest};
