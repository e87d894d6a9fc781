//! Inbound patch request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PatchError;

/// One field mutation within a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEdit {
    /// Column name, as sent by the client.
    pub field: String,

    /// New value; `null` clears the column.
    #[serde(rename = "updatedValue")]
    pub value: Value,
}

impl FieldEdit {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A request to mutate fields of one record.
///
/// The target names are kept as the client sent them; validation against
/// the catalog happens when the request is handled so that an unknown
/// collection can be reported as such rather than as a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    /// Free-form name of the requesting actor, used for audit logging only.
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(rename = "sessionToken")]
    pub session_token: String,

    #[serde(rename = "targetClass")]
    pub target_collection: String,

    #[serde(rename = "targetID")]
    pub target_id: String,

    #[serde(rename = "interpolators")]
    pub field_edits: Vec<FieldEdit>,
}

impl PatchRequest {
    /// Decode a request from the text of one channel message.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::Parse`] for invalid JSON or a missing/mistyped field.
    pub fn parse(raw: &str) -> Result<Self, PatchError> {
        serde_json::from_str(raw).map_err(|e| PatchError::Parse(e.to_string()))
    }

    /// Encode the request for sending over the channel.
    pub fn to_json(&self) -> String {
        // Only strings and `Value`s; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
