//! Outbound replies.

use serde::{Deserialize, Serialize};

use super::{FieldRejection, PatchError, PatchRequest};

/// Result of one field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Applied,
    Rejected,
}

/// Per-field outcome, one per input edit and in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEditOutcome {
    pub field: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FieldEditOutcome {
    pub fn applied(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            status: OutcomeStatus::Applied,
            reason: None,
        }
    }

    pub fn rejected(field: impl Into<String>, rejection: &FieldRejection) -> Self {
        Self {
            field: field.into(),
            status: OutcomeStatus::Rejected,
            reason: Some(rejection.to_string()),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}

/// Reply to a request that reached (or looked for) its target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchResult {
    pub record_found: bool,
    pub target_class: String,
    #[serde(rename = "targetID")]
    pub target_id: String,
    pub outcomes: Vec<FieldEditOutcome>,
}

impl PatchResult {
    /// Number of edits that were applied.
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }
}

/// Reply to a request that failed before any field was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReply {
    /// Always `0`; legacy clients test this field.
    pub response: u8,
    /// Stable error code, see [`PatchError::code`].
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_class: Option<String>,
    #[serde(rename = "targetID", default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

/// Any message the server sends back on the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Patched(PatchResult),
    Failed(ErrorReply),
}

impl Reply {
    /// Build the reply for a top-level failure.
    ///
    /// A missing record is still answered with a [`PatchResult`] so clients
    /// can branch on `recordFound`; everything else becomes an [`ErrorReply`].
    pub fn failure(error: &PatchError, request: Option<&PatchRequest>) -> Self {
        if let PatchError::RecordNotFound { collection, id } = error {
            return Self::Patched(PatchResult {
                record_found: false,
                target_class: collection.clone(),
                target_id: id.clone(),
                outcomes: Vec::new(),
            });
        }

        Self::Failed(ErrorReply {
            response: 0,
            error: error.code().to_string(),
            details: Some(error.to_string()),
            target_class: request.map(|r| r.target_collection.clone()),
            target_id: request.map(|r| r.target_id.clone()),
        })
    }

    /// Returns the error code for top-level failures.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Failed(e) => Some(&e.error),
            Self::Patched(_) => None,
        }
    }

    /// Returns the patch result, if this is one.
    pub fn as_result(&self) -> Option<&PatchResult> {
        match self {
            Self::Patched(result) => Some(result),
            Self::Failed(_) => None,
        }
    }

    /// Encode for sending over the channel.
    pub fn to_json(&self) -> String {
        // Only strings, bools and integers; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode a reply received from the channel.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
