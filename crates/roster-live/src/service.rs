//! Transport-independent handling of live-channel messages.

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use roster_core::{
    PatchError, PatchRequest, PatchResult, RecordStore, Reply, SessionDirectory, SessionToken,
    UserIdentity,
};

use crate::applier::PatchApplier;
use crate::config::LiveConfig;
use crate::registry::ConnectionId;
use crate::validator::PatchValidator;

/// Turns one inbound message into exactly one reply.
///
/// Steps, in order: parse, authorize, validate the target, apply the edits.
/// Each step can end the request with a [`PatchError`], which is folded into
/// the reply; nothing here closes a connection or panics on client input.
#[derive(Clone)]
pub struct PatchService {
    sessions: Arc<dyn SessionDirectory>,
    validator: PatchValidator,
    applier: PatchApplier,
    config: LiveConfig,
}

impl PatchService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionDirectory>,
        config: LiveConfig,
    ) -> Self {
        Self {
            sessions,
            validator: PatchValidator::new(Arc::clone(&store), config),
            applier: PatchApplier::new(store, config),
            config,
        }
    }

    /// Handle the text of one message received on `connection`.
    #[instrument(skip(self, raw), fields(%connection, len = raw.len()))]
    pub async fn handle_message(&self, connection: ConnectionId, raw: &str) -> Reply {
        let request = match PatchRequest::parse(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting malformed message");
                return Reply::failure(&e, None);
            }
        };

        match self.handle_request(&request).await {
            Ok(result) => Reply::Patched(result),
            Err(e) => {
                warn!(code = e.code(), error = %e, "Patch failed");
                Reply::failure(&e, Some(&request))
            }
        }
    }

    /// Authorize, validate and apply an already-decoded request.
    pub async fn handle_request(&self, request: &PatchRequest) -> Result<PatchResult, PatchError> {
        let user = self.authorize(&request.session_token).await?;

        info!(
            origin = request.origin.as_deref().unwrap_or("-"),
            %user,
            collection = %request.target_collection,
            id = %request.target_id,
            edits = request.field_edits.len(),
            "Patch requested"
        );

        let handle = self
            .validator
            .validate(&request.target_collection, &request.target_id)
            .await?;
        let outcomes = self.applier.apply(&handle, &request.field_edits).await?;

        Ok(PatchResult {
            record_found: true,
            target_class: handle.collection().as_str().to_string(),
            target_id: handle.id().to_string(),
            outcomes,
        })
    }

    async fn authorize(&self, token: &str) -> Result<UserIdentity, PatchError> {
        let token = SessionToken::new(token)
            .map_err(|_| PatchError::Unauthorized("missing session token".to_string()))?;

        let resolved = timeout(self.config.store_timeout, self.sessions.resolve(&token))
            .await
            .map_err(|_| PatchError::Timeout(self.config.store_timeout_ms()))?
            .map_err(|e| PatchError::Unauthorized(format!("cannot verify session: {}", e)))?;

        match resolved {
            Some(user) => {
                debug!(%user, "Session resolved");
                Ok(user)
            }
            None => Err(PatchError::Unauthorized(
                "unknown or expired session".to_string(),
            )),
        }
    }
}
