//! Session directories.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use roster_core::error::AuthError;
use roster_core::{Result, SessionDirectory, SessionToken, UserIdentity};

/// One account in the login subsystem's users file.
///
/// Only the fields needed to resolve a session are read; credentials stored
/// alongside them are skipped by the deserializer and never held in memory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginUser {
    username: String,
    #[serde(default)]
    active_sessions: Vec<String>,
}

/// One entry of a token-keyed sessions file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionEntry {
    user: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

/// On-disk layouts accepted for the sessions file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SessionFile {
    /// The login subsystem's users file: an array of accounts, each listing
    /// its active session tokens.
    Users(Vec<LoginUser>),
    /// A map from token to user, with optional expiry.
    Tokens {
        #[serde(default)]
        sessions: HashMap<String, SessionEntry>,
    },
}

impl Default for SessionFile {
    fn default() -> Self {
        Self::Users(Vec::new())
    }
}

impl SessionFile {
    fn resolve(&self, token: &str) -> Option<UserIdentity> {
        match self {
            Self::Users(users) => users
                .iter()
                .find(|u| u.active_sessions.iter().any(|s| s == token))
                .map(|u| UserIdentity::new(&u.username)),
            Self::Tokens { sessions } => {
                let entry = sessions.get(token)?;
                if entry.expires_at.is_some_and(|at| at <= Utc::now()) {
                    debug!(user = %entry.user, "Session expired");
                    return None;
                }
                Some(UserIdentity::new(&entry.user))
            }
        }
    }
}

/// Session directory backed by a JSON file owned by the login subsystem.
///
/// The file is re-read on every lookup, so sessions issued or revoked by
/// the login flow take effect immediately. A missing file means no session
/// is valid. Two layouts are accepted; the login subsystem's users file
///
/// ```json
/// [ { "username": "maria", "secureCode": "…", "activeSessions": ["session_9f2c…"] } ]
/// ```
///
/// and a token map with optional expiry:
///
/// ```json
/// { "sessions": { "<token>": { "user": "maria", "expiresAt": "2030-01-01T00:00:00Z" } } }
/// ```
#[derive(Debug, Clone)]
pub struct FileSessionDirectory {
    path: PathBuf,
}

impl FileSessionDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the sessions file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SessionFile> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Sessions file absent");
                return Ok(SessionFile::default());
            }
            Err(e) => {
                return Err(AuthError::DirectoryUnavailable {
                    message: format!("{}: {}", self.path.display(), e),
                }
                .into());
            }
        };

        // serde's own message may quote file content; keep it out of errors.
        serde_json::from_str(&content).map_err(|_| {
            AuthError::Malformed {
                message: format!(
                    "{}: not a users array or sessions map",
                    self.path.display()
                ),
            }
            .into()
        })
    }
}

#[async_trait]
impl SessionDirectory for FileSessionDirectory {
    #[instrument(skip(self, token))]
    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserIdentity>> {
        Ok(self.load().await?.resolve(token.as_str()))
    }
}

/// In-process session directory.
#[derive(Debug, Default)]
pub struct MemorySessionDirectory {
    sessions: RwLock<HashMap<String, UserIdentity>>,
}

impl MemorySessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session token for a user.
    pub fn insert(&self, token: &SessionToken, user: UserIdentity) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.as_str().to_string(), user);
    }

    /// Revoke a session; returns whether it existed.
    pub fn revoke(&self, token: &SessionToken) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token.as_str())
            .is_some()
    }
}

#[async_trait]
impl SessionDirectory for MemorySessionDirectory {
    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserIdentity>> {
        Ok(self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token.as_str())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Error;
    use serde_json::json;
    use tempfile::TempDir;

    fn token(s: &str) -> SessionToken {
        SessionToken::new(s).unwrap()
    }

    #[tokio::test]
    async fn file_directory_resolves_known_tokens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(
            &path,
            json!({
                "sessions": {
                    "tok-maria": { "user": "maria" },
                    "tok-old": { "user": "luca", "expiresAt": "2001-01-01T00:00:00Z" },
                    "tok-future": { "user": "anna", "expiresAt": "2999-01-01T00:00:00Z" }
                }
            })
            .to_string(),
        )
        .unwrap();

        let sessions = FileSessionDirectory::new(&path);
        assert_eq!(
            sessions.resolve(&token("tok-maria")).await.unwrap(),
            Some(UserIdentity::new("maria"))
        );
        assert_eq!(
            sessions.resolve(&token("tok-future")).await.unwrap(),
            Some(UserIdentity::new("anna"))
        );
        assert_eq!(sessions.resolve(&token("tok-old")).await.unwrap(), None);
        assert_eq!(sessions.resolve(&token("nope")).await.unwrap(), None);
    }

    fn write_users(path: &Path) {
        std::fs::write(
            path,
            json!([
                {
                    "username": "maria",
                    "secureCode": "hunter2-hash",
                    "activeSessions": ["session_4f1a", "session_77b0"]
                },
                { "username": "luca", "secureCode": "other-hash", "activeSessions": [] },
                { "username": "anna", "secureCode": "third-hash" }
            ])
            .to_string(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn login_users_file_resolves_active_sessions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        write_users(&path);

        let sessions = FileSessionDirectory::new(&path);
        for t in ["session_4f1a", "session_77b0"] {
            assert_eq!(
                sessions.resolve(&token(t)).await.unwrap(),
                Some(UserIdentity::new("maria"))
            );
        }
        assert_eq!(sessions.resolve(&token("session_dead")).await.unwrap(), None);
        // A credential is not a session.
        assert_eq!(sessions.resolve(&token("hunter2-hash")).await.unwrap(), None);
        assert_eq!(sessions.resolve(&token("maria")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_users_file_keeps_no_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        write_users(&path);

        let loaded = FileSessionDirectory::new(&path).load().await.unwrap();
        let dumped = format!("{:?}", loaded);
        assert!(dumped.contains("maria"));
        assert!(!dumped.contains("hunter2-hash"));
        assert!(!dumped.contains("secure"));
    }

    #[tokio::test]
    async fn malformed_users_file_does_not_echo_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, r#"[{"secureCode": "hunter2-hash"}]"#).unwrap();

        let err = FileSessionDirectory::new(&path)
            .resolve(&token("t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Malformed { .. })));
        assert!(!err.to_string().contains("hunter2-hash"));
    }

    #[tokio::test]
    async fn file_directory_sees_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        let sessions = FileSessionDirectory::new(&path);

        assert_eq!(sessions.resolve(&token("t1")).await.unwrap(), None);

        std::fs::write(&path, r#"{"sessions":{"t1":{"user":"giulia"}}}"#).unwrap();
        assert!(sessions.resolve(&token("t1")).await.unwrap().is_some());

        std::fs::write(&path, r#"{"sessions":{}}"#).unwrap();
        assert!(sessions.resolve(&token("t1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSessionDirectory::new(&path)
            .resolve(&token("t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Malformed { .. })));
    }

    #[tokio::test]
    async fn memory_directory_insert_and_revoke() {
        let sessions = MemorySessionDirectory::new();
        let t = token("abc");

        assert!(sessions.resolve(&t).await.unwrap().is_none());
        sessions.insert(&t, UserIdentity::new("maria"));
        assert_eq!(
            sessions.resolve(&t).await.unwrap(),
            Some(UserIdentity::new("maria"))
        );
        assert!(sessions.revoke(&t));
        assert!(!sessions.revoke(&t));
        assert!(sessions.resolve(&t).await.unwrap().is_none());
    }
}
