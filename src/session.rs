//! Session state: bearer tokens and single-flight refresh coordination.
//!
//! The store replaces ambient global auth state with an explicit handle
//! passed into the client. It guarantees that concurrent requests which
//! all observe an expired token trigger exactly one refresh: callers
//! record the refresh epoch they saw, and the first one through the
//! refresh lock performs the call while the rest reuse its result.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::{ApiError, Result};

/// A bearer access token plus the refresh token used to mint its successor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Short-lived bearer credential attached to every authenticated call.
    pub access_token: String,

    /// Longer-lived credential used to mint a new access token.
    pub refresh_token: String,

    /// Token type, always "Bearer" from this backend.
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// When the access token expires, if the server said.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenSet {
    /// Create a token set expiring `expires_in` seconds from now.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            expires_at: expires_in.map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
        }
    }

    /// Whether the access token is expired or expires within `leeway` seconds.
    pub fn is_expired(&self, leeway: i64) -> bool {
        match self.expires_at {
            Some(at) => at - ChronoDuration::seconds(leeway) <= Utc::now(),
            None => false,
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    tokens: RwLock<Option<TokenSet>>,
    /// Bumped on every successful refresh or login. A caller holding a
    /// stale epoch knows someone else already refreshed.
    epoch: AtomicU64,
    /// Serializes refresh attempts so only one is ever in flight.
    refresh_lock: Mutex<()>,
    /// Where to persist tokens between CLI invocations, if anywhere.
    file: Option<PathBuf>,
}

/// Cheaply clonable handle to the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Create an in-memory session store.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                tokens: RwLock::new(None),
                epoch: AtomicU64::new(0),
                refresh_lock: Mutex::new(()),
                file: None,
            }),
        }
    }

    /// Create a store backed by a session file, loading any saved tokens.
    pub fn with_file(path: PathBuf) -> Result<Self> {
        let tokens = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let tokens: TokenSet =
                    serde_json::from_str(&content).map_err(|e| ApiError::Decode {
                        context: format!("session file '{}'", path.display()),
                        source: e,
                    })?;
                debug!(path = %path.display(), "loaded session from file");
                Some(tokens)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(ApiError::FileRead {
                    path: path.clone(),
                    source: e,
                });
            }
        };

        Ok(Self {
            inner: Arc::new(SessionInner {
                tokens: RwLock::new(tokens),
                epoch: AtomicU64::new(0),
                refresh_lock: Mutex::new(()),
                file: Some(path),
            }),
        })
    }

    /// Whether a session is present.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.tokens.read().await.is_some()
    }

    /// Current access token, if authenticated.
    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    /// Current refresh token, if authenticated.
    pub async fn refresh_token(&self) -> Option<String> {
        self.inner
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    /// Current token set, if authenticated.
    pub async fn tokens(&self) -> Option<TokenSet> {
        self.inner.tokens.read().await.clone()
    }

    /// Refresh epoch observed right now. Compare with the value after a 401
    /// to detect a refresh completed by another request.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::Acquire)
    }

    /// Store new tokens (after login or refresh) and bump the epoch.
    pub async fn store(&self, tokens: TokenSet) -> Result<()> {
        if let Some(path) = &self.inner.file {
            let json = serde_json::to_string_pretty(&tokens).map_err(|e| ApiError::Decode {
                context: "session tokens".to_string(),
                source: e,
            })?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ApiError::FileWrite {
                    path: path.clone(),
                    source: e,
                })?;
            }
            std::fs::write(path, json).map_err(|e| ApiError::FileWrite {
                path: path.clone(),
                source: e,
            })?;
        }

        *self.inner.tokens.write().await = Some(tokens);
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Clear the session (logout or terminal session expiry).
    pub async fn clear(&self) -> Result<()> {
        if let Some(path) = &self.inner.file {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ApiError::FileWrite {
                        path: path.clone(),
                        source: e,
                    });
                }
            }
        }

        *self.inner.tokens.write().await = None;
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Run `refresh` at most once for all callers that observed the same
    /// epoch.
    ///
    /// The first caller through the lock performs the refresh and stores
    /// the new tokens; callers that queued behind it see the epoch has
    /// moved and return the already-refreshed token without another call.
    pub async fn refresh_once<F, Fut>(&self, observed_epoch: u64, refresh: F) -> Result<String>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<TokenSet>>,
    {
        let _guard = self.inner.refresh_lock.lock().await;

        if self.epoch() != observed_epoch {
            // Someone else refreshed while we waited for the lock.
            debug!("token already refreshed by a concurrent request");
            return self
                .access_token()
                .await
                .ok_or(ApiError::SessionExpired);
        }

        let refresh_token = self
            .refresh_token()
            .await
            .ok_or(ApiError::NotAuthenticated)?;

        match refresh(refresh_token).await {
            Ok(tokens) => {
                let access = tokens.access_token.clone();
                self.store(tokens).await?;
                debug!("access token refreshed");
                Ok(access)
            }
            Err(e) => {
                // A dead refresh token means the session is unrecoverable.
                self.clear().await.ok();
                debug!(error = %e, "token refresh failed, session cleared");
                Err(ApiError::SessionExpired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_clear() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated().await);

        store
            .store(TokenSet::new("access", "refresh", Some(3600)))
            .await
            .unwrap();
        assert!(store.is_authenticated().await);
        assert_eq!(store.access_token().await.as_deref(), Some("access"));

        store.clear().await.unwrap();
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_epoch_advances_on_store() {
        let store = SessionStore::in_memory();
        let before = store.epoch();
        store
            .store(TokenSet::new("a", "r", None))
            .await
            .unwrap();
        assert!(store.epoch() > before);
    }

    #[tokio::test]
    async fn test_refresh_once_skips_when_epoch_moved() {
        let store = SessionStore::in_memory();
        store
            .store(TokenSet::new("old", "refresh", None))
            .await
            .unwrap();
        let stale_epoch = store.epoch();

        // A concurrent request refreshes first.
        store
            .store(TokenSet::new("new", "refresh2", None))
            .await
            .unwrap();

        // Our refresh closure must not run.
        let token = store
            .refresh_once(stale_epoch, |_| async {
                panic!("refresh should not be called");
            })
            .await
            .unwrap();
        assert_eq!(token, "new");
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_session() {
        let store = SessionStore::in_memory();
        store
            .store(TokenSet::new("old", "refresh", None))
            .await
            .unwrap();
        let epoch = store.epoch();

        let result = store
            .refresh_once(epoch, |_| async { Err(ApiError::Unauthorized) })
            .await;
        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert!(!store.is_authenticated().await);
    }

    #[test]
    fn test_token_expiry() {
        let fresh = TokenSet::new("a", "r", Some(3600));
        assert!(!fresh.is_expired(60));

        let stale = TokenSet::new("a", "r", Some(30));
        assert!(stale.is_expired(60));

        let no_expiry = TokenSet::new("a", "r", None);
        assert!(!no_expiry.is_expired(60));
    }

    #[tokio::test]
    async fn test_file_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::with_file(path.clone()).unwrap();
        store
            .store(TokenSet::new("access", "refresh", Some(900)))
            .await
            .unwrap();

        let reloaded = SessionStore::with_file(path.clone()).unwrap();
        assert_eq!(reloaded.access_token().await.as_deref(), Some("access"));

        reloaded.clear().await.unwrap();
        assert!(!path.exists());
    }
}
