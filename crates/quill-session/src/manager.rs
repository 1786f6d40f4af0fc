//! Session manager: login, logout and session restore.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_client::{Credentials, QuillClient};
use tracing::{debug, info, warn};

use crate::claims::Claims;
use crate::error::{DecodeError, Result, StorageError};
use crate::store::{FileTokenStore, TokenStore};

// ============================================================================
// Session
// ============================================================================

/// An authenticated session: the raw token plus the claims decoded from it.
///
/// Claims are always derived from `raw_token`, never stored on their own.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    raw_token: String,
    claims: Claims,
}

impl Session {
    /// Decode a raw token into a session.
    pub fn from_token(raw_token: impl Into<String>) -> std::result::Result<Self, DecodeError> {
        let raw_token = raw_token.into();
        let claims = Claims::decode(&raw_token)?;
        Ok(Self { raw_token, claims })
    }

    /// Restore from the storage slot encoding (a JSON string literal).
    fn from_stored(stored: &str) -> std::result::Result<Self, DecodeError> {
        let raw: String = serde_json::from_str(stored)?;
        Self::from_token(raw)
    }

    /// Encode for the storage slot.
    fn to_stored(&self) -> std::result::Result<String, StorageError> {
        serde_json::to_string(&self.raw_token)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// The bearer credential.
    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Numeric id of the logged-in user.
    pub fn subject_id(&self) -> Option<i64> {
        self.claims.subject_id()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }

    /// Whether the `exp` claim lies in the past.
    ///
    /// Informational only: an expired token still counts as a session until
    /// logout, and the server decides whether to honour it.
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|exp| exp <= Utc::now())
    }
}

// ============================================================================
// Authenticator
// ============================================================================

/// Exchanges credentials for a raw token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String>;
}

#[async_trait]
impl Authenticator for QuillClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        Ok(self.auth().token(credentials).await?)
    }
}

/// Shared authenticator for use across async contexts.
pub type SharedAuthenticator = Arc<dyn Authenticator>;

// ============================================================================
// SessionManager
// ============================================================================

/// Owns the persisted token and everything derived from it.
///
/// Auth state is pull-based: callers ask [`is_logged_in`](Self::is_logged_in)
/// or [`session`](Self::session) whenever they render, and re-render after
/// [`login`](Self::login) / [`logout`](Self::logout) themselves.
pub struct SessionManager<S: TokenStore = FileTokenStore> {
    store: S,
    authenticator: SharedAuthenticator,
}

impl<S: TokenStore> std::fmt::Debug for SessionManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

impl<S: TokenStore> SessionManager<S> {
    pub fn new(store: S, authenticator: SharedAuthenticator) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// True iff a token is persisted. Does not decode it.
    pub fn is_logged_in(&self) -> bool {
        match self.store.get() {
            Ok(slot) => slot.is_some(),
            Err(e) => {
                warn!(error = %e, "Token slot unreadable, treating as logged out");
                false
            }
        }
    }

    /// Rebuild the session from storage.
    ///
    /// Returns `None` when nothing is stored or the stored token does not
    /// decode.
    pub fn session(&self) -> Option<Session> {
        let stored = match self.store.get() {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Token slot unreadable, treating as logged out");
                return None;
            }
        };

        match Session::from_stored(&stored) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Stored token does not decode, ignoring it");
                None
            }
        }
    }

    /// Send credentials and persist the returned token.
    ///
    /// The token is decoded before anything is written, so on every error
    /// path the store is left untouched.
    pub async fn login(&self, name: &str, password: &str) -> Result<Session> {
        let credentials = Credentials::new(name, password);
        debug!(name = %name, "Logging in");

        let raw = self.authenticator.authenticate(&credentials).await?;
        let session = Session::from_token(raw)?;
        self.store.set(&session.to_stored()?)?;

        info!(name = %name, subject = ?session.subject_id(), "Logged in");
        Ok(session)
    }

    /// Forget the persisted token. Logging out twice is fine.
    pub fn logout(&self) -> std::result::Result<(), StorageError> {
        self.store.remove()?;
        info!("Logged out");
        Ok(())
    }
}

impl SessionManager<FileTokenStore> {
    /// File-backed manager talking to the blog backend through `client`.
    pub fn with_client(store: FileTokenStore, client: QuillClient) -> Self {
        Self::new(store, Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::unsigned_token;
    use crate::error::AuthError;
    use crate::store::MemoryTokenStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned answer and counts calls.
    struct FakeAuthenticator {
        answer: std::result::Result<String, fn() -> AuthError>,
        calls: AtomicUsize,
    }

    impl FakeAuthenticator {
        fn ok(token: String) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(token),
                calls: AtomicUsize::new(0),
            })
        }

        fn err(make: fn() -> AuthError) -> Arc<Self> {
            Arc::new(Self {
                answer: Err(make),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Authenticator for FakeAuthenticator {
        async fn authenticate(&self, _credentials: &Credentials) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Ok(token) => Ok(token.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    /// Store whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyStore(MemoryTokenStore);

    impl TokenStore for ReadOnlyStore {
        fn get(&self) -> std::result::Result<Option<String>, StorageError> {
            self.0.get()
        }

        fn set(&self, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Io {
                path: "<memory>".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self) -> std::result::Result<(), StorageError> {
            self.0.remove()
        }
    }

    fn martin_token() -> String {
        unsigned_token(&json!({"sub": "0", "exp": 4_000_000_000i64}))
    }

    #[tokio::test]
    async fn test_login_persists_and_restores() {
        let auth = FakeAuthenticator::ok(martin_token());
        let manager = SessionManager::new(MemoryTokenStore::new(), auth.clone());
        assert!(!manager.is_logged_in());
        assert!(manager.session().is_none());

        let session = manager.login("martin", "martin4817").await.unwrap();
        assert_eq!(session.subject_id(), Some(0));
        assert!(!session.is_expired());
        assert_eq!(auth.calls.load(Ordering::SeqCst), 1);

        assert!(manager.is_logged_in());
        let restored = manager.session().unwrap();
        assert_eq!(restored, session);

        // Slot holds the JSON-encoded token.
        let stored = manager.store().get().unwrap().unwrap();
        assert_eq!(stored, format!("\"{}\"", martin_token()));
    }

    #[tokio::test]
    async fn test_login_accepts_fractional_expiry() {
        let token = unsigned_token(&json!({"sub": "0", "exp": 4_000_000_000.5}));
        let manager = SessionManager::new(MemoryTokenStore::new(), FakeAuthenticator::ok(token));

        let session = manager.login("martin", "martin4817").await.unwrap();
        assert_eq!(session.claims().exp, Some(4_000_000_000));
        assert_eq!(manager.session().unwrap().subject_id(), Some(0));
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_store_untouched() {
        let auth = FakeAuthenticator::err(|| AuthError::Rejected("Invalid credentials".into()));
        let manager = SessionManager::new(MemoryTokenStore::new(), auth);

        let err = manager.login("martin", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
        assert!(!manager.is_logged_in());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let auth = FakeAuthenticator::err(|| AuthError::Network("connection refused".into()));
        let stored = serde_json::to_string(&martin_token()).unwrap();
        let manager = SessionManager::new(MemoryTokenStore::with_value(stored.clone()), auth);

        assert!(manager.login("martin", "martin4817").await.is_err());
        assert_eq!(manager.store().get().unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_undecodable_token_is_not_persisted() {
        let auth = FakeAuthenticator::ok("garbage".to_string());
        let manager = SessionManager::new(MemoryTokenStore::new(), auth);

        let err = manager.login("martin", "martin4817").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert!(!manager.is_logged_in());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_auth_error() {
        let auth = FakeAuthenticator::ok(martin_token());
        let manager = SessionManager::new(ReadOnlyStore::default(), auth);

        let err = manager.login("martin", "martin4817").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        assert!(!manager.is_logged_in());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let stored = serde_json::to_string(&martin_token()).unwrap();
        let manager = SessionManager::new(
            MemoryTokenStore::with_value(stored),
            FakeAuthenticator::ok(martin_token()),
        );
        assert!(manager.is_logged_in());

        manager.logout().unwrap();
        assert!(!manager.is_logged_in());
        manager.logout().unwrap();
        assert!(!manager.is_logged_in());
        assert!(manager.session().is_none());
    }

    #[test]
    fn test_corrupt_stored_token_is_no_session() {
        for corrupt in ["not json", "\"not.a-token\"", "\"a.!!!.c\"", "42"] {
            let manager = SessionManager::new(
                MemoryTokenStore::with_value(corrupt),
                FakeAuthenticator::ok(martin_token()),
            );
            assert!(manager.is_logged_in(), "slot is filled for {corrupt}");
            assert!(manager.session().is_none(), "no session for {corrupt}");
        }
    }

    #[test]
    fn test_expired_token_still_restores() {
        let token = unsigned_token(&json!({"sub": "3", "exp": 1}));
        let manager = SessionManager::new(
            MemoryTokenStore::with_value(serde_json::to_string(&token).unwrap()),
            FakeAuthenticator::ok(token.clone()),
        );
        let session = manager.session().unwrap();
        assert!(session.is_expired());
        assert_eq!(session.subject_id(), Some(3));
    }
}
