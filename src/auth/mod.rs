//! Session state
//!
//! Holds the signed-in [`User`] and owns the lifecycle of the bearer token
//! persisted under [`SESSION_TOKEN_KEY`]:
//!
//! - issued by `POST /api/auth/login` or `POST /api/auth/process-session`
//!   and stored by [`AuthState::begin_session`];
//! - validated once at startup by [`AuthState::restore`];
//! - revoked by [`AuthState::sign_out`], or dropped locally by
//!   [`AuthState::invalidate`] the first time any call answers 401.
//!
//! Expiry is decided by the server; the client only reacts to 401.

use crate::api::RecommendApi;
use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::storage::{KeyValueStore, SESSION_TOKEN_KEY};

/// Current identity plus the persisted token behind it
#[derive(Debug)]
pub struct AuthState<S: KeyValueStore> {
    store: S,
    user: Option<User>,
    loading: bool,
}

impl<S: KeyValueStore> AuthState<S> {
    /// Create a logged-out state that is still loading
    pub const fn new(store: S) -> Self {
        Self {
            store,
            user: None,
            loading: true,
        }
    }

    /// The signed-in user, if any
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a user is signed in
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the startup session check is still running
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the current identity
    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Set the readiness flag
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Read the persisted token. Storage errors read as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.get(SESSION_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session token: {e}");
                None
            }
        }
    }

    /// Persist a freshly issued token and adopt its user
    pub fn begin_session(&mut self, token: &str, user: User) -> anyhow::Result<()> {
        self.store.set(SESSION_TOKEN_KEY, token)?;
        tracing::info!("Signed in as @{}", user.username);
        self.user = Some(user);
        self.loading = false;
        Ok(())
    }

    /// Clear the persisted token and the identity.
    ///
    /// A failing store is logged; the identity is cleared regardless.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.remove(SESSION_TOKEN_KEY) {
            tracing::warn!("Failed to remove session token: {e}");
        }
        self.user = None;
    }

    /// Drop the session after the server rejected it
    pub fn invalidate(&mut self) {
        tracing::info!("Session rejected, signing out");
        self.logout();
    }

    /// Pass an API result through, invalidating the session on 401
    pub fn observe<T>(&mut self, result: ApiResult<T>) -> ApiResult<T> {
        if matches!(result, Err(ApiError::Unauthorized)) {
            self.invalidate();
        }
        result
    }

    /// Validate a stored token against the server at startup.
    ///
    /// Any failure, including a network error, discards the token.
    pub async fn restore<A: RecommendApi>(&mut self, api: &A) {
        self.loading = true;

        if let Some(token) = self.token() {
            match api.me(&token).await {
                Ok(user) => {
                    tracing::info!("Restored session for @{}", user.username);
                    self.user = Some(user);
                }
                Err(e) => {
                    tracing::info!("No usable session: {e}");
                    self.logout();
                }
            }
        } else {
            tracing::debug!("No stored session token");
        }

        self.loading = false;
    }

    /// Revoke the token on the server (best effort), then log out locally
    pub async fn sign_out<A: RecommendApi>(&mut self, api: &A) {
        if let Some(token) = self.token()
            && let Err(e) = api.logout(&token).await
        {
            tracing::warn!("Server logout failed: {e}");
        }
        self.logout();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::PostQuery;
    use crate::models::{AuthResponse, Comment, LikeResponse, LoginRequest, NewPost, NewRoom, Post, Room};
    use crate::storage::{EncryptedFileStore, MemoryStore, StorageError};
    use reqwest::StatusCode;
    use std::cell::Cell;

    pub fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            name: "Demo User".to_string(),
            username: "demouser".to_string(),
            email: "demo@example.com".to_string(),
            avatar: None,
            bio: None,
            external_link: None,
            follower_count: 12,
            following_count: 25,
        }
    }

    /// Store whose writes and removals always fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(Some("stale-token".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }
    }

    /// Backend that answers `me` with a fixed outcome and counts logouts
    struct FakeApi {
        me: fn() -> ApiResult<User>,
        logouts: Cell<u32>,
    }

    impl FakeApi {
        fn new(me: fn() -> ApiResult<User>) -> Self {
            Self {
                me,
                logouts: Cell::new(0),
            }
        }
    }

    impl RecommendApi for FakeApi {
        async fn me(&self, _token: &str) -> ApiResult<User> {
            (self.me)()
        }
        async fn login(&self, _request: &LoginRequest) -> ApiResult<AuthResponse> {
            unimplemented!()
        }
        async fn process_session(&self, _session_id: &str) -> ApiResult<AuthResponse> {
            unimplemented!()
        }
        async fn logout(&self, _token: &str) -> ApiResult<()> {
            self.logouts.set(self.logouts.get() + 1);
            Err(ApiError::Status {
                status: StatusCode::BAD_GATEWAY,
                detail: "down".to_string(),
            })
        }
        async fn posts(&self, _token: Option<&str>, _query: &PostQuery) -> ApiResult<Vec<Post>> {
            unimplemented!()
        }
        async fn create_post(&self, _token: &str, _post: &NewPost) -> ApiResult<Post> {
            unimplemented!()
        }
        async fn like(&self, _token: &str, _post_id: &str) -> ApiResult<LikeResponse> {
            unimplemented!()
        }
        async fn comments(&self, _post_id: &str) -> ApiResult<Vec<Comment>> {
            unimplemented!()
        }
        async fn my_rooms(&self, _token: &str) -> ApiResult<Vec<Room>> {
            unimplemented!()
        }
        async fn create_room(&self, _token: &str, _room: &NewRoom) -> ApiResult<Room> {
            unimplemented!()
        }
    }

    fn signed_in() -> AuthState<MemoryStore> {
        let mut auth = AuthState::new(MemoryStore::new());
        auth.begin_session("tok", sample_user()).unwrap();
        auth
    }

    #[test]
    fn test_begin_session_persists_token() {
        let auth = signed_in();
        assert_eq!(auth.token().as_deref(), Some("tok"));
        assert!(auth.is_authenticated());
        assert!(!auth.is_loading());
    }

    #[test]
    fn test_begin_session_after_store_key_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.enc");
        EncryptedFileStore::with_key(&path, [1u8; 32])
            .set(SESSION_TOKEN_KEY, "old")
            .unwrap();

        let mut auth = AuthState::new(EncryptedFileStore::with_key(&path, [2u8; 32]));
        auth.begin_session("tok", sample_user()).unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_logout_clears_token_and_user() {
        let mut auth = signed_in();
        auth.logout();
        assert_eq!(auth.token(), None);
        assert!(auth.user().is_none());
    }

    #[test]
    fn test_logout_clears_user_when_store_fails() {
        let mut auth = AuthState::new(BrokenStore);
        auth.set_user(Some(sample_user()));

        auth.logout();
        assert!(auth.user().is_none());
    }

    #[test]
    fn test_unauthorized_result_invalidates_session() {
        let mut auth = signed_in();

        let ok: ApiResult<u32> = auth.observe(Ok(3));
        assert_eq!(ok.unwrap(), 3);
        assert!(auth.is_authenticated());

        let other: ApiResult<()> = auth.observe(Err(ApiError::validation("nope")));
        assert!(other.is_err());
        assert!(auth.is_authenticated());

        let result: ApiResult<()> = auth.observe(Err(ApiError::Unauthorized));
        assert!(result.is_err());
        assert_eq!(auth.token(), None);
        assert!(auth.user().is_none());
    }

    #[tokio::test]
    async fn test_restore_valid_token() {
        let store = MemoryStore::new();
        store.set(SESSION_TOKEN_KEY, "tok").unwrap();
        let mut auth = AuthState::new(store);

        auth.restore(&FakeApi::new(|| Ok(sample_user()))).await;
        assert_eq!(auth.user().map(|u| u.username.as_str()), Some("demouser"));
        assert!(!auth.is_loading());
        assert_eq!(auth.token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_restore_rejected_token_is_removed() {
        let store = MemoryStore::new();
        store.set(SESSION_TOKEN_KEY, "expired").unwrap();
        let mut auth = AuthState::new(store);

        auth.restore(&FakeApi::new(|| Err(ApiError::Unauthorized))).await;
        assert!(auth.user().is_none());
        assert_eq!(auth.token(), None);
        assert!(!auth.is_loading());
    }

    #[test]
    fn test_restore_server_error_counts_as_no_session() {
        let store = MemoryStore::new();
        store.set(SESSION_TOKEN_KEY, "tok").unwrap();
        let mut auth = AuthState::new(store);

        let api = FakeApi::new(|| {
            Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: "boom".to_string(),
            })
        });
        tokio_test::block_on(auth.restore(&api));
        assert!(auth.user().is_none());
        assert_eq!(auth.token(), None);
    }

    #[test]
    fn test_restore_without_token_skips_network() {
        let mut auth = AuthState::new(MemoryStore::new());
        tokio_test::block_on(auth.restore(&FakeApi::new(|| unreachable!())));
        assert!(auth.user().is_none());
        assert!(!auth.is_loading());
    }

    #[test]
    fn test_sign_out_clears_even_if_server_fails() {
        let mut auth = signed_in();
        let api = FakeApi::new(|| Ok(sample_user()));

        tokio_test::block_on(auth.sign_out(&api));
        assert_eq!(api.logouts.get(), 1);
        assert!(auth.user().is_none());
        assert_eq!(auth.token(), None);
    }
}
