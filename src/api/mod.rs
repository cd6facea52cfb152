//! API client for the i-Recommend backend

pub mod http;

pub use http::HttpClient;

use crate::config::Config;
use crate::error::ApiResult;
use crate::models::{AuthResponse, Comment, LikeResponse, LoginRequest, NewPost, NewRoom, Post, Room, User};

/// Filters for `GET /api/posts`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Maximum number of posts
    pub limit: usize,
    /// Number of posts to skip
    pub skip: usize,
    /// Only posts in this room
    pub room_id: Option<String>,
    /// Only posts by this user
    pub username: Option<String>,
}

impl PostQuery {
    /// Newest posts, up to `limit`
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit,
            skip: 0,
            room_id: None,
            username: None,
        }
    }

    /// Restrict to a room
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Restrict to an author
    pub fn by_user(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Render as a URL query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut parts = vec![format!("limit={}", self.limit)];
        if self.skip > 0 {
            parts.push(format!("skip={}", self.skip));
        }
        if let Some(room_id) = &self.room_id {
            parts.push(format!("room_id={}", urlencoding::encode(room_id)));
        }
        if let Some(username) = &self.username {
            parts.push(format!("username={}", urlencoding::encode(username)));
        }
        parts.join("&")
    }
}

/// Operations the client needs from the backend
#[allow(async_fn_in_trait)]
pub trait RecommendApi {
    /// Get the user owning `token`
    async fn me(&self, token: &str) -> ApiResult<User>;

    /// Exchange email and password for a session
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    /// Exchange an external auth provider's session id for a session
    async fn process_session(&self, session_id: &str) -> ApiResult<AuthResponse>;

    /// Revoke `token` on the server
    async fn logout(&self, token: &str) -> ApiResult<()>;

    /// List posts, newest first
    async fn posts(&self, token: Option<&str>, query: &PostQuery) -> ApiResult<Vec<Post>>;

    /// Publish a post
    async fn create_post(&self, token: &str, post: &NewPost) -> ApiResult<Post>;

    /// Toggle the caller's like on a post
    async fn like(&self, token: &str, post_id: &str) -> ApiResult<LikeResponse>;

    /// List comments on a post, oldest first
    async fn comments(&self, post_id: &str) -> ApiResult<Vec<Comment>>;

    /// List the caller's rooms
    async fn my_rooms(&self, token: &str) -> ApiResult<Vec<Room>>;

    /// Create a room
    async fn create_room(&self, token: &str, room: &NewRoom) -> ApiResult<Room>;
}

/// Build the HTTP client described by `config`
pub fn client(config: &Config) -> anyhow::Result<HttpClient> {
    Ok(HttpClient::new(&config.backend_url, config.request_timeout())?)
}
