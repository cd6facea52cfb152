//! HTTP implementation of [`RecommendApi`]

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{PostQuery, RecommendApi};
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, Comment, LikeResponse, LoginRequest, NewPost, NewRoom, Post, Room, User};

/// reqwest-backed API client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api{}", self.base_url, endpoint)
    }

    fn authorized(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {token}"))
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder, what: &str) -> ApiResult<T> {
        let response = builder.send().await.inspect_err(|e| {
            tracing::warn!("{what} failed: {e}");
        })?;
        let response = check_status(response, what).await?;
        Ok(response.json().await?)
    }
}

/// Map non-success responses to [`ApiError`]
async fn check_status(response: Response, what: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        tracing::info!("{what}: session rejected by server");
        return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    tracing::warn!("{what}: {status} {detail}");
    Err(ApiError::Status { status, detail })
}

/// Extract `detail` from a backend error body, or fall back to the raw text
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(trimmed.to_string()),
        },
        Err(_) => Some(trimmed.to_string()),
    }
}

impl RecommendApi for HttpClient {
    async fn me(&self, token: &str) -> ApiResult<User> {
        let request = Self::authorized(self.client.get(self.api_url("/auth/me")), token);
        Self::send(request, "Fetch current user").await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let builder = self.client.post(self.api_url("/auth/login")).json(request);
        Self::send(builder, "Login").await
    }

    async fn process_session(&self, session_id: &str) -> ApiResult<AuthResponse> {
        let builder = self
            .client
            .post(self.api_url("/auth/process-session"))
            .json(&serde_json::json!({ "session_id": session_id }));
        Self::send(builder, "Session exchange").await
    }

    async fn logout(&self, token: &str) -> ApiResult<()> {
        let request = Self::authorized(self.client.post(self.api_url("/auth/logout")), token);
        let response = request.send().await?;
        check_status(response, "Logout").await?;
        Ok(())
    }

    async fn posts(&self, token: Option<&str>, query: &PostQuery) -> ApiResult<Vec<Post>> {
        let url = self.api_url(&format!("/posts?{}", query.to_query_string()));
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = Self::authorized(request, token);
        }
        Self::send(request, "Fetch posts").await
    }

    async fn create_post(&self, token: &str, post: &NewPost) -> ApiResult<Post> {
        let request = Self::authorized(self.client.post(self.api_url("/posts")), token).json(post);
        Self::send(request, "Create post").await
    }

    async fn like(&self, token: &str, post_id: &str) -> ApiResult<LikeResponse> {
        let url = self.api_url(&format!("/posts/{}/like", urlencoding::encode(post_id)));
        let request = Self::authorized(self.client.post(url), token);
        Self::send(request, "Like post").await
    }

    async fn comments(&self, post_id: &str) -> ApiResult<Vec<Comment>> {
        let url = self.api_url(&format!("/posts/{}/comments", urlencoding::encode(post_id)));
        Self::send(self.client.get(url), "Fetch comments").await
    }

    async fn my_rooms(&self, token: &str) -> ApiResult<Vec<Room>> {
        let request = Self::authorized(self.client.get(self.api_url("/rooms/my")), token);
        Self::send(request, "Fetch rooms").await
    }

    async fn create_room(&self, token: &str, room: &NewRoom) -> ApiResult<Room> {
        let request = Self::authorized(self.client.post(self.api_url("/rooms")), token).json(room);
        Self::send(request, "Create room").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let client = HttpClient::new("https://rec.example.org/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://rec.example.org");
        assert_eq!(client.api_url("/rooms/my"), "https://rec.example.org/api/rooms/my");
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail": "Title must be 80 characters or less"}"#).as_deref(),
            Some("Title must be 80 characters or less")
        );
        assert_eq!(
            error_detail(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#).as_deref(),
            Some(r#"[{"loc":["body"],"msg":"field required"}]"#)
        );
        assert_eq!(error_detail("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_detail("   "), None);
    }
}
