//! Request bodies and their client-side validation

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::room::parse_hex_color;
use super::{ActionType, MediaKind, RecommendationType, User};
use crate::error::{ApiError, ApiResult};

/// Maximum title length accepted by the backend
pub const MAX_TITLE_CHARS: usize = 80;
/// Maximum description length accepted by the backend
pub const MAX_DESCRIPTION_CHARS: usize = 280;
/// Maximum room name length
pub const MAX_ROOM_NAME_CHARS: usize = 30;

/// Colours offered when creating a room
pub const ROOM_COLORS: [&str; 10] = [
    "#FF3B30", // Red
    "#FF9500", // Orange
    "#FFCC00", // Yellow
    "#34C759", // Green
    "#00C7BE", // Teal
    "#007AFF", // Blue
    "#5856D6", // Indigo
    "#AF52DE", // Purple
    "#FF2D92", // Pink
    "#8E8E93", // Gray
];

/// `POST /api/auth/login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Lower-cased, trimmed email
    pub email: String,
    /// Password as typed
    pub password: String,
}

impl LoginRequest {
    /// Validate the form and normalize the email
    pub fn new(email: &str, password: &str) -> ApiResult<Self> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(ApiError::validation("Please fill in all fields"));
        }
        if !email.contains('@') {
            return Err(ApiError::validation("Please enter a valid email address"));
        }
        Ok(Self {
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        })
    }
}

/// Successful login or session exchange
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Bearer token to persist
    #[serde(alias = "session_token")]
    pub access_token: String,
    /// The signed-in user
    pub user: User,
}

/// `POST /api/rooms` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoom {
    /// Trimmed room name
    pub name: String,
    /// Hex colour
    pub color: String,
}

impl NewRoom {
    /// Validate and normalize a room form
    pub fn new(name: &str, color: &str) -> ApiResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Please enter a room name"));
        }
        if name.chars().count() > MAX_ROOM_NAME_CHARS {
            return Err(ApiError::validation(format!(
                "Room name must be {MAX_ROOM_NAME_CHARS} characters or less"
            )));
        }
        if parse_hex_color(color).is_none() {
            return Err(ApiError::validation(format!("Invalid colour: {color}")));
        }
        Ok(Self {
            name: name.to_string(),
            color: color.trim().to_uppercase(),
        })
    }
}

/// `POST /api/posts` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    /// Target room
    pub room_id: String,
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// Media data URI (empty when none)
    pub media: String,
    /// Kind of media
    pub media_type: MediaKind,
    /// Tags
    pub tags: Vec<String>,
    /// Link to the recommended thing (empty when none)
    pub external_link: String,
    /// Recommend or warn against
    pub recommendation_type: RecommendationType,
    /// Buy / listen / watch / read
    pub action_type: ActionType,
}

impl NewPost {
    /// Build a post with the required fields; optional ones start empty
    pub fn new(room_id: &str, title: &str, description: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            media: String::new(),
            media_type: MediaKind::Image,
            tags: Vec::new(),
            external_link: String::new(),
            recommendation_type: RecommendationType::Recommend,
            action_type: ActionType::Buy,
        }
    }

    /// Check the form and trim text fields
    pub fn validated(mut self) -> ApiResult<Self> {
        if self.room_id.trim().is_empty() {
            return Err(ApiError::validation("Please select a room first"));
        }

        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.external_link = self.external_link.trim().to_string();

        if self.title.is_empty() {
            return Err(ApiError::validation("Please enter a title"));
        }
        if self.description.is_empty() {
            return Err(ApiError::validation("Please enter a description"));
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(ApiError::validation(format!(
                "Title must be {MAX_TITLE_CHARS} characters or less"
            )));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ApiError::validation(format!(
                "Description must be {MAX_DESCRIPTION_CHARS} characters or less"
            )));
        }

        Ok(self)
    }

    /// Attach an image file as a base64 data URI
    pub fn with_image_file(mut self, path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let mime = image_mime(path)
            .with_context(|| format!("Unsupported image type: {}", path.display()))?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.media = format!("data:{mime};base64,{encoded}");
        self.media_type = MediaKind::Image;
        Ok(self)
    }
}

/// Split a comma-separated tag list, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Decoded size in bytes of a base64 data URI, if it is one
pub fn data_uri_size(uri: &str) -> Option<usize> {
    let (_, payload) = uri.strip_prefix("data:")?.split_once(";base64,")?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()
        .map(|bytes| bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_login_validation() {
        assert!(matches!(
            LoginRequest::new("", "secret"),
            Err(ApiError::Validation(msg)) if msg == "Please fill in all fields"
        ));
        assert!(matches!(
            LoginRequest::new("not-an-email", "secret"),
            Err(ApiError::Validation(msg)) if msg == "Please enter a valid email address"
        ));

        let req = LoginRequest::new("  Demo@Example.COM ", "Secret").unwrap();
        assert_eq!(req.email, "demo@example.com");
        assert_eq!(req.password, "Secret");
    }

    #[test]
    fn test_room_validation() {
        assert!(NewRoom::new("   ", ROOM_COLORS[0]).is_err());
        assert!(NewRoom::new(&"x".repeat(31), ROOM_COLORS[0]).is_err());
        assert!(NewRoom::new("Books", "blue").is_err());

        let room = NewRoom::new("  Books ", "#5856d6").unwrap();
        assert_eq!(room.name, "Books");
        assert_eq!(room.color, "#5856D6");
    }

    #[test]
    fn test_post_validation() {
        let missing_room = NewPost::new("", "Title", "Body").validated();
        assert!(matches!(missing_room, Err(ApiError::Validation(msg)) if msg == "Please select a room first"));

        let blank_title = NewPost::new("r1", "   ", "Body").validated();
        assert!(matches!(blank_title, Err(ApiError::Validation(msg)) if msg == "Please enter a title"));

        let long_title = NewPost::new("r1", &"t".repeat(81), "Body").validated();
        assert!(long_title.is_err());

        let long_body = NewPost::new("r1", "Title", &"d".repeat(281)).validated();
        assert!(long_body.is_err());

        let ok = NewPost::new("r1", " Title ", " Body ").validated().unwrap();
        assert_eq!(ok.title, "Title");
        assert_eq!(ok.description, "Body");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("italian, pasta,, romantic ,"), vec!["italian", "pasta", "romantic"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_image_data_uri() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let post = NewPost::new("r1", "Title", "Body").with_image_file(&path).unwrap();
        assert!(post.media.starts_with("data:image/png;base64,"));
        assert_eq!(data_uri_size(&post.media), Some(4));

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hi").unwrap();
        assert!(NewPost::new("r1", "T", "B").with_image_file(&txt).is_err());
    }

    #[test]
    fn test_auth_response_aliases() {
        let login = r#"{"access_token": "a", "user": {"id": "1", "name": "N", "username": "n"}}"#;
        let session = r#"{"session_token": "s", "user": {"id": "1", "name": "N", "username": "n"}}"#;

        assert_eq!(serde_json::from_str::<AuthResponse>(login).unwrap().access_token, "a");
        assert_eq!(serde_json::from_str::<AuthResponse>(session).unwrap().access_token, "s");
    }
}
