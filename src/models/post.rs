//! Recommendation post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{data_uri_size, wire};

/// Whether the author recommends the thing or warns against it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    /// Worth it
    #[default]
    Recommend,
    /// Avoid it
    NotRecommend,
}

impl RecommendationType {
    /// Get the display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Recommend => "Recommend",
            Self::NotRecommend => "Not recommended",
        }
    }

    /// Get the emoji icon
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Recommend => "👍",
            Self::NotRecommend => "👎",
        }
    }

    /// The other option
    pub const fn toggle(&self) -> Self {
        match self {
            Self::Recommend => Self::NotRecommend,
            Self::NotRecommend => Self::Recommend,
        }
    }
}

/// What the reader is invited to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Something to buy
    #[default]
    Buy,
    /// Something to listen to
    Listen,
    /// Something to watch
    Watch,
    /// Something to read
    Read,
}

impl ActionType {
    /// Get all action types in picker order
    pub const fn all() -> &'static [Self] {
        &[Self::Buy, Self::Listen, Self::Watch, Self::Read]
    }

    /// Get the display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Listen => "Listen",
            Self::Watch => "Watch",
            Self::Read => "Read",
        }
    }

    /// Get the emoji icon
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Buy => "🛍",
            Self::Listen => "🎵",
            Self::Watch => "▶",
            Self::Read => "📖",
        }
    }

    /// Next action in picker order
    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|a| a == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Some(Self::Buy),
            "listen" => Some(Self::Listen),
            "watch" => Some(Self::Watch),
            "read" => Some(Self::Read),
            _ => None,
        }
    }
}

/// Kind of attached media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    #[default]
    Image,
    /// Video clip
    Video,
    /// Anything the client does not know about
    #[serde(other)]
    Unknown,
}

/// Denormalized author snapshot carried on posts and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Backend identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Handle without `@`
    pub username: String,
    /// Avatar data URI
    #[serde(default, deserialize_with = "wire::empty_as_none")]
    pub avatar: Option<String>,
}

/// Denormalized room snapshot carried on posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Backend identifier
    pub id: String,
    /// Room name
    pub name: String,
    /// Hex colour (`#RRGGBB`)
    pub color: String,
}

/// A recommendation post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Backend identifier
    pub id: String,
    /// Headline
    pub title: String,
    /// Body text
    pub description: String,
    /// Attached media as a data URI
    #[serde(default, deserialize_with = "wire::empty_as_none")]
    pub media: Option<String>,
    /// Kind of attached media
    #[serde(default)]
    pub media_type: Option<MediaKind>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Link to the recommended thing
    #[serde(default, deserialize_with = "wire::empty_as_none")]
    pub external_link: Option<String>,
    /// Recommend or warn against
    pub recommendation_type: RecommendationType,
    /// Buy / listen / watch / read
    pub action_type: ActionType,
    /// Number of likes
    #[serde(default)]
    pub like_count: u32,
    /// Number of comments
    #[serde(default)]
    pub comment_count: u32,
    /// Number of reposts
    #[serde(default)]
    pub repost_count: u32,
    /// When the post was created
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Author snapshot
    pub user: Author,
    /// Room snapshot
    pub room: RoomSummary,
    /// Whether the current user has liked this post (client-side only)
    #[serde(default, skip_serializing)]
    pub liked: bool,
}

/// Snapshot taken before an optimistic like toggle, used to roll it back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLike {
    /// Post the toggle applies to
    pub post_id: String,
    /// `liked` before the toggle
    pub liked_before: bool,
    /// `like_count` before the toggle
    pub count_before: u32,
}

/// Authoritative result of `POST /api/posts/{id}/like`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    /// Whether the post is now liked by the caller
    pub liked: bool,
    /// Server-side like count after the toggle
    pub like_count: u32,
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Backend identifier
    pub id: String,
    /// Comment text
    pub content: String,
    /// When the comment was written
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Author snapshot
    pub user: Author,
}

impl Post {
    /// Flip `liked` and adjust the count locally, before the server answers
    pub fn toggle_like(&mut self) -> PendingLike {
        let pending = PendingLike {
            post_id: self.id.clone(),
            liked_before: self.liked,
            count_before: self.like_count,
        };

        self.liked = !self.liked;
        self.like_count = if self.liked {
            self.like_count.saturating_add(1)
        } else {
            self.like_count.saturating_sub(1)
        };

        pending
    }

    /// Adopt the server's view of the like state
    pub fn confirm_like(&mut self, response: LikeResponse) {
        self.liked = response.liked;
        self.like_count = response.like_count;
    }

    /// Undo an optimistic toggle after the server rejected it
    pub fn rollback_like(&mut self, pending: &PendingLike) {
        self.liked = pending.liked_before;
        self.like_count = pending.count_before;
    }

    /// Likes + comments + reposts
    pub const fn engagement(&self) -> u32 {
        self.like_count
            .saturating_add(self.comment_count)
            .saturating_add(self.repost_count)
    }

    /// Tags rendered as `#tag #tag`
    pub fn hashtags(&self) -> String {
        self.tags
            .iter()
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get a short preview of the description (for list display)
    pub fn preview(&self, max_chars: usize) -> String {
        let content = self.description.replace('\n', " ");
        if content.chars().count() <= max_chars {
            content
        } else {
            let cut: String = content.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }

    /// Get relative time string (e.g., "5m", "2h", "3d")
    pub fn relative_time(&self) -> String {
        relative_time(self.created_at)
    }

    /// Indicator for attached media, with its size when it is inline
    pub fn media_label(&self) -> Option<String> {
        let media = self.media.as_deref()?;
        let kind = match self.media_type {
            Some(MediaKind::Video) => "🎬 Video",
            _ => "🖼️ Image",
        };
        Some(match data_uri_size(media) {
            Some(bytes) => format!("{kind} attached ({} KB)", bytes.div_ceil(1024)),
            None => format!("{kind} attached"),
        })
    }
}

impl Comment {
    /// Get relative time string
    pub fn relative_time(&self) -> String {
        relative_time(self.created_at)
    }
}

fn relative_time(created_at: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(created_at);

    if duration.num_minutes() < 60 {
        format!("{}m", duration.num_minutes().max(0))
    } else if duration.num_hours() < 24 {
        format!("{}h", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d", duration.num_days())
    } else {
        created_at.format("%b %d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(like_count: u32) -> Post {
        Post {
            id: "p1".to_string(),
            title: "Amazing Italian Restaurant".to_string(),
            description: "The pasta is incredible".to_string(),
            media: None,
            media_type: None,
            tags: vec!["italian".to_string(), "pasta".to_string()],
            external_link: None,
            recommendation_type: RecommendationType::Recommend,
            action_type: ActionType::Buy,
            like_count,
            comment_count: 8,
            repost_count: 3,
            created_at: Utc::now(),
            user: Author {
                id: "u1".to_string(),
                name: "Sarah Johnson".to_string(),
                username: "sarahj".to_string(),
                avatar: None,
            },
            room: RoomSummary {
                id: "r1".to_string(),
                name: "Food".to_string(),
                color: "#FF6B6B".to_string(),
            },
            liked: false,
        }
    }

    #[test]
    fn test_double_toggle_restores_original() {
        let mut post = sample_post(10);
        let mut counts = vec![post.like_count];

        post.toggle_like();
        counts.push(post.like_count);
        assert!(post.liked);

        post.toggle_like();
        counts.push(post.like_count);
        assert!(!post.liked);

        assert_eq!(counts, vec![10, 11, 10]);
    }

    #[test]
    fn test_confirm_adopts_server_count() {
        let mut post = sample_post(10);
        post.toggle_like();
        post.confirm_like(LikeResponse {
            liked: true,
            like_count: 15,
        });
        assert!(post.liked);
        assert_eq!(post.like_count, 15);
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut post = sample_post(0);
        post.liked = true;

        let pending = post.toggle_like();
        assert_eq!(post.like_count, 0);
        assert!(!post.liked);

        post.rollback_like(&pending);
        assert!(post.liked);
        assert_eq!(post.like_count, 0);
        assert_eq!(pending.post_id, "p1");
    }

    #[test]
    fn test_decode_backend_post() {
        let json = r##"{
            "id": "65b2",
            "title": "Avoid This Overpriced Coffee Shop",
            "description": "$8 for a basic latte",
            "media": "",
            "media_type": "image",
            "tags": ["coffee"],
            "external_link": "",
            "recommendation_type": "not_recommend",
            "action_type": "buy",
            "like_count": 67,
            "comment_count": 34,
            "repost_count": 5,
            "created_at": "2024-01-12T14:10:00",
            "user": {"id": "1", "name": "Sarah", "username": "sarahj", "avatar": ""},
            "room": {"id": "1", "name": "Food", "color": "#FF6B6B"}
        }"##;

        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.recommendation_type, RecommendationType::NotRecommend);
        assert_eq!(post.media, None);
        assert_eq!(post.media_type, Some(MediaKind::Image));
        assert!(!post.liked);
        assert_eq!(post.engagement(), 106);
        assert_eq!(post.hashtags(), "#coffee");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let mut post = sample_post(0);
        post.description = "Café crème brûlée\nis great".to_string();
        assert_eq!(post.preview(100), "Café crème brûlée is great");
        assert_eq!(post.preview(8), "Café ...");
    }

    #[test]
    fn test_media_label() {
        let mut post = sample_post(0);
        assert_eq!(post.media_label(), None);

        post.media = Some("data:image/png;base64,AAAAAA==".to_string());
        assert_eq!(post.media_label().as_deref(), Some("🖼️ Image attached (1 KB)"));

        post.media = Some("https://cdn.example.com/clip.mp4".to_string());
        post.media_type = Some(MediaKind::Video);
        assert_eq!(post.media_label().as_deref(), Some("🎬 Video attached"));
    }

    #[test]
    fn test_action_cycle() {
        assert_eq!(ActionType::Read.next(), ActionType::Buy);
        assert_eq!(ActionType::from_str("Watch"), Some(ActionType::Watch));
        assert_eq!(ActionType::from_str("eat"), None);
    }
}
