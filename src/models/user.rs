//! Authenticated user identity

use serde::{Deserialize, Serialize};

use super::wire;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique handle (without the leading `@`)
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Avatar, usually a data URI
    #[serde(default, deserialize_with = "wire::empty_as_none")]
    pub avatar: Option<String>,
    /// Short biography
    #[serde(default, deserialize_with = "wire::empty_as_none")]
    pub bio: Option<String>,
    /// Personal link
    #[serde(default, deserialize_with = "wire::empty_as_none")]
    pub external_link: Option<String>,
    /// Number of followers
    #[serde(default)]
    pub follower_count: u32,
    /// Number of accounts followed
    #[serde(default)]
    pub following_count: u32,
}

impl User {
    /// Handle with a leading `@`
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_me_response() {
        let json = r#"{
            "id": "65a1",
            "email": "sarah@example.com",
            "name": "Sarah Johnson",
            "username": "sarahj",
            "avatar": "",
            "bio": "Food lover",
            "external_link": "",
            "follower_count": 1234,
            "following_count": 456
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.handle(), "@sarahj");
        assert_eq!(user.avatar, None);
        assert_eq!(user.external_link, None);
        assert_eq!(user.bio.as_deref(), Some("Food lover"));
        assert_eq!(user.follower_count, 1234);
    }
}
