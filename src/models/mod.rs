//! Data models for irecommend

mod post;
mod requests;
mod room;
mod user;

pub use post::{
    ActionType, Author, Comment, LikeResponse, MediaKind, PendingLike, Post, RecommendationType,
    RoomSummary,
};
pub use requests::{
    AuthResponse, LoginRequest, MAX_DESCRIPTION_CHARS, MAX_ROOM_NAME_CHARS, MAX_TITLE_CHARS,
    NewPost, NewRoom, ROOM_COLORS, data_uri_size, parse_tags,
};
pub use room::{Room, parse_hex_color};
pub use user::User;

/// Serde helpers for the backend's wire quirks
pub(crate) mod wire {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    /// Parse an ISO timestamp with or without an offset (no offset means UTC)
    pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
        }
    }

    /// The backend sends `""` for unset optional strings
    pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[test]
        fn test_offset_and_naive_timestamps() {
            let with_offset = parse_timestamp("2024-01-15T10:30:00+00:00").unwrap();
            let zulu = parse_timestamp("2024-01-15T10:30:00Z").unwrap();
            let naive = parse_timestamp("2024-01-15T10:30:00.123456").unwrap();

            assert_eq!(with_offset, zulu);
            assert_eq!(naive.day(), 15);
            assert_eq!(naive.hour(), 10);
            assert!(parse_timestamp("yesterday").is_none());
        }
    }
}
