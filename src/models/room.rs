//! Room (category) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;

/// A user-defined category grouping recommendation posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Backend identifier
    pub id: String,
    /// Room name
    pub name: String,
    /// Hex colour (`#RRGGBB`)
    pub color: String,
    /// Number of posts in the room
    #[serde(default)]
    pub post_count: u32,
    /// When the room was created
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Room {
    /// Parse the room colour into RGB components
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }
}

/// Parse `#RRGGBB` into RGB components
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_my_rooms_entry() {
        let json = r##"{"id": "r1", "name": "Food", "color": "#FF6B6B", "post_count": 3, "created_at": "2024-01-10T10:00:00"}"##;
        let room: Room = serde_json::from_str(json).unwrap();
        assert_eq!(room.post_count, 3);
        assert!(room.created_at.is_some());
        assert_eq!(room.rgb(), Some((0xFF, 0x6B, 0x6B)));
    }

    #[test]
    fn test_room_without_created_at() {
        let json = r##"{"id": "r1", "name": "Tech", "color": "#4ECDC4"}"##;
        let room: Room = serde_json::from_str(json).unwrap();
        assert_eq!(room.created_at, None);
        assert_eq!(room.post_count, 0);
    }

    #[test]
    fn test_bad_colors() {
        assert_eq!(parse_hex_color("FF6B6B"), None);
        assert_eq!(parse_hex_color("#FF6B"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(parse_hex_color(" #007aff "), Some((0, 0x7A, 0xFF)));
    }
}
