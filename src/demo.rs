//! Bundled fixtures for demo mode
//!
//! Only shown when the user asks for demo mode explicitly; live screens
//! never fall back to these.

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    ActionType, Author, Comment, MediaKind, NewPost, NewRoom, Post, RecommendationType, Room,
    RoomSummary, User,
};

fn ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

fn author(id: &str, name: &str, username: &str) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        username: username.to_string(),
        avatar: None,
    }
}

fn sarah() -> Author {
    author("1", "Sarah Johnson", "sarahj")
}

fn alex() -> Author {
    author("2", "Alex Chen", "alexc")
}

fn maria() -> Author {
    author("3", "Maria Garcia", "mariag")
}

fn summary(room: &Room) -> RoomSummary {
    RoomSummary {
        id: room.id.clone(),
        name: room.name.clone(),
        color: room.color.clone(),
    }
}

fn room(id: &str, name: &str, color: &str, post_count: u32, hours_ago: Option<i64>) -> Room {
    Room {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        post_count,
        created_at: hours_ago.map(ago),
    }
}

/// The demo identity
pub fn current_user() -> User {
    User {
        id: "current".to_string(),
        name: "Demo User".to_string(),
        username: "demouser".to_string(),
        email: "demo@example.com".to_string(),
        avatar: None,
        bio: Some("New to i-Recommend! Excited to share my discoveries 🌟".to_string()),
        external_link: None,
        follower_count: 12,
        following_count: 25,
    }
}

/// Every public demo room
pub fn rooms() -> Vec<Room> {
    vec![
        room("1", "Food", "#FF6B6B", 15, None),
        room("2", "Tech", "#4ECDC4", 8, None),
        room("3", "Books", "#45B7D1", 12, None),
        room("4", "Travel", "#96CEB4", 6, None),
        room("5", "Movies", "#FFEAA7", 9, None),
    ]
}

/// Rooms owned by the demo identity
pub fn user_rooms() -> Vec<Room> {
    vec![
        room("1", "Food", "#FF6B6B", 3, Some(24 * 9)),
        room("2", "Tech", "#4ECDC4", 1, Some(24 * 10)),
        room("5", "Movies", "#FFEAA7", 0, Some(24 * 11)),
    ]
}

/// The demo feed, newest first
pub fn posts() -> Vec<Post> {
    let rooms = rooms();
    let post = |id: &str,
                title: &str,
                description: &str,
                tags: &[&str],
                link: Option<&str>,
                recommendation_type: RecommendationType,
                action_type: ActionType,
                counts: (u32, u32, u32),
                hours_ago: i64,
                user: Author,
                room: &Room| Post {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        media: None,
        media_type: Some(MediaKind::Image),
        tags: tags.iter().map(ToString::to_string).collect(),
        external_link: link.map(ToString::to_string),
        recommendation_type,
        action_type,
        like_count: counts.0,
        comment_count: counts.1,
        repost_count: counts.2,
        created_at: ago(hours_ago),
        user,
        room: summary(room),
        liked: false,
    };

    vec![
        post(
            "1",
            "Amazing Italian Restaurant in Downtown",
            "Just discovered this hidden gem! The pasta is incredible and the atmosphere is \
             perfect for a date night. Service was top-notch too.",
            &["italian", "pasta", "romantic"],
            Some("https://example.com/restaurant"),
            RecommendationType::Recommend,
            ActionType::Buy,
            (42, 8, 3),
            2,
            sarah(),
            &rooms[0],
        ),
        post(
            "2",
            "MacBook Pro M3 - Worth the Upgrade?",
            "After using the new MacBook Pro M3 for a month, I can say it's definitely worth \
             it for content creators. The performance boost is incredible.",
            &["apple", "laptop", "review"],
            None,
            RecommendationType::Recommend,
            ActionType::Buy,
            (156, 23, 12),
            21,
            alex(),
            &rooms[1],
        ),
        post(
            "3",
            "The Seven Husbands of Evelyn Hugo",
            "What an emotional rollercoaster! This book had me crying and laughing. Taylor \
             Jenkins Reid is a master storyteller. Couldn't put it down.",
            &["fiction", "emotional", "bestseller"],
            None,
            RecommendationType::Recommend,
            ActionType::Read,
            (89, 15, 7),
            48,
            maria(),
            &rooms[2],
        ),
        post(
            "4",
            "Avoid This Overpriced Coffee Shop",
            "Went to this trendy coffee place downtown. $8 for a basic latte that tasted \
             burnt. Service was slow and staff seemed uninterested. Save your money.",
            &["coffee", "overpriced", "disappointing"],
            None,
            RecommendationType::NotRecommend,
            ActionType::Buy,
            (67, 34, 5),
            68,
            sarah(),
            &rooms[0],
        ),
        post(
            "5",
            "Bali Travel Guide - Must Visit Places",
            "Just returned from 2 weeks in Bali. Here are the places you absolutely cannot \
             miss! From hidden beaches to amazing temples.",
            &["bali", "travel", "beaches", "temples"],
            Some("https://example.com/bali-guide"),
            RecommendationType::Recommend,
            ActionType::Watch,
            (234, 45, 18),
            98,
            alex(),
            &rooms[3],
        ),
    ]
}

/// Comments on a demo post, oldest first
pub fn comments(post_id: &str) -> Vec<Comment> {
    if post_id != "1" {
        return Vec::new();
    }
    vec![
        Comment {
            id: "1".to_string(),
            content: "I went there last week! The tiramisu is to die for 😍".to_string(),
            created_at: ago(1),
            user: alex(),
        },
        Comment {
            id: "2".to_string(),
            content: "Thanks for the recommendation! Making a reservation now.".to_string(),
            created_at: ago(0),
            user: maria(),
        },
    ]
}

/// Materialize a submitted post locally (demo mode has no backend)
pub fn local_post(new: &NewPost, user: &User, room: &Room) -> Post {
    Post {
        id: format!("local-{}", Utc::now().timestamp_millis()),
        title: new.title.clone(),
        description: new.description.clone(),
        media: (!new.media.is_empty()).then(|| new.media.clone()),
        media_type: (!new.media.is_empty()).then_some(new.media_type),
        tags: new.tags.clone(),
        external_link: (!new.external_link.is_empty()).then(|| new.external_link.clone()),
        recommendation_type: new.recommendation_type,
        action_type: new.action_type,
        like_count: 0,
        comment_count: 0,
        repost_count: 0,
        created_at: Utc::now(),
        user: Author {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        },
        room: summary(room),
        liked: false,
    }
}

/// Materialize a submitted room locally
pub fn local_room(new: &NewRoom) -> Room {
    Room {
        id: format!("local-{}", Utc::now().timestamp_millis()),
        name: new.name.clone(),
        color: new.color.clone(),
        post_count: 0,
        created_at: Some(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_consistent() {
        let posts = posts();
        assert_eq!(posts.len(), 5);
        assert!(posts.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(posts.iter().all(|p| !p.liked));
        assert_eq!(posts[3].recommendation_type, RecommendationType::NotRecommend);

        let room_ids: Vec<String> = rooms().into_iter().map(|r| r.id).collect();
        assert!(posts.iter().all(|p| room_ids.contains(&p.room.id)));
    }

    #[test]
    fn test_comments_only_on_first_post() {
        assert_eq!(comments("1").len(), 2);
        assert!(comments("2").is_empty());
        assert_eq!(current_user().handle(), "@demouser");
    }

    #[test]
    fn test_local_post_uses_identity_and_room() {
        let rooms = user_rooms();
        let mut new = NewPost::new("1", "Ramen", "Rich broth");
        new.tags = vec!["ramen".to_string()];

        let post = local_post(&new, &current_user(), &rooms[0]);
        assert_eq!(post.user.username, "demouser");
        assert_eq!(post.room.name, "Food");
        assert_eq!(post.external_link, None);
        assert_eq!(post.media_type, None);
        assert_eq!(post.like_count, 0);
    }
}
