//! Per-screen fetch state
//!
//! Every list screen goes through the same cycle:
//!
//! ```text
//! Idle ──begin_load──▶ Loading ──finish──▶ Loaded | Failed
//!                         ▲                        │
//!                         └───────── retry ────────┘
//! ```
//!
//! Each load is tagged with a generation number. A response carrying an
//! older generation than the latest `begin_load` is dropped, so a slow
//! refresh can never overwrite a newer one.

use std::collections::HashSet;

use crate::error::ApiResult;
use crate::models::{LikeResponse, PendingLike, Post};

/// Where a screen is in its fetch cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet (or signed out)
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last request succeeded
    Loaded,
    /// The last request failed; retry is offered
    Failed(String),
}

/// A fetched list plus its cursor and fetch state
#[derive(Debug, Clone)]
pub struct ListScreen<T> {
    items: Vec<T>,
    state: LoadState,
    generation: u64,
    selected: usize,
    /// Item ids with an unconfirmed mutation in flight
    pending: HashSet<String>,
}

impl<T> Default for ListScreen<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            generation: 0,
            selected: 0,
            pending: HashSet::new(),
        }
    }
}

impl<T> ListScreen<T> {
    /// Create an idle, empty screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current fetch state
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Generation of the latest load
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a load is in flight
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Whether a successful load returned nothing
    pub fn is_empty_result(&self) -> bool {
        self.state == LoadState::Loaded && self.items.is_empty()
    }

    /// Start a load and return its generation
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.generation
    }

    /// Apply a load result.
    ///
    /// Returns `false` (and changes nothing) when `generation` is stale.
    /// A failure keeps the previous items so the screen can still show them
    /// under the error.
    pub fn finish(&mut self, generation: u64, result: ApiResult<Vec<T>>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale response (generation {generation}, current {})",
                self.generation
            );
            return false;
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Loaded;
                self.clamp_selection();
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Replace the items without a fetch (demo mode, locally created items)
    pub fn load_demo(&mut self, items: Vec<T>) {
        self.generation += 1;
        self.items = items;
        self.state = LoadState::Loaded;
        self.clamp_selection();
    }

    /// Insert an item at the top (after a successful create)
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
        self.selected = 0;
    }

    /// Forget everything; in-flight responses become stale
    pub fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.state = LoadState::Idle;
        self.selected = 0;
        self.pending.clear();
    }

    /// Index of the highlighted item
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    /// The highlighted item
    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    /// Move the cursor down
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    /// Move the cursor up
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Jump to the first item
    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    /// Jump to the last item
    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }
}

/// A post ranked on the trending screen
#[derive(Debug, Clone, Copy)]
pub struct TrendingPost<'a> {
    /// 1-based rank
    pub rank: usize,
    /// The post
    pub post: &'a Post,
    /// Why it ranks
    pub reason: &'static str,
}

impl ListScreen<Post> {
    /// Whether a like toggle for `post_id` awaits the server
    pub fn like_in_flight(&self, post_id: &str) -> bool {
        self.pending.contains(post_id)
    }

    /// Optimistically toggle the like on `post_id`.
    ///
    /// Returns `None` if the post is unknown or a toggle for it is already
    /// in flight.
    pub fn toggle_like(&mut self, post_id: &str) -> Option<PendingLike> {
        if self.pending.contains(post_id) {
            tracing::debug!("Like for {post_id} already in flight");
            return None;
        }
        let post = self.items.iter_mut().find(|p| p.id == post_id)?;
        let pending = post.toggle_like();
        self.pending.insert(post_id.to_string());
        Some(pending)
    }

    /// Settle a toggle with the server's answer
    pub fn confirm_like(&mut self, pending: &PendingLike, response: LikeResponse) {
        self.pending.remove(&pending.post_id);
        if let Some(post) = self.find_mut(&pending.post_id) {
            post.confirm_like(response);
        }
    }

    /// Undo a toggle the server rejected
    pub fn rollback_like(&mut self, pending: &PendingLike) {
        self.pending.remove(&pending.post_id);
        if let Some(post) = self.find_mut(&pending.post_id) {
            post.rollback_like(pending);
        }
    }

    /// Posts ordered by engagement, highest first, with a reason label
    pub fn trending(&self, limit: usize) -> Vec<TrendingPost<'_>> {
        let mut ranked: Vec<&Post> = self.items.iter().collect();
        ranked.sort_by(|a, b| {
            b.engagement()
                .cmp(&a.engagement())
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let max_likes = ranked.iter().map(|p| p.like_count).max().unwrap_or(0);
        let max_reposts = ranked.iter().map(|p| p.repost_count).max().unwrap_or(0);

        ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, post)| TrendingPost {
                rank: i + 1,
                post,
                reason: trending_reason(post, max_likes, max_reposts),
            })
            .collect()
    }

    fn find_mut(&mut self, post_id: &str) -> Option<&mut Post> {
        self.items.iter_mut().find(|p| p.id == post_id)
    }
}

fn trending_reason(post: &Post, max_likes: u32, max_reposts: u32) -> &'static str {
    if post.like_count > 0 && post.like_count == max_likes {
        "Most liked this week"
    } else if post.repost_count > 0 && post.repost_count == max_reposts {
        "Most shared"
    } else {
        "Fastest growing engagement"
    }
}
