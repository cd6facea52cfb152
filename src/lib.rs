//! # irecommend ⭐
//!
//! A terminal client for the i-Recommend social recommendation service.
//!
//! ## Overview
//!
//! People share what they recommend (or warn against) inside themed rooms.
//! irecommend lets you browse the feed, like posts, read comments, manage
//! your rooms and publish recommendations from a TUI or from scripts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Sync event loop; network work runs on an async worker      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Screen      │ │       API       │ │       UI        │
//! │                 │ │                 │ │                 │
//! │ • Load state    │ │ • RecommendApi  │ │ • Render tabs   │
//! │ • Stale guard   │ │ • reqwest impl  │ │ • Handle input  │
//! │ • Optimistic ♥  │ │ • 401 mapping   │ │ • Forms         │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │    Storage      │ │  Auth / Theme   │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • Encrypted KV  │ │ • Session token │ │ • Post, Room    │
//! │ • In-memory KV  │ │ • Dark / light  │ │ • User, Comment │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Backend client trait and its HTTP implementation
//! - [`app`] - TUI application state and event loop
//! - [`auth`] - Session state backed by the key-value store
//! - [`config`] - Configuration management
//! - [`demo`] - Fixtures for demo mode
//! - [`error`] - API error type
//! - [`models`] - Data models and request validation
//! - [`screen`] - List screen fetch state
//! - [`storage`] - Encrypted and in-memory key-value stores
//! - [`theme`] - Dark and light palettes
//!
//! ## Example
//!
//! ```no_run
//! use irecommend::{Config, app};
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run_demo(Config::default())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/irecommend/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod demo;
pub mod error;
pub mod models;
pub mod paths;
pub mod screen;
pub mod storage;
pub mod theme;

// Re-export main types for convenience
pub use app::AppState;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use models::{Comment, Post, Room, User};
pub use screen::{ListScreen, LoadState};
pub use storage::{KeyValueStore, SharedStore};
pub use theme::{Palette, ThemeState};

/// ASCII logo for the application
pub const LOGO: &str = r"
  _       ____                                               _
 (_)     |  _ \ ___  ___ ___  _ __ ___  _ __ ___   ___ _ __   __| |
 | |_____| |_) / _ \/ __/ _ \| '_ ` _ \| '_ ` _ \ / _ \ '_ \ / _` |
 | |_____|  _ <  __/ (_| (_) | | | | | | | | | | |  __/ | | | (_| |
 |_|     |_| \_\___|\___\___/|_| |_| |_|_| |_| |_|\___|_| |_|\__,_|
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
