//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use async_ops::{AsyncCommand, AsyncResult};
pub use state::{AppState, FocusedPanel, Mode, View};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::api::HttpClient;
use crate::config::Config;
use crate::demo;
use crate::error::ApiError;
use crate::storage::{MemoryStore, SharedStore};

use async_ops::{AsyncHandle, spawn_worker};

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

fn init_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application against the live backend
pub fn run(rt: &Runtime, config: Config, store: SharedStore, client: HttpClient) -> Result<()> {
    let mut terminal = init_terminal()?;
    let mut state = AppState::new(config, store, false);

    // Show the loading state while the stored session is checked
    terminal.draw(|frame| ui::render(frame, &state))?;
    rt.block_on(state.auth.restore(&client));

    // Spawn async worker
    let async_handle = rt.block_on(async { spawn_worker(client) });

    if let Some(user) = state.user() {
        let greeting = format!("Signed in as {}", user.handle());
        state.set_status(greeting);
        let initial: Vec<AsyncCommand> = state
            .refresh_feed()
            .into_iter()
            .chain(state.refresh_rooms())
            .collect();
        for cmd in initial {
            dispatch(&async_handle, cmd);
        }
    } else {
        state.open_login();
    }

    let result = run_app(&mut terminal, &mut state, async_handle);

    restore_terminal(&mut terminal)?;
    result
}

fn dispatch(handle: &AsyncHandle, cmd: AsyncCommand) {
    if let Err(e) = handle.cmd_tx.blocking_send(cmd) {
        tracing::error!("Async worker is gone: {e}");
    }
}

fn run_app(terminal: &mut Term, state: &mut AppState, mut async_handle: AsyncHandle) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            for cmd in handle_async_result(state, result) {
                dispatch(&async_handle, cmd);
            }
        }

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            dispatch(&async_handle, cmd);
        }

        // Tick for animations
        state.tick();

        if state.should_quit {
            // Shutdown async worker
            dispatch(&async_handle, AsyncCommand::Shutdown);
            break;
        }
    }

    Ok(())
}

/// Apply a worker result to the state, returning follow-up commands
pub fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Vec<AsyncCommand> {
    match result {
        AsyncResult::LoggedIn(result) => {
            state.submitting = false;
            state.login_form.password.clear();
            match result {
                Ok(response) => {
                    let name = response.user.name.clone();
                    if let Err(e) = state.auth.begin_session(&response.access_token, response.user)
                    {
                        state.set_status(format!("❌ Could not save session: {e}"));
                        return Vec::new();
                    }
                    state.mode = Mode::Normal;
                    state.set_status(format!("👋 Welcome, {name}!"));
                    state
                        .refresh_feed()
                        .into_iter()
                        .chain(state.refresh_rooms())
                        .collect()
                }
                Err(ApiError::Unauthorized) => {
                    state.set_status("❌ Invalid email or password");
                    Vec::new()
                }
                Err(e) => {
                    state.set_status(format!("❌ {e}"));
                    Vec::new()
                }
            }
        }
        AsyncResult::Posts { generation, result } => {
            let result = state.check_session(result);
            if !state.auth.is_authenticated() {
                return Vec::new();
            }
            let message = match &result {
                Ok(posts) => format!("Loaded {} posts", posts.len()),
                Err(e) => format!("❌ {e}"),
            };
            if !state.feed.finish(generation, result) {
                return Vec::new();
            }
            state.set_status(message);
            state.comments_for = None;
            state.load_comments().into_iter().collect()
        }
        AsyncResult::Rooms { generation, result } => {
            let result = state.check_session(result);
            if !state.auth.is_authenticated() {
                return Vec::new();
            }
            let message = result.as_ref().err().map(|e| format!("❌ {e}"));
            if state.rooms.finish(generation, result)
                && let Some(message) = message
            {
                state.set_status(message);
            }
            Vec::new()
        }
        AsyncResult::Comments {
            post_id,
            generation,
            result,
        } => {
            if state.comments_for.as_deref() == Some(post_id.as_str()) {
                state.comments.finish(generation, result);
            }
            Vec::new()
        }
        AsyncResult::Liked { pending, result } => {
            let result = state.check_session(result);
            if !state.auth.is_authenticated() {
                return Vec::new();
            }
            match result {
                Ok(response) => state.feed.confirm_like(&pending, response),
                Err(e) => {
                    state.feed.rollback_like(&pending);
                    state.set_status(format!("❌ Like failed: {e}"));
                }
            }
            Vec::new()
        }
        AsyncResult::PostCreated(result) => {
            state.submitting = false;
            let result = state.check_session(result);
            if !state.auth.is_authenticated() {
                return Vec::new();
            }
            match result {
                Ok(post) => {
                    state.feed.prepend(post);
                    state.mode = Mode::Normal;
                    state.set_status("✅ Recommendation posted");
                    state.refresh_rooms().into_iter().collect()
                }
                Err(e) => {
                    state.set_status(format!("❌ {e}"));
                    Vec::new()
                }
            }
        }
        AsyncResult::RoomCreated(result) => {
            state.submitting = false;
            let result = state.check_session(result);
            if !state.auth.is_authenticated() {
                return Vec::new();
            }
            match result {
                Ok(room) => {
                    let name = room.name.clone();
                    state.rooms.prepend(room);
                    state.mode = Mode::Normal;
                    state.set_status(format!("✅ Room \"{name}\" created"));
                }
                Err(e) => state.set_status(format!("❌ {e}")),
            }
            Vec::new()
        }
        AsyncResult::LoggedOut => {
            tracing::debug!("Server logout finished");
            Vec::new()
        }
    }
}

/// Run the TUI on bundled fixtures, with no backend and nothing persisted
pub fn run_demo(config: Config) -> Result<()> {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let mut state = AppState::new(config, store, true);
    state.auth.begin_session("demo", demo::current_user())?;
    state.refresh_feed();
    state.refresh_rooms();
    state.load_comments();
    state.set_status(format!(
        "Demo mode | {} posts | Press ? for help | q to quit",
        state.feed.items().len()
    ));

    let mut terminal = init_terminal()?;

    // Main loop (no worker: demo actions settle locally)
    loop {
        terminal.draw(|frame| ui::render(frame, &state))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(&mut state, key)
        {
            tracing::debug!("Demo mode ignores {cmd:?}");
        }

        state.tick();

        if state.should_quit {
            break;
        }
    }

    restore_terminal(&mut terminal)
}

#[cfg(test)]
mod tests {
    use super::state::tests::signed_in_state;
    use super::*;
    use crate::auth::tests::sample_user;
    use crate::models::{AuthResponse, LikeResponse, PendingLike};
    use crate::screen::LoadState;
    use reqwest::StatusCode;

    fn feed_loaded() -> AppState {
        let mut state = signed_in_state();
        let Some(AsyncCommand::FetchPosts { generation, .. }) = state.refresh_feed() else {
            panic!("expected a feed fetch");
        };
        handle_async_result(
            &mut state,
            AsyncResult::Posts {
                generation,
                result: Ok(demo::posts()),
            },
        );
        state
    }

    #[test]
    fn test_login_success_starts_session_and_loads_screens() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut state = AppState::new(Config::default(), store, false);
        state.open_login();
        state.submitting = true;

        let commands = handle_async_result(
            &mut state,
            AsyncResult::LoggedIn(Ok(AuthResponse {
                access_token: "fresh".to_string(),
                user: sample_user(),
            })),
        );

        assert_eq!(state.mode, Mode::Normal);
        assert!(!state.submitting);
        assert_eq!(state.auth.token().as_deref(), Some("fresh"));
        assert!(matches!(commands[0], AsyncCommand::FetchPosts { .. }));
        assert!(matches!(commands[1], AsyncCommand::FetchRooms { .. }));
    }

    #[test]
    fn test_login_rejected_keeps_form_open() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut state = AppState::new(Config::default(), store, false);
        state.open_login();
        state.login_form.password = "wrong".to_string();

        let commands =
            handle_async_result(&mut state, AsyncResult::LoggedIn(Err(ApiError::Unauthorized)));
        assert!(commands.is_empty());
        assert_eq!(state.mode, Mode::Login);
        assert!(state.login_form.password.is_empty());
        assert_eq!(state.status, "❌ Invalid email or password");
    }

    #[test]
    fn test_feed_load_requests_comments_for_selection() {
        let mut state = signed_in_state();
        let Some(AsyncCommand::FetchPosts { generation, .. }) = state.refresh_feed() else {
            panic!("expected a feed fetch");
        };

        let commands = handle_async_result(
            &mut state,
            AsyncResult::Posts {
                generation,
                result: Ok(demo::posts()),
            },
        );
        assert_eq!(state.feed.state(), &LoadState::Loaded);
        assert_eq!(state.status, "Loaded 5 posts");
        assert!(matches!(
            &commands[..],
            [AsyncCommand::FetchComments { post_id, .. }] if post_id == "1"
        ));
    }

    #[test]
    fn test_stale_feed_response_is_ignored() {
        let mut state = feed_loaded();
        let stale = state.feed.generation();
        state.refresh_feed();

        let commands = handle_async_result(
            &mut state,
            AsyncResult::Posts {
                generation: stale,
                result: Ok(Vec::new()),
            },
        );
        assert!(commands.is_empty());
        assert_eq!(state.feed.items().len(), 5);
        assert!(state.feed.is_loading());
    }

    #[test]
    fn test_unauthorized_fetch_signs_out() {
        let mut state = feed_loaded();
        let generation = state.feed.begin_load();

        handle_async_result(
            &mut state,
            AsyncResult::Posts {
                generation,
                result: Err(ApiError::Unauthorized),
            },
        );
        assert!(state.user().is_none());
        assert_eq!(state.auth.token(), None);
        assert_eq!(state.mode, Mode::Login);
        assert_eq!(state.status, "Session expired. Please sign in again.");
        assert!(state.feed.items().is_empty());
    }

    #[test]
    fn test_failed_feed_shows_error_state() {
        let mut state = signed_in_state();
        let generation = state.feed.begin_load();

        handle_async_result(
            &mut state,
            AsyncResult::Posts {
                generation,
                result: Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "boom".to_string(),
                }),
            },
        );
        assert!(matches!(state.feed.state(), LoadState::Failed(_)));
        assert!(state.feed.items().is_empty());
        assert!(state.user().is_some());
    }

    #[test]
    fn test_like_confirmed_with_server_count() {
        let mut state = feed_loaded();
        let Some(AsyncCommand::Like { pending, .. }) = state.toggle_like_selected() else {
            panic!("expected a like command");
        };
        assert_eq!(state.feed.items()[0].like_count, 43);

        handle_async_result(
            &mut state,
            AsyncResult::Liked {
                pending,
                result: Ok(LikeResponse {
                    liked: true,
                    like_count: 50,
                }),
            },
        );
        assert_eq!(state.feed.items()[0].like_count, 50);
        assert!(!state.feed.like_in_flight("1"));
    }

    #[test]
    fn test_like_failure_rolls_back() {
        let mut state = feed_loaded();
        let pending: PendingLike = match state.toggle_like_selected() {
            Some(AsyncCommand::Like { pending, .. }) => pending,
            other => panic!("unexpected: {other:?}"),
        };

        handle_async_result(
            &mut state,
            AsyncResult::Liked {
                pending,
                result: Err(ApiError::Status {
                    status: StatusCode::NOT_FOUND,
                    detail: "Post not found".to_string(),
                }),
            },
        );
        assert_eq!(state.feed.items()[0].like_count, 42);
        assert!(!state.feed.items()[0].liked);
        assert!(state.status.starts_with("❌ Like failed"));
    }

    #[test]
    fn test_created_post_lands_on_top() {
        let mut state = feed_loaded();
        state.mode = Mode::ComposePost;
        state.submitting = true;

        let mut post = demo::posts().remove(4);
        post.id = "new".to_string();
        let commands = handle_async_result(&mut state, AsyncResult::PostCreated(Ok(post)));

        assert_eq!(state.feed.items()[0].id, "new");
        assert_eq!(state.mode, Mode::Normal);
        assert!(matches!(commands[..], [AsyncCommand::FetchRooms { .. }]));
    }

    #[test]
    fn test_comments_for_other_post_are_dropped() {
        let mut state = feed_loaded();
        state.comments_for = Some("2".to_string());
        let generation = state.comments.begin_load();

        handle_async_result(
            &mut state,
            AsyncResult::Comments {
                post_id: "1".to_string(),
                generation,
                result: Ok(demo::comments("1")),
            },
        );
        assert!(state.comments.items().is_empty());
        assert!(state.auth.token().is_some());
    }
}
