//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{
    AppState, ComposeField, FocusedPanel, LoginField, Mode, RoomField, TRENDING_LIMIT, View,
};
use crate::demo;
use crate::models::{LoginRequest, MAX_ROOM_NAME_CHARS, ROOM_COLORS};

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return None;
    }

    // Handle mode-specific input first
    match state.mode {
        Mode::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::Enter
            ) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::Login => return handle_login_key(state, key),
        Mode::ComposePost => return handle_compose_key(state, key),
        Mode::CreateRoom => return handle_room_key(state, key),
        Mode::ConfirmLogout => return handle_confirm_logout_key(state, key),
        Mode::Normal => {}
    }

    // Global shortcuts (work in normal mode)
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            return None;
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            return None;
        }
        (_, KeyCode::Tab) => return state.next_view(),
        (_, KeyCode::BackTab) => return state.prev_view(),
        (_, KeyCode::Char('1')) => return state.switch_view(View::Feed),
        (_, KeyCode::Char('2')) => return state.switch_view(View::Rooms),
        (_, KeyCode::Char('3')) => return state.switch_view(View::Trending),
        (_, KeyCode::Char('4')) => return state.switch_view(View::Profile),
        (_, KeyCode::Char('t')) => {
            state.theme.toggle_theme();
            let mode = state.theme.mode_name();
            state.set_status(format!("✓ {mode} mode"));
            return None;
        }
        (_, KeyCode::Char('r')) => {
            if state.user().is_none() {
                state.open_login();
                return None;
            }
            state.set_status("Refreshing...");
            return state.refresh_current_view();
        }
        (_, KeyCode::Char('i')) if state.user().is_none() => {
            state.open_login();
            return None;
        }
        _ => {}
    }

    // View-specific handling
    match state.view {
        View::Feed => handle_feed_key(state, key),
        View::Rooms => handle_rooms_key(state, key),
        View::Trending => handle_trending_key(state, key),
        View::Profile => handle_profile_key(state, key),
    }
}

fn handle_feed_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        // Panel navigation
        (_, KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter) => {
            state.focused_panel = FocusedPanel::Detail;
            None
        }
        (_, KeyCode::Left | KeyCode::Char('h') | KeyCode::Esc) => {
            if state.focused_panel == FocusedPanel::Detail {
                state.focused_panel = FocusedPanel::List;
            } else {
                state.clear_status();
            }
            None
        }

        // Navigation within panel
        (_, KeyCode::Char('j') | KeyCode::Down) => match state.focused_panel {
            FocusedPanel::List => {
                state.feed.select_next();
                state.load_comments()
            }
            FocusedPanel::Detail => {
                state.detail_scroll = state.detail_scroll.saturating_add(1);
                None
            }
        },
        (_, KeyCode::Char('k') | KeyCode::Up) => match state.focused_panel {
            FocusedPanel::List => {
                state.feed.select_previous();
                state.load_comments()
            }
            FocusedPanel::Detail => {
                state.detail_scroll = state.detail_scroll.saturating_sub(1);
                None
            }
        },
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
            state.detail_scroll = state.detail_scroll.saturating_add(10);
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            state.detail_scroll = state.detail_scroll.saturating_sub(10);
            None
        }
        (_, KeyCode::Char('g')) => {
            state.feed.select_first();
            state.load_comments()
        }
        (_, KeyCode::Char('G')) => {
            state.feed.select_last();
            state.load_comments()
        }

        // Actions
        (_, KeyCode::Char('L' | ' ')) => state.toggle_like_selected(),
        (_, KeyCode::Char('o')) => {
            open_selected_link(state);
            None
        }
        (_, KeyCode::Char('n')) => {
            if state.user().is_some() {
                let room_index = selected_post_room_index(state);
                state.open_compose(room_index);
            }
            None
        }
        _ => None,
    }
}

fn handle_rooms_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.rooms.select_next(),
        KeyCode::Up | KeyCode::Char('k') => state.rooms.select_previous(),
        KeyCode::Char('g') => state.rooms.select_first(),
        KeyCode::Char('G') => state.rooms.select_last(),
        KeyCode::Char('c') if state.user().is_some() => state.open_create_room(),
        KeyCode::Char('n') | KeyCode::Enter if state.user().is_some() => {
            let room_index = state.rooms.selected_index();
            state.open_compose(room_index);
        }
        KeyCode::Esc => state.clear_status(),
        _ => {}
    }
    None
}

fn handle_trending_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let count = state.feed.trending(TRENDING_LIMIT).len();
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if state.trending_selected + 1 < count {
                state.trending_selected += 1;
            }
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.trending_selected = state.trending_selected.saturating_sub(1);
            None
        }
        KeyCode::Char('g') => {
            state.trending_selected = 0;
            None
        }
        KeyCode::Char('G') => {
            state.trending_selected = count.saturating_sub(1);
            None
        }
        KeyCode::Char('L' | ' ') => state.toggle_like_selected(),
        KeyCode::Char('o') => {
            open_selected_link(state);
            None
        }
        KeyCode::Esc => {
            state.clear_status();
            None
        }
        _ => None,
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('x') if state.user().is_some() => {
            state.mode = Mode::ConfirmLogout;
        }
        KeyCode::Char('o') => {
            if let Some(link) = state.user().and_then(|u| u.external_link.clone()) {
                open_link(state, &link);
            }
        }
        KeyCode::Esc => state.clear_status(),
        _ => {}
    }
    None
}

fn handle_login_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            None
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            state.login_form.toggle_field();
            None
        }
        KeyCode::Enter => {
            if state.login_form.field == LoginField::Email {
                state.login_form.field = LoginField::Password;
                None
            } else {
                submit_login(state)
            }
        }
        KeyCode::Backspace => {
            state.login_form.input_mut().pop();
            None
        }
        KeyCode::Char(c) => {
            state.login_form.input_mut().push(c);
            None
        }
        _ => None,
    }
}

fn submit_login(state: &mut AppState) -> Option<AsyncCommand> {
    if state.submitting {
        return None;
    }
    let request = match LoginRequest::new(&state.login_form.email, &state.login_form.password) {
        Ok(request) => request,
        Err(e) => {
            state.set_status(format!("⚠ {e}"));
            return None;
        }
    };

    if state.demo {
        if let Err(e) = state.auth.begin_session("demo", demo::current_user()) {
            state.set_status(format!("❌ {e}"));
            return None;
        }
        state.mode = Mode::Normal;
        state.refresh_feed();
        state.refresh_rooms();
        state.set_status("👋 Welcome back to the demo!");
        return None;
    }

    state.submitting = true;
    state.set_status("Signing in...");
    Some(AsyncCommand::Login { request })
}

fn handle_compose_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let field = state.compose_form.field;
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => state.mode = Mode::Normal,
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => return submit_compose(state),
        (_, KeyCode::Tab | KeyCode::Down | KeyCode::Enter) => {
            state.compose_form.field = field.next();
        }
        (_, KeyCode::BackTab | KeyCode::Up) => state.compose_form.field = field.prev(),
        (_, KeyCode::Left) if !field.is_text() => cycle_compose_choice(state, false),
        (_, KeyCode::Right | KeyCode::Char(' ')) if !field.is_text() => {
            cycle_compose_choice(state, true);
        }
        (_, KeyCode::Backspace) => {
            if let Some((input, _)) = state.compose_form.input_mut() {
                input.pop();
            }
        }
        (_, KeyCode::Char(c)) => {
            if let Some((input, limit)) = state.compose_form.input_mut()
                && limit.is_none_or(|max| input.chars().count() < max)
            {
                input.push(c);
            }
        }
        _ => {}
    }
    None
}

fn cycle_compose_choice(state: &mut AppState, forward: bool) {
    let room_count = state.rooms.items().len().max(1);
    let form = &mut state.compose_form;
    match form.field {
        ComposeField::Room => {
            form.room_index = if forward {
                (form.room_index + 1) % room_count
            } else {
                (form.room_index + room_count - 1) % room_count
            };
        }
        ComposeField::Recommendation => {
            form.recommendation_type = form.recommendation_type.toggle();
        }
        ComposeField::Action => {
            form.action_type = if forward {
                form.action_type.next()
            } else {
                // Three steps forward is one step back in a cycle of four
                form.action_type.next().next().next()
            };
        }
        _ => {}
    }
}

fn submit_compose(state: &mut AppState) -> Option<AsyncCommand> {
    if state.submitting {
        return None;
    }
    let room = state.compose_room().cloned();
    let post = match state.compose_form.to_request(room.as_ref()) {
        Ok(post) => post,
        Err(e) => {
            state.set_status(format!("⚠ {e}"));
            return None;
        }
    };
    let Some(token) = state.session_token() else {
        state.session_ended("Please sign in to post");
        return None;
    };

    if state.demo {
        if let (Some(user), Some(room)) = (state.user().cloned(), room) {
            state.feed.prepend(demo::local_post(&post, &user, &room));
        }
        state.mode = Mode::Normal;
        state.set_status("✅ Recommendation posted");
        return None;
    }

    state.submitting = true;
    state.set_status("Posting...");
    Some(AsyncCommand::CreatePost { token, post })
}

fn handle_room_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    let on_color = state.room_form.field == RoomField::Color;
    let colors = ROOM_COLORS.len();
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => state.mode = Mode::Normal,
        (_, KeyCode::Enter) | (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            return submit_room(state);
        }
        (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => {
            state.room_form.field = if on_color {
                RoomField::Name
            } else {
                RoomField::Color
            };
        }
        (_, KeyCode::Left) if on_color => {
            state.room_form.color_index = (state.room_form.color_index + colors - 1) % colors;
        }
        (_, KeyCode::Right | KeyCode::Char(' ')) if on_color => {
            state.room_form.color_index = (state.room_form.color_index + 1) % colors;
        }
        (_, KeyCode::Backspace) if !on_color => {
            state.room_form.name.pop();
        }
        (_, KeyCode::Char(c)) if !on_color => {
            if state.room_form.name.chars().count() < MAX_ROOM_NAME_CHARS {
                state.room_form.name.push(c);
            }
        }
        _ => {}
    }
    None
}

fn submit_room(state: &mut AppState) -> Option<AsyncCommand> {
    if state.submitting {
        return None;
    }
    let room = match state.room_form.to_request() {
        Ok(room) => room,
        Err(e) => {
            state.set_status(format!("⚠ {e}"));
            return None;
        }
    };
    let Some(token) = state.session_token() else {
        state.session_ended("Please sign in to create rooms");
        return None;
    };

    if state.demo {
        state.rooms.prepend(demo::local_room(&room));
        state.mode = Mode::Normal;
        state.set_status(format!("✅ Room \"{}\" created", room.name));
        return None;
    }

    state.submitting = true;
    state.set_status("Creating room...");
    Some(AsyncCommand::CreateRoom { token, room })
}

fn handle_confirm_logout_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
            let token = state.session_token();
            state.auth.logout();
            state.session_ended("Signed out");
            if state.demo {
                return None;
            }
            token.map(|token| AsyncCommand::Logout { token })
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            None
        }
        _ => None,
    }
}

/// Index of the selected post's room in the user's rooms, or 0
fn selected_post_room_index(state: &AppState) -> usize {
    state
        .feed
        .selected()
        .and_then(|post| state.rooms.items().iter().position(|r| r.id == post.room.id))
        .unwrap_or(0)
}

fn open_selected_link(state: &mut AppState) {
    match state.selected_post().and_then(|p| p.external_link.clone()) {
        Some(link) => open_link(state, &link),
        None => state.set_status("No link on this post"),
    }
}

fn open_link(state: &mut AppState, link: &str) {
    match open::that(link) {
        Ok(()) => state.set_status("✓ Opened in browser"),
        Err(e) => {
            tracing::warn!("Failed to open {link}: {e}");
            state.set_status(format!("❌ Could not open link: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::signed_in_state;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn press(state: &mut AppState, code: KeyCode) -> Option<AsyncCommand> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    fn signed_out_state() -> AppState {
        AppState::new(Config::default(), Arc::new(MemoryStore::new()), false)
    }

    #[test]
    fn test_login_form_submits_normalized_request() {
        let mut state = signed_out_state();
        state.open_login();

        type_text(&mut state, " Sarah@Example.COM ");
        press(&mut state, KeyCode::Enter);
        type_text(&mut state, "hunter2");

        match press(&mut state, KeyCode::Enter) {
            Some(AsyncCommand::Login { request }) => {
                assert_eq!(request.email, "sarah@example.com");
                assert_eq!(request.password, "hunter2");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(state.submitting);
        assert!(press(&mut state, KeyCode::Enter).is_none());
    }

    #[test]
    fn test_login_validation_stays_local() {
        let mut state = signed_out_state();
        state.open_login();
        type_text(&mut state, "not-an-email");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "pw");

        assert!(press(&mut state, KeyCode::Enter).is_none());
        assert_eq!(state.status, "⚠ Please enter a valid email address");
        assert_eq!(state.mode, Mode::Login);
    }

    #[test]
    fn test_q_in_form_is_text_not_quit() {
        let mut state = signed_out_state();
        state.open_login();
        press(&mut state, KeyCode::Char('q'));
        assert!(!state.should_quit);
        assert_eq!(state.login_form.email, "q");

        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }

    #[test]
    fn test_theme_key_persists_choice() {
        let mut state = signed_in_state();
        press(&mut state, KeyCode::Char('t'));
        assert!(!state.theme.is_dark_mode());
        assert_eq!(state.status, "✓ Light mode");
    }

    #[test]
    fn test_like_key_sends_command_once() {
        let mut state = signed_in_state();
        state.feed.load_demo(demo::posts());

        assert!(matches!(
            press(&mut state, KeyCode::Char('L')),
            Some(AsyncCommand::Like { .. })
        ));
        assert!(press(&mut state, KeyCode::Char('L')).is_none());
        assert_eq!(state.feed.items()[0].like_count, 43);
    }

    #[test]
    fn test_compose_title_respects_limit() {
        let mut state = signed_in_state();
        state.rooms.load_demo(demo::user_rooms());
        state.open_compose(0);
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, &"x".repeat(100));
        assert_eq!(state.compose_form.title.chars().count(), 80);
    }

    #[test]
    fn test_compose_submit_sends_post() {
        let mut state = signed_in_state();
        state.rooms.load_demo(demo::user_rooms());
        state.open_compose(0);
        press(&mut state, KeyCode::Right);
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Great ramen");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Rich broth");

        let cmd = handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
        );
        match cmd {
            Some(AsyncCommand::CreatePost { token, post }) => {
                assert_eq!(token, "tok");
                assert_eq!(post.room_id, "2");
                assert_eq!(post.title, "Great ramen");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_logout_requires_confirmation() {
        let mut state = signed_in_state();
        press(&mut state, KeyCode::Char('4'));
        press(&mut state, KeyCode::Char('x'));
        assert_eq!(state.mode, Mode::ConfirmLogout);

        press(&mut state, KeyCode::Esc);
        assert!(state.user().is_some());

        press(&mut state, KeyCode::Char('x'));
        let cmd = press(&mut state, KeyCode::Char('y'));
        assert!(matches!(cmd, Some(AsyncCommand::Logout { token }) if token == "tok"));
        assert!(state.user().is_none());
        assert_eq!(state.auth.token(), None);
        assert_eq!(state.mode, Mode::Login);
    }

    #[test]
    fn test_room_form_submits_selected_color() {
        let mut state = signed_in_state();
        press(&mut state, KeyCode::Char('2'));
        press(&mut state, KeyCode::Char('c'));
        type_text(&mut state, "Coffee");
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Right);

        match press(&mut state, KeyCode::Enter) {
            Some(AsyncCommand::CreateRoom { room, .. }) => {
                assert_eq!(room.name, "Coffee");
                assert_eq!(room.color, ROOM_COLORS[1]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
