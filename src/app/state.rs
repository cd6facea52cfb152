//! Application state

use crate::auth::AuthState;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ActionType, Comment, LikeResponse, NewPost, NewRoom, Post, ROOM_COLORS, RecommendationType,
    Room, User, parse_tags,
};
use crate::screen::ListScreen;
use crate::storage::SharedStore;
use crate::theme::ThemeState;
use crate::{api::PostQuery, demo};

use super::async_ops::AsyncCommand;

/// Top-level tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Feed,
    Rooms,
    Trending,
    Profile,
}

impl View {
    /// Tabs in display order
    pub const fn all() -> &'static [Self] {
        &[Self::Feed, Self::Rooms, Self::Trending, Self::Profile]
    }

    /// Tab title
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Feed => "Feed",
            Self::Rooms => "Rooms",
            Self::Trending => "Trending",
            Self::Profile => "Profile",
        }
    }

    pub const fn index(&self) -> usize {
        match self {
            Self::Feed => 0,
            Self::Rooms => 1,
            Self::Trending => 2,
            Self::Profile => 3,
        }
    }

    /// Next tab, wrapping
    pub fn next(&self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    /// Previous tab, wrapping
    pub fn prev(&self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

/// Which feed panel has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    List,
    Detail,
}

/// Modal input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
    Login,
    ComposePost,
    CreateRoom,
    ConfirmLogout,
}

/// Login form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Email/password form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub field: LoginField,
}

impl LoginForm {
    /// Move focus to the other field
    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    /// Buffer of the focused field
    pub fn input_mut(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Compose form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    #[default]
    Room,
    Title,
    Description,
    Tags,
    Link,
    Recommendation,
    Action,
}

impl ComposeField {
    const ORDER: [Self; 7] = [
        Self::Room,
        Self::Title,
        Self::Description,
        Self::Tags,
        Self::Link,
        Self::Recommendation,
        Self::Action,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Whether the field takes typed text
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::Description | Self::Tags | Self::Link)
    }
}

/// New recommendation form
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    pub room_index: usize,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub link: String,
    pub recommendation_type: RecommendationType,
    pub action_type: ActionType,
    pub field: ComposeField,
}

impl ComposeForm {
    /// Text buffer of the focused field, with its length limit
    pub fn input_mut(&mut self) -> Option<(&mut String, Option<usize>)> {
        match self.field {
            ComposeField::Title => Some((&mut self.title, Some(crate::models::MAX_TITLE_CHARS))),
            ComposeField::Description => Some((
                &mut self.description,
                Some(crate::models::MAX_DESCRIPTION_CHARS),
            )),
            ComposeField::Tags => Some((&mut self.tags, None)),
            ComposeField::Link => Some((&mut self.link, None)),
            _ => None,
        }
    }

    /// Build the request body for `room`
    pub fn to_request(&self, room: Option<&Room>) -> ApiResult<NewPost> {
        let room_id = room.map(|r| r.id.as_str()).unwrap_or_default();
        let mut post = NewPost::new(room_id, &self.title, &self.description);
        post.tags = parse_tags(&self.tags);
        post.external_link = self.link.clone();
        post.recommendation_type = self.recommendation_type;
        post.action_type = self.action_type;
        post.validated()
    }
}

/// Room fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomField {
    #[default]
    Name,
    Color,
}

/// New room form
#[derive(Debug, Clone, Default)]
pub struct RoomForm {
    pub name: String,
    pub color_index: usize,
    pub field: RoomField,
}

impl RoomForm {
    /// Chosen colour
    pub fn color(&self) -> &'static str {
        ROOM_COLORS[self.color_index % ROOM_COLORS.len()]
    }

    pub fn to_request(&self) -> ApiResult<NewRoom> {
        NewRoom::new(&self.name, self.color())
    }
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Session
    pub auth: AuthState<SharedStore>,
    /// Display mode
    pub theme: ThemeState<SharedStore>,
    /// Running on bundled fixtures
    pub demo: bool,
    /// Whether to quit
    pub should_quit: bool,
    /// Current tab
    pub view: View,
    /// Current modal mode
    pub mode: Mode,
    /// Focused feed panel
    pub focused_panel: FocusedPanel,

    /// Feed posts
    pub feed: ListScreen<Post>,
    /// The user's rooms
    pub rooms: ListScreen<Room>,
    /// Comments on the selected post
    pub comments: ListScreen<Comment>,
    /// Post the loaded comments belong to
    pub comments_for: Option<String>,
    /// Cursor on the trending list
    pub trending_selected: usize,
    /// Scroll offset of the detail panel
    pub detail_scroll: u16,

    /// Login form
    pub login_form: LoginForm,
    /// Compose form
    pub compose_form: ComposeForm,
    /// Create-room form
    pub room_form: RoomForm,

    /// A login or create request is in flight
    pub submitting: bool,
    /// Status message (bottom bar)
    pub status: String,

    /// Tick counter for animations
    tick: u64,
}

/// Number of entries on the trending tab
pub const TRENDING_LIMIT: usize = 10;

impl AppState {
    /// Create the state and load the saved display mode
    pub fn new(config: Config, store: SharedStore, demo: bool) -> Self {
        let mut theme = ThemeState::new(store.clone());
        theme.initialize_theme();

        Self {
            config,
            auth: AuthState::new(store),
            theme,
            demo,
            should_quit: false,
            view: View::Feed,
            mode: Mode::Normal,
            focused_panel: FocusedPanel::List,
            feed: ListScreen::new(),
            rooms: ListScreen::new(),
            comments: ListScreen::new(),
            comments_for: None,
            trending_selected: 0,
            detail_scroll: 0,
            login_form: LoginForm::default(),
            compose_form: ComposeForm::default(),
            room_form: RoomForm::default(),
            submitting: false,
            status: String::new(),
            tick: 0,
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Get current tick
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status.clear();
    }

    /// The signed-in user
    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    /// Whether any network or local work is pending
    pub const fn is_busy(&self) -> bool {
        self.submitting
            || self.feed.is_loading()
            || self.rooms.is_loading()
            || self.auth.is_loading()
    }

    /// Show the next tab
    pub fn next_view(&mut self) -> Option<AsyncCommand> {
        self.switch_view(self.view.next())
    }

    /// Show the previous tab
    pub fn prev_view(&mut self) -> Option<AsyncCommand> {
        self.switch_view(self.view.prev())
    }

    /// Show a tab, fetching its data the first time it is opened
    pub fn switch_view(&mut self, view: View) -> Option<AsyncCommand> {
        self.view = view;
        match view {
            View::Feed | View::Trending if self.feed.state() == &crate::screen::LoadState::Idle => {
                self.refresh_feed()
            }
            View::Rooms if self.rooms.state() == &crate::screen::LoadState::Idle => {
                self.refresh_rooms()
            }
            _ => None,
        }
    }

    /// Reload whatever the current tab shows
    pub fn refresh_current_view(&mut self) -> Option<AsyncCommand> {
        match self.view {
            View::Feed | View::Trending => self.refresh_feed(),
            View::Rooms => self.refresh_rooms(),
            View::Profile => None,
        }
    }

    /// Start a feed load. No identity means no fetch.
    pub fn refresh_feed(&mut self) -> Option<AsyncCommand> {
        if self.demo {
            self.feed.load_demo(demo::posts());
            return None;
        }
        let Some(token) = self.session_token() else {
            self.feed.reset();
            return None;
        };
        let generation = self.feed.begin_load();
        Some(AsyncCommand::FetchPosts {
            token: Some(token),
            query: PostQuery::latest(self.config.post_limit),
            generation,
        })
    }

    /// Start a rooms load. No identity means no fetch.
    pub fn refresh_rooms(&mut self) -> Option<AsyncCommand> {
        if self.demo {
            self.rooms.load_demo(demo::user_rooms());
            return None;
        }
        let Some(token) = self.session_token() else {
            self.rooms.reset();
            return None;
        };
        let generation = self.rooms.begin_load();
        Some(AsyncCommand::FetchRooms { token, generation })
    }

    /// Load comments for the highlighted post unless they are already shown
    pub fn load_comments(&mut self) -> Option<AsyncCommand> {
        let post_id = self.feed.selected()?.id.clone();
        if self.comments_for.as_deref() == Some(post_id.as_str()) {
            return None;
        }
        self.comments_for = Some(post_id.clone());
        self.detail_scroll = 0;

        if self.demo {
            self.comments.load_demo(demo::comments(&post_id));
            return None;
        }
        let generation = self.comments.begin_load();
        Some(AsyncCommand::FetchComments { post_id, generation })
    }

    /// Post highlighted on the current tab
    pub fn selected_post(&self) -> Option<&Post> {
        match self.view {
            View::Trending => self
                .feed
                .trending(TRENDING_LIMIT)
                .get(self.trending_selected)
                .map(|t| t.post),
            _ => self.feed.selected(),
        }
    }

    /// Optimistically toggle the like on the highlighted post
    pub fn toggle_like_selected(&mut self) -> Option<AsyncCommand> {
        let post_id = self.selected_post()?.id.clone();
        let Some(token) = self.session_token() else {
            self.set_status("Sign in to like posts");
            return None;
        };

        let pending = self.feed.toggle_like(&post_id)?;
        if self.demo {
            let liked = !pending.liked_before;
            let like_count = self
                .feed
                .items()
                .iter()
                .find(|p| p.id == post_id)
                .map_or(pending.count_before, |p| p.like_count);
            self.feed
                .confirm_like(&pending, LikeResponse { liked, like_count });
            return None;
        }
        Some(AsyncCommand::Like { token, pending })
    }

    /// Open the login form
    pub fn open_login(&mut self) {
        self.login_form = LoginForm::default();
        self.mode = Mode::Login;
    }

    /// Open the compose form, preselecting `room_index`
    pub fn open_compose(&mut self, room_index: usize) {
        if self.rooms.items().is_empty() {
            self.set_status("Create a room first");
            return;
        }
        self.compose_form = ComposeForm {
            room_index: room_index.min(self.rooms.items().len() - 1),
            ..ComposeForm::default()
        };
        self.mode = Mode::ComposePost;
    }

    /// Open the create-room form
    pub fn open_create_room(&mut self) {
        self.room_form = RoomForm::default();
        self.mode = Mode::CreateRoom;
    }

    /// Room currently chosen in the compose form
    pub fn compose_room(&self) -> Option<&Room> {
        self.rooms.items().get(self.compose_form.room_index)
    }

    /// Token of the current session, if signed in
    pub fn session_token(&self) -> Option<String> {
        if self.auth.is_authenticated() {
            self.auth.token()
        } else {
            None
        }
    }

    /// Route an API result through the session; a 401 ends the session
    pub fn check_session<T>(&mut self, result: ApiResult<T>) -> ApiResult<T> {
        let result = self.auth.observe(result);
        if result.as_ref().is_err_and(ApiError::is_unauthorized) {
            self.session_ended("Session expired. Please sign in again.");
        }
        result
    }

    /// Clear per-user data after logout or session expiry
    pub fn session_ended(&mut self, message: &str) {
        self.feed.reset();
        self.rooms.reset();
        self.comments.reset();
        self.comments_for = None;
        self.trending_selected = 0;
        self.submitting = false;
        self.open_login();
        self.set_status(message);
    }
}
