//! Display mode and colours.
//!
//! irecommend has two palettes, dark and light. The chosen mode is persisted
//! under [`THEME_MODE_KEY`] so it survives restarts; dark is the default.

use ratatui::style::{Color, Modifier, Style};

use crate::storage::{KeyValueStore, THEME_MODE_KEY};

/// Stored marker for dark mode
pub const DARK_MARKER: &str = "dark";
/// Stored marker for light mode
pub const LIGHT_MARKER: &str = "light";

/// Colour palette for one display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Screen background
    pub background: Color,
    /// Panel background
    pub surface: Color,
    /// Secondary panel background (status bar, popups)
    pub surface_secondary: Color,
    /// Border color
    pub border: Color,
    /// Primary text
    pub text: Color,
    /// Secondary text
    pub text_secondary: Color,
    /// Accent
    pub primary: Color,
    /// Success / recommend
    pub success: Color,
    /// Error / not recommended
    pub error: Color,
    /// Warning
    pub warning: Color,
    /// Info
    pub info: Color,
}

/// Dark palette
pub const DARK: Palette = Palette {
    background: Color::Rgb(0x00, 0x00, 0x00),
    surface: Color::Rgb(0x1C, 0x1C, 0x1E),
    surface_secondary: Color::Rgb(0x2C, 0x2C, 0x2E),
    border: Color::Rgb(0x38, 0x38, 0x3A),
    text: Color::Rgb(0xFF, 0xFF, 0xFF),
    text_secondary: Color::Rgb(0x8E, 0x8E, 0x93),
    primary: Color::Rgb(0x00, 0x7A, 0xFF),
    success: Color::Rgb(0x34, 0xC7, 0x59),
    error: Color::Rgb(0xFF, 0x3B, 0x30),
    warning: Color::Rgb(0xFF, 0x95, 0x00),
    info: Color::Rgb(0x5A, 0xC8, 0xFA),
};

/// Light palette
pub const LIGHT: Palette = Palette {
    background: Color::Rgb(0xFF, 0xFF, 0xFF),
    surface: Color::Rgb(0xF2, 0xF2, 0xF7),
    surface_secondary: Color::Rgb(0xFF, 0xFF, 0xFF),
    border: Color::Rgb(0xC6, 0xC6, 0xC8),
    text: Color::Rgb(0x00, 0x00, 0x00),
    text_secondary: Color::Rgb(0x6D, 0x6D, 0x70),
    primary: Color::Rgb(0x00, 0x7A, 0xFF),
    success: Color::Rgb(0x34, 0xC7, 0x59),
    error: Color::Rgb(0xFF, 0x3B, 0x30),
    warning: Color::Rgb(0xFF, 0x95, 0x00),
    info: Color::Rgb(0x5A, 0xC8, 0xFA),
};

impl Palette {
    /// Palette for a display mode
    pub const fn for_mode(is_dark_mode: bool) -> &'static Self {
        if is_dark_mode { &DARK } else { &LIGHT }
    }

    // Style helpers

    /// Default text style
    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Dimmed text style
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    /// Accent text style
    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Success style
    pub fn text_success(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Warning style
    pub fn text_warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Error style
    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Info style
    pub fn text_info(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Block border style
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Focused block border style
    pub fn block_focus(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Selected item style
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.surface_secondary)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    /// Tab style
    pub fn tab(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    /// Active tab style
    pub fn tab_active(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for shortcuts)
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }
}

/// Persisted dark/light flag with its palette
#[derive(Debug)]
pub struct ThemeState<S: KeyValueStore> {
    store: S,
    is_dark_mode: bool,
}

impl<S: KeyValueStore> ThemeState<S> {
    /// Create a dark-mode state; call [`Self::initialize_theme`] to load the saved mode
    pub const fn new(store: S) -> Self {
        Self {
            store,
            is_dark_mode: true,
        }
    }

    /// Whether dark mode is active
    pub const fn is_dark_mode(&self) -> bool {
        self.is_dark_mode
    }

    /// The active palette
    pub const fn palette(&self) -> &'static Palette {
        Palette::for_mode(self.is_dark_mode)
    }

    /// Display name of the active mode
    pub const fn mode_name(&self) -> &'static str {
        if self.is_dark_mode { "Dark" } else { "Light" }
    }

    /// Flip between dark and light
    pub fn toggle_theme(&mut self) {
        self.set_theme(!self.is_dark_mode);
    }

    /// Switch to a mode and persist it. Storage failures only log.
    pub fn set_theme(&mut self, is_dark: bool) {
        let marker = if is_dark { DARK_MARKER } else { LIGHT_MARKER };
        if let Err(e) = self.store.set(THEME_MODE_KEY, marker) {
            tracing::warn!("Error saving theme preference: {e}");
        }
        self.is_dark_mode = is_dark;
    }

    /// Load the saved mode. Anything but the literal light marker means dark.
    pub fn initialize_theme(&mut self) {
        let saved = match self.store.get(THEME_MODE_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Error loading theme preference: {e}");
                None
            }
        };
        self.is_dark_mode = saved.as_deref() != Some(LIGHT_MARKER);
        tracing::debug!("Theme initialized: {}", self.mode_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use std::sync::Arc;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_toggle_persists_light() {
        let store = Arc::new(MemoryStore::new());
        let mut theme = ThemeState::new(Arc::clone(&store));
        assert!(theme.is_dark_mode());

        theme.toggle_theme();
        assert!(!theme.is_dark_mode());
        assert_eq!(theme.palette(), &LIGHT);
        assert_eq!(store.get(THEME_MODE_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_toggle_survives_reinitialize() {
        let store = Arc::new(MemoryStore::new());
        let mut theme = ThemeState::new(Arc::clone(&store));
        theme.toggle_theme();

        let mut fresh = ThemeState::new(store);
        fresh.initialize_theme();
        assert!(!fresh.is_dark_mode());
        assert_eq!(fresh.mode_name(), "Light");
    }

    #[test]
    fn test_initialize_defaults_to_dark() {
        let mut theme = ThemeState::new(MemoryStore::new());
        theme.initialize_theme();
        assert!(theme.is_dark_mode());
        assert_eq!(theme.palette(), &DARK);
    }

    #[test]
    fn test_unknown_marker_means_dark() {
        let store = MemoryStore::new();
        store.set(THEME_MODE_KEY, "LIGHT").unwrap();
        let mut theme = ThemeState::new(store);
        theme.initialize_theme();
        assert!(theme.is_dark_mode());

        let store = MemoryStore::new();
        store.set(THEME_MODE_KEY, "solarized").unwrap();
        let mut theme = ThemeState::new(store);
        theme.initialize_theme();
        assert!(theme.is_dark_mode());
    }

    #[test]
    fn test_storage_failure_still_switches_palette() {
        let mut theme = ThemeState::new(FailingStore);
        theme.initialize_theme();
        assert!(theme.is_dark_mode());

        theme.set_theme(false);
        assert!(!theme.is_dark_mode());
        assert_eq!(theme.palette().background, Color::Rgb(0xFF, 0xFF, 0xFF));
    }
}
