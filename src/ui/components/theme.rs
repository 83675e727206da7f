//! Light/dark palettes and the persisted dark-mode preference.
//!
//! The preference follows the terminal's background only until the user
//! toggles it once; from then on the stored flag wins.

use std::sync::Arc;

use colored::{Color, ColoredString, Colorize};
use tracing::{debug, warn};

use crate::storage::prefs::{PreferenceStore, THEME_KEY};

/// Palette colors shared by both themes.
pub mod colors {
    use colored::Color;

    /// Primary accent - links, active page
    pub const ACCENT_PRIMARY: Color = Color::TrueColor {
        r: 122,
        g: 162,
        b: 247,
    }; // #7aa2f7

    /// Secondary accent - suggestions
    pub const ACCENT_SECONDARY: Color = Color::TrueColor {
        r: 187,
        g: 154,
        b: 247,
    }; // #bb9af7

    /// Primary text on dark backgrounds
    pub const TEXT_PRIMARY: Color = Color::TrueColor {
        r: 192,
        g: 202,
        b: 245,
    }; // #c0caf5

    /// Muted text - hints, timestamps
    pub const TEXT_MUTED: Color = Color::TrueColor {
        r: 105,
        g: 114,
        b: 158,
    }; // #696e9e

    pub const STATUS_SUCCESS: Color = Color::TrueColor {
        r: 115,
        g: 218,
        b: 202,
    }; // #73daca

    pub const STATUS_WARNING: Color = Color::TrueColor {
        r: 224,
        g: 175,
        b: 104,
    }; // #e0af68
}

/// Which palette is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn to_palette(self) -> ThemePalette {
        match self {
            Self::Light => ThemePalette::light(),
            Self::Dark => ThemePalette::dark(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub fg: Color,
    pub hint: Color,
    pub success: Color,
    pub warning: Color,
}

impl ThemePalette {
    /// Light theme - dark text, saturated accents
    pub fn light() -> Self {
        Self {
            accent: Color::TrueColor {
                r: 47,
                g: 107,
                b: 231,
            }, // Rich blue
            accent_alt: Color::TrueColor {
                r: 124,
                g: 93,
                b: 198,
            }, // Purple
            fg: Color::TrueColor {
                r: 36,
                g: 41,
                b: 46,
            }, // Near-black
            hint: Color::TrueColor {
                r: 125,
                g: 134,
                b: 144,
            }, // Medium gray
            success: Color::TrueColor {
                r: 45,
                g: 138,
                b: 72,
            }, // Forest green
            warning: Color::TrueColor {
                r: 177,
                g: 133,
                b: 41,
            }, // Amber
        }
    }

    /// Dark theme - muted text, soft accents
    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            fg: colors::TEXT_PRIMARY,
            hint: colors::TEXT_MUTED,
            success: colors::STATUS_SUCCESS,
            warning: colors::STATUS_WARNING,
        }
    }

    pub fn title(&self, text: &str) -> ColoredString {
        text.color(self.accent).bold()
    }

    pub fn body(&self, text: &str) -> ColoredString {
        text.color(self.fg)
    }

    pub fn hint(&self, text: &str) -> ColoredString {
        text.color(self.hint)
    }

    pub fn link(&self, text: &str) -> ColoredString {
        text.color(self.accent).underline()
    }

    pub fn suggestion(&self, text: &str) -> ColoredString {
        text.color(self.accent_alt).bold().italic()
    }

    pub fn ok(&self, text: &str) -> ColoredString {
        text.color(self.success)
    }

    pub fn warn(&self, text: &str) -> ColoredString {
        text.color(self.warning)
    }
}

/// Best-effort read of the terminal background from `COLORFGBG` (`"fg;bg"`).
/// Unknown terminals are assumed dark.
pub fn system_prefers_dark() -> bool {
    match std::env::var("COLORFGBG") {
        Ok(value) => colorfgbg_is_dark(&value).unwrap_or(true),
        Err(_) => true,
    }
}

fn colorfgbg_is_dark(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    // ANSI 0-6 and 8 are dark backgrounds; 7 and 9-15 are light.
    Some(bg <= 6 || bg == 8)
}

/// Persisted dark-mode flag.
pub struct ThemePreference {
    store: Arc<dyn PreferenceStore>,
    dark: bool,
    explicit: bool,
}

impl ThemePreference {
    /// Read the stored flag; fall back to `system_dark` only if nothing was ever stored.
    pub fn load(store: Arc<dyn PreferenceStore>, system_dark: bool) -> Self {
        let (dark, explicit) = match store.get(THEME_KEY) {
            Some(value) => (value == "true", true),
            None => (system_dark, false),
        };
        debug!(dark, explicit, "loaded theme preference");
        Self {
            store,
            dark,
            explicit,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Whether the flag came from the store rather than the system default.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn mode(&self) -> ThemeMode {
        ThemeMode::from_dark(self.dark)
    }

    pub fn palette(&self) -> ThemePalette {
        self.mode().to_palette()
    }

    /// Flip the flag and persist it. Returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.set_dark(!self.dark);
        self.dark
    }

    pub fn set_dark(&mut self, dark: bool) {
        self.dark = dark;
        self.explicit = true;
        if let Err(e) = self.store.set(THEME_KEY, if dark { "true" } else { "false" }) {
            warn!("failed to persist theme preference: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::prefs::MemoryStore;

    #[test]
    fn system_default_applies_only_without_stored_flag() {
        let store = Arc::new(MemoryStore::new());
        let pref = ThemePreference::load(store.clone(), true);
        assert!(pref.is_dark());
        assert!(!pref.is_explicit());

        store.set(THEME_KEY, "false").unwrap();
        let pref = ThemePreference::load(store, true);
        assert!(!pref.is_dark());
        assert!(pref.is_explicit());
    }

    #[test]
    fn toggle_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut pref = ThemePreference::load(store.clone(), false);
        assert!(pref.toggle());
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("true"));
        assert!(!pref.toggle());
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("false"));

        let reloaded = ThemePreference::load(store, true);
        assert!(!reloaded.is_dark());
    }

    #[test]
    fn unrecognized_stored_value_reads_as_light() {
        let store = Arc::new(MemoryStore::new());
        store.set(THEME_KEY, "yes please").unwrap();
        assert!(!ThemePreference::load(store, true).is_dark());
    }

    #[test]
    fn colorfgbg_parsing() {
        assert_eq!(colorfgbg_is_dark("15;0"), Some(true));
        assert_eq!(colorfgbg_is_dark("0;15"), Some(false));
        assert_eq!(colorfgbg_is_dark("12;7"), Some(false));
        assert_eq!(colorfgbg_is_dark("15;default;8"), Some(true));
        assert_eq!(colorfgbg_is_dark("garbage"), None);
    }

    #[test]
    fn mode_maps_to_palette() {
        assert_eq!(ThemeMode::Dark.to_palette(), ThemePalette::dark());
        assert_eq!(ThemeMode::Light.to_palette(), ThemePalette::light());
        assert_eq!(ThemeMode::from_dark(true).name(), "dark");
    }
}
