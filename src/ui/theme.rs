//! Light/dark theme preference.
//!
//! The theme comes from the stored `"theme"` preference when present and
//! from the system color scheme otherwise. System changes are followed only
//! while no explicit preference is stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::preferences::PreferenceStore;
use crate::error::FeedError;

/// Preference key holding the explicit theme choice.
pub const THEME_KEY: &str = "theme";

/// Rendering theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    const fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Best-effort guess at the terminal's color scheme.
///
/// Reads `COLORFGBG` (`"fg;bg"`, set by many terminals); background colors
/// 0-6 and 8 are dark. Defaults to light when unknown.
#[must_use]
pub fn system_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .is_some_and(|v| colorfgbg_is_dark(&v))
}

fn colorfgbg_is_dark(value: &str) -> bool {
    value
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

/// Owns the theme state and its persistence.
#[derive(Debug)]
pub struct ThemeController<P> {
    prefs: P,
    current: Theme,
}

impl<P: PreferenceStore> ThemeController<P> {
    /// Resolves the startup theme: stored preference first, then the
    /// system scheme.
    pub fn init(prefs: P, system_dark: bool) -> Self {
        let current = stored_theme(&prefs).unwrap_or(Theme::from_system(system_dark));
        tracing::debug!(theme = %current, "theme initialized");
        Self { prefs, current }
    }

    /// Theme in effect.
    #[must_use]
    pub const fn current(&self) -> Theme {
        self.current
    }

    /// Returns `true` if the user has stored an explicit choice.
    #[must_use]
    pub fn has_explicit_preference(&self) -> bool {
        stored_theme(&self.prefs).is_some()
    }

    /// Flips the theme and stores the choice.
    ///
    /// The in-memory theme flips even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Preferences`] if the choice cannot be stored.
    pub fn toggle(&mut self) -> Result<Theme, FeedError> {
        self.current = self.current.toggled();
        self.prefs.set(THEME_KEY, self.current.as_str())?;
        Ok(self.current)
    }

    /// Follows a system color scheme change unless the user chose a theme.
    pub fn on_system_change(&mut self, prefers_dark: bool) -> Theme {
        if !self.has_explicit_preference() {
            self.current = Theme::from_system(prefers_dark);
        }
        self.current
    }
}

fn stored_theme<P: PreferenceStore>(prefs: &P) -> Option<Theme> {
    let raw = prefs.get(THEME_KEY)?;
    match raw.parse() {
        Ok(theme) => Some(theme),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring stored theme");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::ui::preferences::{FilePreferences, MemoryPreferences};

    #[test]
    fn unset_follows_system() {
        let ctl = ThemeController::init(MemoryPreferences::new(), true);
        assert_eq!(ctl.current(), Theme::Dark);
        let ctl = ThemeController::init(MemoryPreferences::new(), false);
        assert_eq!(ctl.current(), Theme::Light);
    }

    #[test]
    fn stored_beats_system() {
        let mut prefs = MemoryPreferences::new();
        assert!(prefs.set(THEME_KEY, "light").is_ok());
        let ctl = ThemeController::init(prefs, true);
        assert_eq!(ctl.current(), Theme::Light);
    }

    #[test]
    fn garbage_stored_value_falls_back() {
        let mut prefs = MemoryPreferences::new();
        assert!(prefs.set(THEME_KEY, "sepia").is_ok());
        let ctl = ThemeController::init(prefs, true);
        assert_eq!(ctl.current(), Theme::Dark);
        assert!(!ctl.has_explicit_preference());
    }

    #[test]
    fn system_changes_followed_until_toggle() {
        let mut ctl = ThemeController::init(MemoryPreferences::new(), false);
        assert_eq!(ctl.on_system_change(true), Theme::Dark);
        assert_eq!(ctl.on_system_change(false), Theme::Light);

        let Ok(theme) = ctl.toggle() else {
            panic!("toggle");
        };
        assert_eq!(theme, Theme::Dark);
        assert_eq!(ctl.on_system_change(false), Theme::Dark);
    }

    #[test]
    fn explicit_light_survives_reload() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("prefs.json");

        // OS reports dark, nothing stored.
        let mut ctl = ThemeController::init(FilePreferences::open(&path), true);
        assert_eq!(ctl.current(), Theme::Dark);
        let Ok(Theme::Light) = ctl.toggle() else {
            panic!("expected light");
        };

        // Reload while the OS still says dark.
        let mut reloaded = ThemeController::init(FilePreferences::open(&path), true);
        assert_eq!(reloaded.current(), Theme::Light);
        assert_eq!(reloaded.on_system_change(true), Theme::Light);
    }

    #[test]
    fn colorfgbg_parsing() {
        assert!(colorfgbg_is_dark("15;0"));
        assert!(colorfgbg_is_dark("15;default;0"));
        assert!(!colorfgbg_is_dark("0;15"));
        assert!(!colorfgbg_is_dark("garbage"));
    }

    #[test]
    fn theme_string_forms() {
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert!("Dark".parse::<Theme>().is_err());
    }
}
