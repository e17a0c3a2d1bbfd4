//! Initial-state reconciliation.
//!
//! Three sources can describe a user's appearance: the remote profile row
//! (only when a session exists), the device-local cache, and the OS
//! preference. [`resolve_initial_state`] folds them into one
//! [`AppearanceState`] with a strict priority order:
//!
//! ```text
//! resolve_initial_state
//! ├── session
//! │   ├── remote profile row  → used when the row was read
//! │   └── defaults            → the row could not be read; cache not consulted
//! └── no session
//!     ├── local cache         → per-field, only recognized values
//!     └── defaults            → lavender / system
//!
//! OS preference resolves is_dark whenever the mode is system.
//! ```
//!
//! The function is pure: fetching the row and reading the cache is the
//! caller's job, which keeps every branch testable without I/O.

use std::fmt;

use serde::Serialize;

use crate::env::{LocalCache, ProfileAppearance, COLOR_MODE_KEY, THEME_KEY};
use crate::{AppearanceState, ColorMode, WellnessTheme};

/// Opaque identity of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user.
    pub user: UserId,
}

impl Session {
    /// Creates a session for the given user.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: UserId::new(user),
        }
    }
}

/// Raw values read from the local cache.
///
/// Values are kept as strings so that unrecognized entries can be ignored
/// field by field during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedAppearance {
    /// The `wellness_theme` slot.
    pub theme: Option<String>,
    /// The `color_mode` slot.
    pub color_mode: Option<String>,
}

impl CachedAppearance {
    /// Reads both slots from a cache.
    pub fn read<C: LocalCache + ?Sized>(cache: &C) -> Self {
        Self {
            theme: cache.get(THEME_KEY),
            color_mode: cache.get(COLOR_MODE_KEY),
        }
    }

    fn recognized_theme(&self) -> Option<WellnessTheme> {
        self.theme.as_deref().and_then(WellnessTheme::from_stored)
    }

    fn recognized_mode(&self) -> Option<ColorMode> {
        self.color_mode.as_deref().and_then(ColorMode::from_stored)
    }
}

/// Which source supplied the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppearanceSourceKind {
    /// The remote profile row of the signed-in user.
    Remote,
    /// The device-local cache.
    LocalCache,
    /// Built-in defaults.
    Default,
}

impl fmt::Display for AppearanceSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote profile"),
            Self::LocalCache => write!(f, "local cache"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// The outcome of reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedAppearance {
    /// The reconciled state.
    pub state: AppearanceState,
    /// Which source supplied it.
    pub source: AppearanceSourceKind,
}

/// Reconciles the initial appearance from every available source.
///
/// - With a session and a `remote` row, the row wins. An absent or
///   unrecognized `wellness_theme` falls back to the default theme, and the
///   mode is `dark` when `is_dark_mode` is true, `light` otherwise. This path
///   never yields [`ColorMode::System`] because the row only stores the
///   resolved flag.
/// - With a session but no readable row, defaults apply. The local cache
///   belongs to the signed-out path and is not consulted.
/// - Without a session each cache slot is applied when it holds a
///   recognized value; unset or unrecognized slots keep their defaults.
///
/// `is_dark` is then resolved from the mode, consulting `os_prefers_dark`
/// only for `system`.
pub fn resolve_initial_state(
    session: Option<&Session>,
    remote: Option<&ProfileAppearance>,
    local: &CachedAppearance,
    os_prefers_dark: bool,
) -> ResolvedAppearance {
    if session.is_some() {
        let Some(row) = remote else {
            return ResolvedAppearance {
                state: AppearanceState::resolved(
                    WellnessTheme::default(),
                    ColorMode::default(),
                    os_prefers_dark,
                ),
                source: AppearanceSourceKind::Default,
            };
        };
        let theme = row
            .wellness_theme
            .as_deref()
            .and_then(WellnessTheme::from_stored)
            .unwrap_or_default();
        let mode = ColorMode::explicit(row.is_dark_mode.unwrap_or(false));
        return ResolvedAppearance {
            state: AppearanceState::resolved(theme, mode, os_prefers_dark),
            source: AppearanceSourceKind::Remote,
        };
    }

    let theme = local.recognized_theme();
    let mode = local.recognized_mode();
    let source = if theme.is_some() || mode.is_some() {
        AppearanceSourceKind::LocalCache
    } else {
        AppearanceSourceKind::Default
    };

    ResolvedAppearance {
        state: AppearanceState::resolved(
            theme.unwrap_or_default(),
            mode.unwrap_or_default(),
            os_prefers_dark,
        ),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(theme: Option<&str>, dark: Option<bool>) -> ProfileAppearance {
        ProfileAppearance {
            wellness_theme: theme.map(String::from),
            is_dark_mode: dark,
        }
    }

    fn cached(theme: Option<&str>, mode: Option<&str>) -> CachedAppearance {
        CachedAppearance {
            theme: theme.map(String::from),
            color_mode: mode.map(String::from),
        }
    }

    #[test]
    fn remote_row_wins_with_session() {
        let session = Session::new("u1");
        let resolved = resolve_initial_state(
            Some(&session),
            Some(&row(Some("ocean"), Some(true))),
            &cached(Some("forest"), Some("light")),
            false,
        );
        assert_eq!(resolved.source, AppearanceSourceKind::Remote);
        assert_eq!(resolved.state.theme, WellnessTheme::Ocean);
        assert_eq!(resolved.state.color_mode, ColorMode::Dark);
        assert!(resolved.state.is_dark);
    }

    #[test]
    fn remote_false_flag_means_light_even_if_os_is_dark() {
        let session = Session::new("u1");
        let resolved = resolve_initial_state(
            Some(&session),
            Some(&row(Some("sunset"), Some(false))),
            &CachedAppearance::default(),
            true,
        );
        assert_eq!(resolved.state.color_mode, ColorMode::Light);
        assert!(!resolved.state.is_dark);
    }

    #[test]
    fn remote_unrecognized_theme_falls_back_to_default() {
        let session = Session::new("u1");
        let resolved = resolve_initial_state(
            Some(&session),
            Some(&row(Some("neon"), None)),
            &cached(Some("forest"), None),
            false,
        );
        assert_eq!(resolved.state.theme, WellnessTheme::Lavender);
        assert_eq!(resolved.state.color_mode, ColorMode::Light);
    }

    #[test]
    fn missing_row_with_session_uses_defaults_not_cache() {
        let session = Session::new("u1");
        let resolved = resolve_initial_state(
            Some(&session),
            None,
            &cached(Some("moonlight"), Some("dark")),
            false,
        );
        assert_eq!(resolved.source, AppearanceSourceKind::Default);
        assert_eq!(resolved.state.theme, WellnessTheme::Lavender);
        assert_eq!(resolved.state.color_mode, ColorMode::System);
        assert!(!resolved.state.is_dark);
    }

    #[test]
    fn missing_row_with_session_follows_os_in_default_mode() {
        let session = Session::new("u1");
        let resolved =
            resolve_initial_state(Some(&session), None, &CachedAppearance::default(), true);
        assert_eq!(resolved.source, AppearanceSourceKind::Default);
        assert!(resolved.state.is_dark);
    }

    #[test]
    fn row_is_ignored_without_session() {
        let resolved = resolve_initial_state(
            None,
            Some(&row(Some("ocean"), Some(true))),
            &CachedAppearance::default(),
            false,
        );
        assert_eq!(resolved.source, AppearanceSourceKind::Default);
        assert_eq!(resolved.state, AppearanceState::default());
    }

    #[test]
    fn local_cache_with_system_mode_follows_os() {
        let resolved =
            resolve_initial_state(None, None, &cached(Some("forest"), Some("system")), true);
        assert_eq!(resolved.state.theme, WellnessTheme::Forest);
        assert_eq!(resolved.state.color_mode, ColorMode::System);
        assert!(resolved.state.is_dark);
    }

    #[test]
    fn unrecognized_cache_slots_keep_defaults_independently() {
        let resolved = resolve_initial_state(None, None, &cached(Some("neon"), Some("dark")), false);
        assert_eq!(resolved.source, AppearanceSourceKind::LocalCache);
        assert_eq!(resolved.state.theme, WellnessTheme::Lavender);
        assert_eq!(resolved.state.color_mode, ColorMode::Dark);

        let resolved = resolve_initial_state(None, None, &cached(None, Some("auto")), false);
        assert_eq!(resolved.source, AppearanceSourceKind::Default);
        assert_eq!(resolved.state.color_mode, ColorMode::System);
    }

    #[test]
    fn source_kind_display() {
        assert_eq!(AppearanceSourceKind::Remote.to_string(), "remote profile");
        assert_eq!(AppearanceSourceKind::LocalCache.to_string(), "local cache");
        assert_eq!(AppearanceSourceKind::Default.to_string(), "default");
    }
}
