//! The in-memory appearance state.

use serde::Serialize;

use crate::{ColorMode, WellnessTheme};

/// The values every visual consumer reads.
///
/// `is_dark` is derived from `color_mode` (and the OS preference for
/// [`ColorMode::System`]); it is never persisted as the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AppearanceState {
    /// The active wellness theme.
    pub theme: WellnessTheme,
    /// The user's chosen color mode.
    pub color_mode: ColorMode,
    /// The resolved dark flag.
    pub is_dark: bool,
}

impl AppearanceState {
    /// Builds a state, resolving the dark flag from the given OS preference.
    pub fn resolved(theme: WellnessTheme, color_mode: ColorMode, os_prefers_dark: bool) -> Self {
        Self {
            theme,
            color_mode,
            is_dark: color_mode.resolve(os_prefers_dark),
        }
    }

    /// The presentation scheme name, `"dark"` or `"light"`.
    pub fn scheme(&self) -> &'static str {
        if self.is_dark {
            "dark"
        } else {
            "light"
        }
    }
}
