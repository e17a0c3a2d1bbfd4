//! The three-way color mode and its resolution to a dark flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppearanceError;

/// The user's chosen color mode.
///
/// `Light` and `Dark` are explicit choices. `System` follows the OS
/// preference and is resolved to a dark flag at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light background, dark text.
    Light,
    /// Dark background, light text.
    Dark,
    /// Follow the OS preference.
    #[default]
    System,
}

impl ColorMode {
    /// Every mode, in selector order.
    pub const ALL: [ColorMode; 3] = [ColorMode::Light, ColorMode::System, ColorMode::Dark];

    /// The identifier stored in the local cache.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Parses a stored identifier, returning `None` when it is not a mode.
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// The explicit mode matching a resolved dark flag.
    pub fn explicit(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Resolves this mode to a dark flag given the OS preference.
    ///
    /// The OS reading is only consulted for [`ColorMode::System`].
    pub fn resolve(self, os_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => os_prefers_dark,
        }
    }

    /// Whether this mode follows the OS preference.
    pub fn follows_os(self) -> bool {
        self == Self::System
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = AppearanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::from_stored(&normalized).ok_or_else(|| AppearanceError::UnknownColorMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_system() {
        assert_eq!(ColorMode::default(), ColorMode::System);
    }

    #[test]
    fn explicit_modes_ignore_os() {
        assert!(!ColorMode::Light.resolve(true));
        assert!(ColorMode::Dark.resolve(false));
    }

    #[test]
    fn system_follows_os() {
        assert!(ColorMode::System.resolve(true));
        assert!(!ColorMode::System.resolve(false));
    }

    #[test]
    fn explicit_never_yields_system() {
        assert_eq!(ColorMode::explicit(true), ColorMode::Dark);
        assert_eq!(ColorMode::explicit(false), ColorMode::Light);
    }

    #[test]
    fn parse_and_display() {
        for mode in ColorMode::ALL {
            assert_eq!(mode.to_string().parse::<ColorMode>(), Ok(mode));
        }
        assert_eq!(
            "auto".parse::<ColorMode>(),
            Err(AppearanceError::UnknownColorMode("auto".into()))
        );
    }
}
