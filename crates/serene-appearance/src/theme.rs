//! Wellness themes and their catalog entries.
//!
//! The set of themes is closed: every value that reaches the reconciler's
//! state is one of the [`WellnessTheme`] variants. Raw strings (from the
//! profile row, the local cache, or the command line) go through
//! [`FromStr`](std::str::FromStr), which rejects anything else.
//!
//! Each theme also carries presentation metadata ([`ThemeInfo`]) used by
//! selectors and previews: a display name, a short description, an icon and
//! a two-stop accent gradient.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppearanceError;

/// An RGB color triplet.
pub type Rgb = (u8, u8, u8);

/// The wellness color theme applied across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellnessTheme {
    /// Peaceful purple hues.
    #[default]
    Lavender,
    /// Tranquil blue waves.
    Ocean,
    /// Warm orange glow.
    Sunset,
    /// Natural green calm.
    Forest,
    /// Soft silver tones.
    Moonlight,
}

impl WellnessTheme {
    /// Every theme, in catalog order. The first entry is the default.
    pub const ALL: [WellnessTheme; 5] = [
        WellnessTheme::Lavender,
        WellnessTheme::Ocean,
        WellnessTheme::Sunset,
        WellnessTheme::Forest,
        WellnessTheme::Moonlight,
    ];

    /// The identifier stored in the profile row and the local cache.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lavender => "lavender",
            Self::Ocean => "ocean",
            Self::Sunset => "sunset",
            Self::Forest => "forest",
            Self::Moonlight => "moonlight",
        }
    }

    /// Parses a stored identifier, returning `None` when it is not a theme.
    ///
    /// Stored values are matched exactly; they are written by this crate and
    /// never need case folding.
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Catalog metadata for this theme.
    pub fn info(self) -> &'static ThemeInfo {
        match self {
            Self::Lavender => &CATALOG[0],
            Self::Ocean => &CATALOG[1],
            Self::Sunset => &CATALOG[2],
            Self::Forest => &CATALOG[3],
            Self::Moonlight => &CATALOG[4],
        }
    }
}

impl fmt::Display for WellnessTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WellnessTheme {
    type Err = AppearanceError;

    /// Parses user input. Surrounding whitespace and case are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::from_stored(&normalized).ok_or_else(|| AppearanceError::UnknownTheme(s.to_string()))
    }
}

/// Presentation metadata for a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeInfo {
    /// The theme this entry describes.
    pub theme: WellnessTheme,
    /// Display name, e.g. "Ocean Serenity".
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Icon glyph shown next to the name.
    pub icon: &'static str,
    /// Accent gradient start.
    pub gradient_from: Rgb,
    /// Accent gradient end.
    pub gradient_to: Rgb,
}

impl ThemeInfo {
    /// Formats a color as `#rrggbb`.
    pub fn hex((r, g, b): Rgb) -> String {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

static CATALOG: [ThemeInfo; 5] = [
    ThemeInfo {
        theme: WellnessTheme::Lavender,
        name: "Lavender Calm",
        description: "Peaceful purple hues",
        icon: "🌸",
        gradient_from: (0xc0, 0x84, 0xfc),
        gradient_to: (0xec, 0x48, 0x99),
    },
    ThemeInfo {
        theme: WellnessTheme::Ocean,
        name: "Ocean Serenity",
        description: "Tranquil blue waves",
        icon: "🌊",
        gradient_from: (0x22, 0xd3, 0xee),
        gradient_to: (0x3b, 0x82, 0xf6),
    },
    ThemeInfo {
        theme: WellnessTheme::Sunset,
        name: "Sunset Warmth",
        description: "Warm orange glow",
        icon: "🌅",
        gradient_from: (0xfb, 0x92, 0x3c),
        gradient_to: (0xef, 0x44, 0x44),
    },
    ThemeInfo {
        theme: WellnessTheme::Forest,
        name: "Forest Peace",
        description: "Natural green calm",
        icon: "🌲",
        gradient_from: (0x4a, 0xde, 0x80),
        gradient_to: (0x10, 0xb9, 0x81),
    },
    ThemeInfo {
        theme: WellnessTheme::Moonlight,
        name: "Moonlight Dreams",
        description: "Soft silver tones",
        icon: "🌙",
        gradient_from: (0x94, 0xa3, 0xb8),
        gradient_to: (0x4b, 0x55, 0x63),
    },
];

/// The full theme catalog, in selector order.
pub fn catalog() -> &'static [ThemeInfo] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_catalog_entry() {
        assert_eq!(WellnessTheme::default(), WellnessTheme::ALL[0]);
        assert_eq!(catalog()[0].theme, WellnessTheme::default());
    }

    #[test]
    fn catalog_entries_match_their_theme() {
        for theme in WellnessTheme::ALL {
            assert_eq!(theme.info().theme, theme);
        }
    }

    #[test]
    fn parse_is_lenient_on_case_and_whitespace() {
        assert_eq!(" Ocean ".parse::<WellnessTheme>(), Ok(WellnessTheme::Ocean));
        assert_eq!("FOREST".parse::<WellnessTheme>(), Ok(WellnessTheme::Forest));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "neon".parse::<WellnessTheme>(),
            Err(AppearanceError::UnknownTheme("neon".into()))
        );
    }

    #[test]
    fn stored_values_are_exact() {
        assert_eq!(WellnessTheme::from_stored("sunset"), Some(WellnessTheme::Sunset));
        assert_eq!(WellnessTheme::from_stored("Sunset"), None);
        assert_eq!(WellnessTheme::from_stored(""), None);
    }

    #[test]
    fn serde_uses_stored_identifiers() {
        let json = serde_json::to_string(&WellnessTheme::Moonlight).unwrap();
        assert_eq!(json, "\"moonlight\"");
        let back: WellnessTheme = serde_json::from_str("\"lavender\"").unwrap();
        assert_eq!(back, WellnessTheme::Lavender);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(ThemeInfo::hex(WellnessTheme::Ocean.info().gradient_to), "#3b82f6");
    }
}
