//! Light/dark theme preference and the colours each theme paints with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// The persisted display mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            ThemePreference::Dark
        } else {
            ThemePreference::Light
        }
    }

    /// The opposite theme.
    pub fn toggle(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemePreference::Dark
    }

    /// The literal value written to the preference store.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemePreference::Light => Palette {
                background: Rgba::rgb(238, 241, 248),
                foreground: Rgba::rgb(30, 41, 59),
                accent: Rgba::rgb(79, 70, 229),
                muted: Rgba::rgb(100, 116, 139),
                sparkle: Rgba::rgba(79, 70, 229, 0.8),
            },
            ThemePreference::Dark => Palette {
                background: Rgba::rgb(11, 15, 30),
                foreground: Rgba::rgb(226, 232, 240),
                accent: Rgba::rgb(129, 140, 248),
                muted: Rgba::rgb(100, 116, 139),
                sparkle: Rgba::rgba(255, 255, 255, 0.8),
            },
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored theme value that is neither `"light"` nor `"dark"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme {0:?}, expected \"light\" or \"dark\"")]
pub struct ParseThemeError(pub String);

impl FromStr for ThemePreference {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Colours used to paint a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub foreground: Rgba,
    pub accent: Rgba,
    pub muted: Rgba,
    /// Fill used for canvas sparkles.
    pub sparkle: Rgba,
}
