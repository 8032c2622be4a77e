//! Caption style options.
//!
//! The style set is a fixed product decision: six tones, where `Default` is a
//! sentinel meaning "no style constraint" and is never sent to the engine as
//! literal text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A named caption tone selectable by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    #[default]
    Default,
    Witty,
    Poetic,
    Casual,
    Professional,
    Bold,
}

/// All selectable styles, in display order.
pub const ALL_STYLES: &[CaptionStyle] = &[
    CaptionStyle::Default,
    CaptionStyle::Witty,
    CaptionStyle::Poetic,
    CaptionStyle::Casual,
    CaptionStyle::Professional,
    CaptionStyle::Bold,
];

impl CaptionStyle {
    /// Stable identifier used on the wire and in persisted settings.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Witty => "witty",
            Self::Poetic => "poetic",
            Self::Casual => "casual",
            Self::Professional => "professional",
            Self::Bold => "bold",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Witty => "Witty",
            Self::Poetic => "Poetic",
            Self::Casual => "Casual",
            Self::Professional => "Professional",
            Self::Bold => "Bold",
        }
    }

    /// The free-text hint passed to the caption engine.
    ///
    /// `Default` is the sentinel for "no style constraint" and maps to `None`;
    /// every other style passes its id through verbatim.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            other => Some(other.id()),
        }
    }
}

impl fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CaptionStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STYLES
            .iter()
            .copied()
            .find(|style| style.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::config(format!("Unknown caption style: {s:?}")))
    }
}
