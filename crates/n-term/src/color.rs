// SPDX-License-Identifier: MIT
//
// The 16-color terminal palette.
//
// A prompt paints into whatever theme the user's terminal already has, so
// colors are named slots of the standard ANSI-16 palette rather than RGB
// values. `Default` inherits the terminal's own foreground or background.
//
// The slot names follow the classic VGA naming: the eight "dark" colors are
// SGR 30-37 / 40-47, the eight bright ones are SGR 90-97 / 100-107.

use std::fmt;
use std::str::FromStr;

// ─── Color ───────────────────────────────────────────────────────────────────

/// One slot of the terminal's 16-color palette, or its default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (SGR 39 / 49).
    #[default]
    Default,
    Black,
    DarkRed,
    DarkGreen,
    Brown,
    DarkBlue,
    Purple,
    Cyan,
    LightGray,
    DarkGray,
    Red,
    Green,
    Yellow,
    Blue,
    Fuchsia,
    Turquoise,
    White,
}

/// Every color in palette order, `Default` first.
pub const ALL: [Color; 17] = [
    Color::Default,
    Color::Black,
    Color::DarkRed,
    Color::DarkGreen,
    Color::Brown,
    Color::DarkBlue,
    Color::Purple,
    Color::Cyan,
    Color::LightGray,
    Color::DarkGray,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Fuchsia,
    Color::Turquoise,
    Color::White,
];

impl Color {
    /// SGR parameter selecting this color as the foreground.
    #[must_use]
    pub const fn fg_code(self) -> u8 {
        match self {
            Self::Default => 39,
            Self::Black => 30,
            Self::DarkRed => 31,
            Self::DarkGreen => 32,
            Self::Brown => 33,
            Self::DarkBlue => 34,
            Self::Purple => 35,
            Self::Cyan => 36,
            Self::LightGray => 37,
            Self::DarkGray => 90,
            Self::Red => 91,
            Self::Green => 92,
            Self::Yellow => 93,
            Self::Blue => 94,
            Self::Fuchsia => 95,
            Self::Turquoise => 96,
            Self::White => 97,
        }
    }

    /// SGR parameter selecting this color as the background.
    ///
    /// Always the foreground code plus ten.
    #[must_use]
    pub const fn bg_code(self) -> u8 {
        self.fg_code() + 10
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Black => "black",
            Self::DarkRed => "dark-red",
            Self::DarkGreen => "dark-green",
            Self::Brown => "brown",
            Self::DarkBlue => "dark-blue",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
            Self::LightGray => "light-gray",
            Self::DarkGray => "dark-gray",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Fuchsia => "fuchsia",
            Self::Turquoise => "turquoise",
            Self::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a color name is not in the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColor(pub String);

impl fmt::Display for UnknownColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color '{}'", self.0)
    }
}

impl std::error::Error for UnknownColor {}

impl FromStr for Color {
    type Err = UnknownColor;

    /// Parse a color name. Case, `-`, `_` and spaces are ignored, so
    /// `"DarkRed"`, `"dark_red"` and `"dark-red"` all name the same slot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        ALL.iter()
            .copied()
            .find(|c| c.name().replace('-', "") == folded)
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
