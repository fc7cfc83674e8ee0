//! Waveform Color Palette
//!
//! A small closed set of named presets. Anything outside the set resolves to
//! the default preset instead of failing, so a stale or mistyped name from a
//! config file still produces a usable color.

use std::fmt;

use crate::error::RequestError;

/// An RGB display color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a color from channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a strict `#RRGGBB` hex string
    pub fn from_hex(hex: &str) -> Result<Self, RequestError> {
        let invalid = || RequestError::InvalidColor(hex.to_string());

        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase `#RRGGBB` form, as the generation service expects it
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ============================================================================
// Presets
// ============================================================================

/// Named waveform color presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Preset {
    /// `#00FF00`, the service's own default
    #[default]
    Green,
    /// `#00FFFF`
    Cyan,
    /// `#3B82F6`
    Blue,
    /// `#8B5CF6`
    Purple,
    /// `#EC4899`
    Pink,
    /// `#F97316`
    Orange,
    /// `#EF4444`
    Red,
    /// `#FFFFFF`
    White,
}

impl Preset {
    /// Every preset, in selector order
    pub const ALL: [Self; 8] = [
        Self::Green,
        Self::Cyan,
        Self::Blue,
        Self::Purple,
        Self::Pink,
        Self::Orange,
        Self::Red,
        Self::White,
    ];

    /// Preset name as typed by users
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Cyan => "cyan",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::White => "white",
        }
    }

    /// Concrete display color
    #[must_use]
    pub fn color(&self) -> Color {
        match self {
            Self::Green => Color::rgb(0x00, 0xFF, 0x00),
            Self::Cyan => Color::rgb(0x00, 0xFF, 0xFF),
            Self::Blue => Color::rgb(0x3B, 0x82, 0xF6),
            Self::Purple => Color::rgb(0x8B, 0x5C, 0xF6),
            Self::Pink => Color::rgb(0xEC, 0x48, 0x99),
            Self::Orange => Color::rgb(0xF9, 0x73, 0x16),
            Self::Red => Color::rgb(0xEF, 0x44, 0x44),
            Self::White => Color::rgb(0xFF, 0xFF, 0xFF),
        }
    }

    /// Look up a preset by name (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }

    /// Next preset in selector order, wrapping around
    #[must_use]
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a preset name to a color; unknown names give the default preset
#[must_use]
pub fn resolve(name: &str) -> Color {
    Preset::from_name(name).unwrap_or_default().color()
}

/// Accept either a raw `#RRGGBB` value or a preset name
pub fn resolve_or_hex(input: &str) -> Result<Color, RequestError> {
    let input = input.trim();
    if input.starts_with('#') {
        Color::from_hex(input)
    } else {
        Ok(resolve(input))
    }
}
