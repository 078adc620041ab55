//! Wavelength to display color
//!
//! Coarse visible-spectrum bands; the renderer only needs a stable hue per ray.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 8-bit RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const VIOLET: Color = Color::rgb(0x8b, 0x00, 0xff);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xff);
    pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const ORANGE: Color = Color::rgb(0xff, 0x7f, 0x00);
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Returned when a string is not `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{0}', expected #rrggbb")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(err)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Display color for a wavelength in nanometers
pub fn wavelength_to_color(wavelength: f64) -> Color {
    match wavelength {
        w if w < 450.0 => Color::VIOLET,
        w if w < 495.0 => Color::BLUE,
        w if w < 570.0 => Color::GREEN,
        w if w < 590.0 => Color::YELLOW,
        w if w < 620.0 => Color::ORANGE,
        _ => Color::RED,
    }
}
