//! Display colors.
//!
//! Colors render to CSS color strings so the presentation layer can hand
//! them straight to a canvas or chart library.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A display color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum Color {
    /// 8-bit RGB, rendered as `#RRGGBB`.
    Rgb { r: u8, g: u8, b: u8 },
    /// HSL with hue in degrees [0, 360), rendered as `hsl(h, s%, l%)`.
    Hsl {
        hue: u16,
        saturation: u8,
        lightness: u8,
    },
    /// HSL with alpha in [0, 1], rendered as `hsla(h, s%, l%, a)`.
    Hsla {
        hue: u16,
        saturation: u8,
        lightness: u8,
        alpha: f32,
    },
    /// RGB with alpha in [0, 1], rendered as `rgba(r, g, b, a)`.
    Rgba { r: u8, g: u8, b: u8, alpha: f32 },
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self::Rgb {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// HSL color; the hue wraps into [0, 360).
    pub fn hsl(hue: i64, saturation: u8, lightness: u8) -> Self {
        Self::Hsl {
            hue: hue.rem_euclid(360) as u16,
            saturation,
            lightness,
        }
    }

    /// HSLA color; the hue wraps into [0, 360) and alpha is clamped to [0, 1].
    pub fn hsla(hue: i64, saturation: u8, lightness: u8, alpha: f32) -> Self {
        Self::Hsla {
            hue: hue.rem_euclid(360) as u16,
            saturation,
            lightness,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self::Rgba {
            r,
            g,
            b,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Same color with a different alpha.
    ///
    /// Opaque variants gain an alpha channel.
    pub fn with_alpha(self, alpha: f32) -> Self {
        match self {
            Self::Rgb { r, g, b } | Self::Rgba { r, g, b, .. } => Self::rgba(r, g, b, alpha),
            Self::Hsl {
                hue,
                saturation,
                lightness,
            }
            | Self::Hsla {
                hue,
                saturation,
                lightness,
                ..
            } => Self::hsla(hue as i64, saturation, lightness, alpha),
        }
    }

    /// The CSS color string.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Self::Hsl {
                hue,
                saturation,
                lightness,
            } => write!(f, "hsl({}, {}%, {}%)", hue, saturation, lightness),
            Self::Hsla {
                hue,
                saturation,
                lightness,
                alpha,
            } => write!(f, "hsla({}, {}%, {}%, {})", hue, saturation, lightness, alpha),
            Self::Rgba { r, g, b, alpha } => write!(f, "rgba({}, {}, {}, {})", r, g, b, alpha),
        }
    }
}
