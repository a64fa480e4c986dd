//! Color values with RGB and HSL views.
//!
//! Channels are stored as normalized floats so mixing and HSL round trips
//! don't lose precision until a color is printed as hex.

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use palette::color_difference::Wcag21RelativeContrast;
use palette::{FromColor, Mix, Srgb};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod parser;

type SrgbHsl = palette::Hsl<palette::encoding::Srgb, f64>;

/// An opaque color with red, green and blue channels in `0.0..=1.0`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    rgb: Srgb<f64>,
}

/// The hue/saturation/lightness view of a [`Color`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, `0.0..360.0`.
    pub hue: f64,
    /// Saturation, `0.0..=1.0`.
    pub saturation: f64,
    /// Lightness, `0.0..=1.0`.
    pub lightness: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("unrecognized color: {0:?}")]
    Unrecognized(String),
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("invalid color component {component:?} in {input:?}")]
    InvalidComponent { input: String, component: String },
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0).min(1.0)
    }
}

impl Color {
    pub const BLACK: Color = Color {
        rgb: Srgb::new(0.0, 0.0, 0.0),
    };

    pub const WHITE: Color = Color {
        rgb: Srgb::new(1.0, 1.0, 1.0),
    };

    /// Build a color from normalized channels. Values are clamped to `0.0..=1.0`.
    pub fn new(red: f64, green: f64, blue: f64) -> Color {
        Color {
            rgb: Srgb::new(clamp_unit(red), clamp_unit(green), clamp_unit(blue)),
        }
    }

    fn from_srgb(rgb: Srgb<f64>) -> Color {
        Color::new(rgb.red, rgb.green, rgb.blue)
    }

    /// Build a color from 8-bit style channels (`0.0..=255.0`).
    pub fn from_rgb255(red: f64, green: f64, blue: f64) -> Color {
        Color::new(red / 255.0, green / 255.0, blue / 255.0)
    }

    /// A neutral gray with the given lightness.
    pub fn gray(lightness: f64) -> Color {
        let level = clamp_unit(lightness);
        Color::new(level, level, level)
    }

    pub fn red(&self) -> f64 {
        self.rgb.red
    }

    pub fn green(&self) -> f64 {
        self.rgb.green
    }

    pub fn blue(&self) -> f64 {
        self.rgb.blue
    }

    /// Channels scaled to `0.0..=255.0`, unrounded.
    pub fn rgb255(&self) -> [f64; 3] {
        [self.rgb.red * 255.0, self.rgb.green * 255.0, self.rgb.blue * 255.0]
    }

    /// Mix toward `other`. A fraction of 0 yields `self`, 1 yields `other`.
    pub fn mix(&self, other: &Color, fraction: f64) -> Color {
        Color::from_srgb(self.rgb.mix(other.rgb, clamp_unit(fraction)))
    }

    /// WCAG 2.1 relative luminance in `0.0..=1.0`.
    pub fn luminosity(&self) -> f64 {
        clamp_unit(self.rgb.relative_luminance().luma)
    }

    pub fn to_hsl(&self) -> Hsl {
        let hsl = SrgbHsl::from_color(self.rgb);
        Hsl {
            hue: hsl.hue.into_positive_degrees(),
            saturation: clamp_unit(hsl.saturation),
            lightness: clamp_unit(hsl.lightness),
        }
    }

    pub fn from_hsl(hsl: Hsl) -> Color {
        let saturation = clamp_unit(hsl.saturation);
        let lightness = clamp_unit(hsl.lightness);
        // No hue to speak of.
        if saturation == 0.0 || !hsl.hue.is_finite() {
            return Color::gray(lightness);
        }

        let hsl = SrgbHsl::new(hsl.hue, saturation, lightness);
        Color::from_srgb(Srgb::from_color(hsl))
    }

    /// Same hue and saturation, different lightness.
    pub fn with_lightness(&self, lightness: f64) -> Color {
        Color::from_hsl(Hsl {
            lightness,
            ..self.to_hsl()
        })
    }

    /// Uppercase `#RRGGBB` with rounded channels.
    pub fn to_hex(&self) -> String {
        let [red, green, blue] = self.rgb255();
        format!(
            "#{:02X}{:02X}{:02X}",
            red.round() as u8,
            green.round() as u8,
            blue.round() as u8
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Color, ColorError> {
        parser::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Color, ColorError> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_hex()
    }
}
