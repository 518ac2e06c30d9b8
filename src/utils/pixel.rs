use std::{fmt::Display, str::FromStr};

use crate::error::QuantizeError;

/// 8 bit per channel RGB color.
///
/// Equality and hashing are by value, so two pixels with the same
/// channels are the same color for every lookup in the crate.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    #[inline]
    pub fn from_u8_array([r, g, b]: [u8; 3]) -> Color {
        Color::new(r, g, b)
    }

    #[inline]
    pub fn to_u8_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channels packed into one integer, red being the most significant byte.
    ///
    /// > r * 65536 + g * 256 + b
    #[inline]
    pub const fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Hue angle in whole degrees, `[0, 360)`.
    ///
    /// Computed like the HSB model: the hue sector is picked by the largest
    /// channel and refined by the spread of the other two. Grays (no chroma)
    /// report 0. The fractional part is truncated.
    pub fn hue(self) -> u16 {
        let (r, g, b) = (self.r as i32, self.g as i32, self.b as i32);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta == 0 {
            return 0;
        }

        // degrees * delta, kept integral so pure hues land exactly on 0/120/240
        let scaled = if r == max {
            60 * (g - b)
        } else if g == max {
            120 * delta + 60 * (b - r)
        } else {
            240 * delta + 60 * (r - g)
        };

        (scaled.rem_euclid(360 * delta) / delta) as u16
    }

    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(value: image::Rgb<u8>) -> Self {
        Color::from_u8_array(value.0)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(value: Color) -> Self {
        image::Rgb(value.to_u8_array())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Parses `RRGGBB`, with or without a leading `#`, either case.
impl FromStr for Color {
    type Err = QuantizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(QuantizeError::invalid(format!(
                "expected a RRGGBB hex color, got {s:?}"
            )));
        }
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .map_err(|e| QuantizeError::invalid(format!("bad hex color {s:?}: {e}")))
        };
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}
