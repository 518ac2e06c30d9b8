use std::{fmt::Display, str::FromStr};

use multiversion::multiversion;

use crate::{error::QuantizeError, utils::pixel::Color};

/// Dissimilarity between two colors.
///
/// Implementations must be pure, symmetric and never negative. The engine
/// shares one metric between rayon workers, hence `Send + Sync`.
pub trait DistanceMetric: Send + Sync {
    fn distance(&self, a: Color, b: Color) -> f64;

    /// `out[i] = distance(colors[i], target)`.
    ///
    /// `out` must be as long as `colors`. Overrides must agree exactly with
    /// [DistanceMetric::distance].
    fn distances_to(&self, target: Color, colors: &[Color], out: &mut [f64]) {
        debug_assert_eq!(colors.len(), out.len());
        out.iter_mut()
            .zip(colors.iter())
            .for_each(|(d, color)| *d = self.distance(*color, target));
    }
}

/// `(r1-r2)^2 + (g1-g2)^2 + (b1-b2)^2`, range `[0, 3 * 255^2]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl DistanceMetric for SquaredEuclidean {
    #[inline]
    fn distance(&self, a: Color, b: Color) -> f64 {
        let dr = a.r as i32 - b.r as i32;
        let dg = a.g as i32 - b.g as i32;
        let db = a.b as i32 - b.b as i32;
        (dr * dr + dg * dg + db * db) as f64
    }

    #[inline]
    fn distances_to(&self, target: Color, colors: &[Color], out: &mut [f64]) {
        debug_assert_eq!(colors.len(), out.len());
        squared_distances(target, colors, out);
    }
}

#[multiversion(targets("x86_64+avx512f", "x86_64+avx2", "x86_64+sse2"))]
fn squared_distances(target: Color, colors: &[Color], out: &mut [f64]) {
    let (tr, tg, tb) = (target.r as i32, target.g as i32, target.b as i32);
    out.iter_mut().zip(colors.iter()).for_each(|(d, color)| {
        let dr = color.r as i32 - tr;
        let dg = color.g as i32 - tg;
        let db = color.b as i32 - tb;
        *d = (dr * dr + dg * dg + db * db) as f64;
    });
}

/// Shortest way around the hue circle, range `[0, 180]`.
///
/// Only hue is compared: a dark and a light red are at distance 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircularHue;

impl CircularHue {
    #[inline]
    pub fn hue_distance(h1: u16, h2: u16) -> u16 {
        let d = h1.abs_diff(h2);
        d.min(360 - d)
    }
}

impl DistanceMetric for CircularHue {
    #[inline]
    fn distance(&self, a: Color, b: Color) -> f64 {
        CircularHue::hue_distance(a.hue(), b.hue()) as f64
    }
}

/// Named metric selection, used by configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    SquaredEuclidean,
    CircularHue,
}

impl DistanceMetric for Metric {
    #[inline]
    fn distance(&self, a: Color, b: Color) -> f64 {
        match self {
            Metric::SquaredEuclidean => SquaredEuclidean.distance(a, b),
            Metric::CircularHue => CircularHue.distance(a, b),
        }
    }

    #[inline]
    fn distances_to(&self, target: Color, colors: &[Color], out: &mut [f64]) {
        match self {
            Metric::SquaredEuclidean => SquaredEuclidean.distances_to(target, colors, out),
            Metric::CircularHue => CircularHue.distances_to(target, colors, out),
        }
    }
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::SquaredEuclidean => "euclidean",
            Metric::CircularHue => "circular_hue",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = QuantizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" | "squared_euclidean" => Ok(Metric::SquaredEuclidean),
            "circular_hue" | "hue" => Ok(Metric::CircularHue),
            _ => Err(QuantizeError::Config(format!("Not recognized metric {s:?}"))),
        }
    }
}
