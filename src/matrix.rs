use std::{collections::HashMap, sync::OnceLock};

use image::{
    ImageError, RgbImage,
    error::{LimitError, LimitErrorKind},
};
use itertools::Itertools;

use crate::{error::QuantizeError, utils::pixel::Color};

/// (width, height)
pub type MatrixShape = (usize, usize);

/// Distinct colors of a matrix in row-major first-occurrence order, each with
/// its pixel count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorHistogram {
    colors: Vec<Color>,
    weights: Vec<u64>,
}

impl ColorHistogram {
    pub fn from_pixels(pixels: &[Color]) -> Self {
        let mut slots: HashMap<Color, usize> = HashMap::new();
        let mut histogram = ColorHistogram::default();
        for pixel in pixels {
            let slot = *slots.entry(*pixel).or_insert_with(|| {
                histogram.colors.push(*pixel);
                histogram.weights.push(0);
                histogram.colors.len() - 1
            });
            histogram.weights[slot] += 1;
        }
        histogram
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Pixel count per entry of [ColorHistogram::colors].
    #[inline]
    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Rectangular, row-major grid of colors.
///
/// Dimensions are fixed at construction and never change; every transform
/// produces a new matrix of the same shape. The pixels are never mutated in
/// place, so the color histogram is built on first use and kept.
#[derive(Debug, Clone)]
pub struct PixelMatrix {
    width: usize,
    height: usize,
    buffer: Vec<Color>,
    histogram: OnceLock<ColorHistogram>,
}

impl PartialEq for PixelMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.buffer == other.buffer
    }
}

impl Eq for PixelMatrix {}

impl AsRef<[Color]> for PixelMatrix {
    #[inline]
    fn as_ref(&self) -> &[Color] {
        &self.buffer
    }
}

impl PixelMatrix {
    /// Wrap a row-major buffer.
    ///
    /// Fails when either side is zero or the buffer length does not match.
    pub fn from_vec(width: usize, height: usize, buffer: Vec<Color>) -> crate::error::Result<Self> {
        if width == 0 || height == 0 {
            return Err(QuantizeError::invalid(format!(
                "pixel matrix must not be empty, got {width}x{height}"
            )));
        }
        if buffer.len() != width * height {
            return Err(QuantizeError::invalid(format!(
                "buffer holds {} pixels, {width}x{height} needs {}",
                buffer.len(),
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            buffer,
            histogram: OnceLock::new(),
        })
    }

    /// Build from nested rows. All rows must share the first row's length.
    pub fn from_rows<R: AsRef<[Color]>>(rows: &[R]) -> crate::error::Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if let Some((idx, row)) = rows
            .iter()
            .find_position(|row| row.as_ref().len() != width)
        {
            return Err(QuantizeError::invalid(format!(
                "row {idx} has {} pixels, expected {width}",
                row.as_ref().len()
            )));
        }
        let buffer = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect_vec();
        Self::from_vec(width, height, buffer)
    }

    /// Matrix filled with a single color.
    pub fn filled(width: usize, height: usize, color: Color) -> crate::error::Result<Self> {
        Self::from_vec(width, height, vec![color; width * height])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn shape(&self) -> MatrixShape {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false, empty matrices can't be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.buffer[row * self.width + col])
    }

    /// Row slices, top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Color> {
        self.buffer.chunks_exact(self.width)
    }

    /// Color histogram, computed once per matrix.
    pub fn histogram(&self) -> &ColorHistogram {
        self.histogram.get_or_init(|| ColorHistogram::from_pixels(&self.buffer))
    }

    /// Every color present, once, in row-major first-occurrence order.
    #[inline]
    pub fn distinct_colors(&self) -> &[Color] {
        self.histogram().colors()
    }

    /// New matrix of the same shape with every pixel passed through `map`.
    pub fn try_map_colors<F>(&self, mut map: F) -> crate::error::Result<PixelMatrix>
    where
        F: FnMut(Color) -> crate::error::Result<Color>,
    {
        let buffer = self
            .buffer
            .iter()
            .map(|color| map(*color))
            .collect::<crate::error::Result<Vec<_>>>()?;
        Self::from_vec(self.width, self.height, buffer)
    }

    /// Fails with [QuantizeError::ImageEncode] when a side does not fit the
    /// `u32` dimensions of an image buffer.
    pub fn to_rgb_image(&self) -> crate::error::Result<RgbImage> {
        let width = image_dimension(self.width)?;
        let height = image_dimension(self.height)?;
        let raw_data = self
            .buffer
            .iter()
            .flat_map(|color| color.to_u8_array())
            .collect_vec();
        RgbImage::from_raw(width, height, raw_data).ok_or_else(dimension_error)
    }
}

fn image_dimension(side: usize) -> crate::error::Result<u32> {
    u32::try_from(side).map_err(|_| dimension_error())
}

fn dimension_error() -> QuantizeError {
    QuantizeError::ImageEncode(ImageError::Limits(LimitError::from_kind(
        LimitErrorKind::DimensionError,
    )))
}

impl TryFrom<&RgbImage> for PixelMatrix {
    type Error = QuantizeError;

    fn try_from(value: &RgbImage) -> Result<Self, Self::Error> {
        let buffer = value.pixels().map(|pixel| Color::from(*pixel)).collect_vec();
        PixelMatrix::from_vec(value.width() as usize, value.height() as usize, buffer)
    }
}
