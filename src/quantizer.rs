use std::path::Path;

use image::ImageFormat;
use tracing::{info, warn};

use crate::{
    clustering::{ColorMapGenerator, Convergence},
    error::QuantizeError,
    matrix::PixelMatrix,
    palette::{ColorMap, Palette},
    utils,
};

/// Result of one quantization request.
#[derive(Debug, Clone)]
pub struct Quantized {
    /// Source shape, every pixel replaced by its palette entry.
    pub matrix: PixelMatrix,
    pub palette: Palette,
    pub color_map: ColorMap,
    pub iterations: usize,
    /// [Convergence::Capped] marks best-effort output.
    pub convergence: Convergence,
}

impl Quantized {
    #[inline]
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }
}

/// Reduces an image to a fixed number of colors through a [ColorMapGenerator].
#[derive(Debug, Clone)]
pub struct ColorQuantizer<G> {
    matrix: PixelMatrix,
    generator: G,
}

impl<G: ColorMapGenerator> ColorQuantizer<G> {
    pub fn new(matrix: PixelMatrix, generator: G) -> Self {
        Self { matrix, generator }
    }

    /// Load the source image from disk. Decode failures are returned as is.
    pub fn from_path<P: AsRef<Path>>(path: P, generator: G) -> crate::error::Result<Self> {
        let matrix = utils::image::read_image(path)?;
        Ok(Self::new(matrix, generator))
    }

    pub fn matrix(&self) -> &PixelMatrix {
        &self.matrix
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Quantize to `num_colors` colors, in memory.
    ///
    /// `num_colors` is checked against the image before any clustering runs.
    /// The image histogram is built once here and shared with the generator
    /// through the matrix.
    pub fn quantize(&self, num_colors: usize) -> crate::error::Result<Quantized> {
        let distinct = self.matrix.histogram().len();
        crate::clustering::farthest_point::check_palette_size(num_colors, distinct)?;

        let initial = self.generator.generate_palette(&self.matrix, num_colors)?;
        let clustering = self.generator.generate_color_map(&self.matrix, &initial)?;

        let matrix = self.matrix.try_map_colors(|color| {
            clustering.color_map.get(&color).ok_or_else(|| {
                QuantizeError::invalid(format!("color {color} is missing from the color map"))
            })
        })?;

        if clustering.converged() {
            info!(
                colors = num_colors,
                distinct,
                iterations = clustering.iterations,
                "quantized image"
            );
        } else {
            warn!(
                colors = num_colors,
                iterations = clustering.iterations,
                "quantized image without converging"
            );
        }

        Ok(Quantized {
            matrix,
            palette: clustering.palette,
            color_map: clustering.color_map,
            iterations: clustering.iterations,
            convergence: clustering.convergence,
        })
    }

    /// Quantize and encode the result to `path`.
    ///
    /// Write failures are returned, the outcome is only handed back once the
    /// file is complete.
    pub fn quantize_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        num_colors: usize,
        format: Option<ImageFormat>,
    ) -> crate::error::Result<Quantized> {
        let quantized = self.quantize(num_colors)?;
        utils::image::write_image(&quantized.matrix, path, format)?;
        Ok(quantized)
    }
}
