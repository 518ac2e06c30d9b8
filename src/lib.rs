use std::path::Path;

use crate::{config::QuantizeConfig, quantizer::Quantized};

pub mod clustering;
pub mod config;
pub mod error;
pub mod matrix;
pub mod metric;
pub mod palette;
pub mod quantizer;
pub mod utils;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::clustering::{
        Clustering, ClusteringMapGenerator, ColorMapGenerator, Convergence, LloydEngine,
        Parallelism,
    };
    pub use crate::error::{QuantizeError, Result};
    pub use crate::matrix::PixelMatrix;
    pub use crate::metric::{CircularHue, DistanceMetric, Metric, SquaredEuclidean};
    pub use crate::palette::{ColorMap, Palette};
    pub use crate::quantizer::{ColorQuantizer, Quantized};
    pub use crate::utils::prelude::*;
}

/// Read `input`, quantize it as `config` says and write the result to `output`.
pub fn run<I, O>(config: &QuantizeConfig, input: I, output: O) -> error::Result<Quantized>
where
    I: AsRef<Path>,
    O: AsRef<Path>,
{
    config.validate()?;
    let generator = config.generator();
    tracing::info!(
        input = %input.as_ref().display(),
        colors = config.num_colors,
        metric = %generator.metric(),
        parallelism = %config.parallelism,
        "quantizing"
    );
    let quantizer = quantizer::ColorQuantizer::from_path(input, generator)?;
    quantizer.quantize_to_file(output, config.num_colors, config.output_format)
}
