use std::{fmt::Display, str::FromStr};

use crate::{
    error::QuantizeError,
    matrix::PixelMatrix,
    metric::DistanceMetric,
    palette::Palette,
};

pub mod farthest_point;
pub mod lloyd;

pub use lloyd::{Clustering, Convergence, DEFAULT_MAX_ITERATIONS, LloydEngine};

/// Work split for the per-color phases (seed scan, assign, update).
///
/// Workers read a snapshot of the centroids and write disjoint slots, so
/// every strategy yields the exact same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    Sequential,
    Parallel,
    /// Parallel once the per-pass work crosses [Parallelism::AUTO_THRESHOLD].
    #[default]
    Auto,
}

impl Parallelism {
    /// Distance evaluations per pass (colors x centroids) below which
    /// spinning up rayon costs more than it saves.
    pub const AUTO_THRESHOLD: usize = 1 << 16;

    #[inline]
    pub fn is_parallel(&self, work_hint: usize) -> bool {
        match self {
            Parallelism::Sequential => false,
            Parallelism::Parallel => true,
            Parallelism::Auto => work_hint >= Self::AUTO_THRESHOLD,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Parallelism::Sequential => "seq",
            Parallelism::Parallel => "par",
            Parallelism::Auto => "auto",
        }
    }
}

impl Display for Parallelism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parallelism {
    type Err = QuantizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seq" | "sequential" => Ok(Parallelism::Sequential),
            "par" | "parallel" => Ok(Parallelism::Parallel),
            "auto" => Ok(Parallelism::Auto),
            _ => Err(QuantizeError::Config(format!(
                "Not recognized parallelism {s:?}"
            ))),
        }
    }
}

/// Capability behind a quantizer: pick a palette, then map every image
/// color onto it.
pub trait ColorMapGenerator {
    /// Initial palette of exactly `num_colors` entries.
    fn generate_palette(
        &self,
        matrix: &PixelMatrix,
        num_colors: usize,
    ) -> crate::error::Result<Palette>;

    /// Final palette and color map, starting from `palette`.
    fn generate_color_map(
        &self,
        matrix: &PixelMatrix,
        palette: &Palette,
    ) -> crate::error::Result<Clustering>;
}

/// Farthest-point seeding followed by Lloyd refinement.
#[derive(Debug, Clone)]
pub struct ClusteringMapGenerator<M> {
    metric: M,
    max_iterations: usize,
    parallelism: Parallelism,
}

impl<M: DistanceMetric> ClusteringMapGenerator<M> {
    pub fn new(metric: M) -> Self {
        Self {
            metric,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parallelism: Parallelism::default(),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }
}

impl<M: DistanceMetric> ColorMapGenerator for ClusteringMapGenerator<M> {
    fn generate_palette(
        &self,
        matrix: &PixelMatrix,
        num_colors: usize,
    ) -> crate::error::Result<Palette> {
        farthest_point::seed_palette(matrix, num_colors, &self.metric, self.parallelism)
    }

    fn generate_color_map(
        &self,
        matrix: &PixelMatrix,
        palette: &Palette,
    ) -> crate::error::Result<Clustering> {
        LloydEngine::new(&self.metric)
            .with_max_iterations(self.max_iterations)
            .with_parallelism(self.parallelism)
            .run_histogram(matrix.histogram(), palette)
    }
}

impl<G: ColorMapGenerator + ?Sized> ColorMapGenerator for Box<G> {
    fn generate_palette(
        &self,
        matrix: &PixelMatrix,
        num_colors: usize,
    ) -> crate::error::Result<Palette> {
        (**self).generate_palette(matrix, num_colors)
    }

    fn generate_color_map(
        &self,
        matrix: &PixelMatrix,
        palette: &Palette,
    ) -> crate::error::Result<Clustering> {
        (**self).generate_color_map(matrix, palette)
    }
}
