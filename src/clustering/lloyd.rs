use std::fmt::Display;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    clustering::Parallelism,
    error::QuantizeError,
    matrix::ColorHistogram,
    metric::DistanceMetric,
    palette::{ColorMap, Palette},
    utils::pixel::Color,
};

/// Safety bound on refinement passes.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// How a clustering run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// Recomputed centroids matched the previous pass exactly.
    Converged,
    /// The pass limit was hit first, the result is best effort.
    Capped,
}

impl Display for Convergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Convergence::Converged => f.write_str("converged"),
            Convergence::Capped => f.write_str("capped"),
        }
    }
}

/// Outcome of a clustering run.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Final centroids, index stable with the initial palette.
    pub palette: Palette,
    /// Every distinct input color mapped to its final centroid.
    pub color_map: ColorMap,
    /// Assign/update passes performed, including the one confirming convergence.
    pub iterations: usize,
    pub convergence: Convergence,
}

impl Clustering {
    #[inline]
    pub fn converged(&self) -> bool {
        self.convergence == Convergence::Converged
    }
}

/// Lloyd's algorithm over a pluggable distance metric.
///
/// Centroids and clusters are addressed by their index in the palette, never
/// by value, so two centroids landing on the same color stay separate.
#[derive(Debug)]
pub struct LloydEngine<'m, M: ?Sized> {
    metric: &'m M,
    max_iterations: usize,
    parallelism: Parallelism,
}

impl<'m, M> LloydEngine<'m, M>
where
    M: DistanceMetric + ?Sized,
{
    pub fn new(metric: &'m M) -> Self {
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

    /// Refine `initial` against `pixels` until centroids stop moving or the
    /// pass limit is reached.
    pub fn run(&self, pixels: &[Color], initial: &Palette) -> crate::error::Result<Clustering> {
        self.run_histogram(&ColorHistogram::from_pixels(pixels), initial)
    }

    /// Same as [LloydEngine::run] over an already counted image.
    ///
    /// Every distinct color is assigned once; repeated pixels only add weight
    /// to the cluster means.
    pub fn run_histogram(
        &self,
        histogram: &ColorHistogram,
        initial: &Palette,
    ) -> crate::error::Result<Clustering> {
        if histogram.is_empty() {
            return Err(QuantizeError::invalid("no colors to cluster"));
        }
        if initial.is_empty() {
            return Err(QuantizeError::invalid("initial palette is empty"));
        }
        if self.max_iterations == 0 {
            return Err(QuantizeError::invalid("max iterations must be positive"));
        }

        let (colors, weights) = (histogram.colors(), histogram.weights());
        let parallel = self
            .parallelism
            .is_parallel(colors.len() * initial.len());
        let mut centroids = initial.colors().to_vec();
        let mut iterations = 0;

        loop {
            let assignment = self.assign(colors, &centroids, parallel);
            let updated = update(colors, weights, &assignment, &centroids, parallel);
            iterations += 1;

            let moved = centroids
                .iter()
                .zip(updated.iter())
                .filter(|(old, new)| old != new)
                .count();
            debug!(pass = iterations, moved, "lloyd pass");

            let convergence = if moved == 0 {
                Some(Convergence::Converged)
            } else if iterations >= self.max_iterations {
                Some(Convergence::Capped)
            } else {
                None
            };

            if let Some(convergence) = convergence {
                let color_map = colors
                    .iter()
                    .zip(assignment.iter())
                    .map(|(color, &cluster)| (*color, updated[cluster]))
                    .collect::<ColorMap>();

                match convergence {
                    Convergence::Converged => {
                        info!(iterations, colors = updated.len(), "clustering converged")
                    }
                    Convergence::Capped => warn!(
                        iterations,
                        moved, "clustering hit the pass limit before converging"
                    ),
                }

                return Ok(Clustering {
                    palette: Palette::new(updated),
                    color_map,
                    iterations,
                    convergence,
                });
            }

            centroids = updated;
        }
    }

    /// Index of the nearest centroid for every color.
    fn assign(&self, colors: &[Color], centroids: &[Color], parallel: bool) -> Vec<usize> {
        if parallel {
            colors
                .par_iter()
                .map(|color| nearest_centroid(self.metric, *color, centroids))
                .collect()
        } else {
            colors
                .iter()
                .map(|color| nearest_centroid(self.metric, *color, centroids))
                .collect()
        }
    }
}

/// Nearest centroid by index. On equal distances the earlier index wins.
#[inline]
pub(crate) fn nearest_centroid<M>(metric: &M, color: Color, centroids: &[Color]) -> usize
where
    M: DistanceMetric + ?Sized,
{
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = metric.distance(color, *centroid);
        if distance < best_distance {
            best = idx;
            best_distance = distance;
        }
    }
    best
}

/// Per-cluster channel totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ChannelSum {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
}

impl ChannelSum {
    #[inline]
    fn add(&mut self, color: Color, weight: u64) {
        self.r += color.r as u64 * weight;
        self.g += color.g as u64 * weight;
        self.b += color.b as u64 * weight;
        self.count += weight;
    }

    #[inline]
    fn merge(mut self, other: ChannelSum) -> ChannelSum {
        self.r += other.r;
        self.g += other.g;
        self.b += other.b;
        self.count += other.count;
        self
    }

    /// Truncated integer mean, `None` for an empty cluster.
    #[inline]
    fn mean(&self) -> Option<Color> {
        if self.count == 0 {
            return None;
        }
        // a mean of u8 values always fits in u8
        Some(Color::new(
            (self.r / self.count) as u8,
            (self.g / self.count) as u8,
            (self.b / self.count) as u8,
        ))
    }
}

fn cluster_sums(
    colors: &[Color],
    weights: &[u64],
    assignment: &[usize],
    clusters: usize,
) -> Vec<ChannelSum> {
    let mut sums = vec![ChannelSum::default(); clusters];
    colors
        .iter()
        .zip(weights.iter())
        .zip(assignment.iter())
        .for_each(|((color, &weight), &cluster)| sums[cluster].add(*color, weight));
    sums
}

fn cluster_sums_par(
    colors: &[Color],
    weights: &[u64],
    assignment: &[usize],
    clusters: usize,
) -> Vec<ChannelSum> {
    colors
        .par_iter()
        .zip(weights.par_iter())
        .zip(assignment.par_iter())
        .fold(
            || vec![ChannelSum::default(); clusters],
            |mut sums, ((color, &weight), &cluster)| {
                sums[cluster].add(*color, weight);
                sums
            },
        )
        .reduce(
            || vec![ChannelSum::default(); clusters],
            |a, b| a.into_iter().zip(b).map(|(a, b)| a.merge(b)).collect(),
        )
}

/// New centroid per index: the member mean, or the old centroid when empty.
fn update(
    colors: &[Color],
    weights: &[u64],
    assignment: &[usize],
    centroids: &[Color],
    parallel: bool,
) -> Vec<Color> {
    let sums = if parallel {
        cluster_sums_par(colors, weights, assignment, centroids.len())
    } else {
        cluster_sums(colors, weights, assignment, centroids.len())
    };
    sums.iter()
        .zip(centroids.iter())
        .map(|(sum, previous)| sum.mean().unwrap_or(*previous))
        .collect()
}
