use rayon::prelude::*;
use tracing::debug;

use crate::{
    clustering::Parallelism,
    error::QuantizeError,
    matrix::PixelMatrix,
    metric::DistanceMetric,
    palette::Palette,
    utils::pixel::Color,
};

/// A color competing for the next palette slot, with its distance to the
/// nearest centroid chosen so far.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    color: Color,
}

impl Candidate {
    /// Farther wins. Equal distances go to the larger packed value, so the
    /// pick never depends on scan or reduction order.
    #[inline]
    fn beats(&self, other: &Candidate) -> bool {
        self.distance > other.distance
            || (self.distance == other.distance && self.color.packed() > other.color.packed())
    }

    #[inline]
    fn best(a: Candidate, b: Candidate) -> Candidate {
        if b.beats(&a) { b } else { a }
    }
}

/// Seed `num_colors` centroids by farthest-point sampling.
///
/// The first centroid is the pixel at (row 0, col 0). Every next centroid is
/// the color whose distance to its nearest already chosen centroid is the
/// largest, ties resolved by [Color::packed].
///
/// Scanning distinct colors in first-occurrence order yields the same pick as
/// scanning every pixel: duplicates of a color never beat their first copy.
pub fn seed_palette<M>(
    matrix: &PixelMatrix,
    num_colors: usize,
    metric: &M,
    parallelism: Parallelism,
) -> crate::error::Result<Palette>
where
    M: DistanceMetric + ?Sized,
{
    let candidates = matrix.distinct_colors();
    check_palette_size(num_colors, candidates.len())?;
    Ok(seed_from_candidates(candidates, num_colors, metric, parallelism))
}

pub(crate) fn check_palette_size(num_colors: usize, distinct: usize) -> crate::error::Result {
    if num_colors == 0 {
        return Err(QuantizeError::invalid("number of colors must be positive"));
    }
    if num_colors > distinct {
        return Err(QuantizeError::TooManyColors {
            requested: num_colors,
            distinct,
        });
    }
    Ok(())
}

/// `candidates` must be non-empty, deduplicated, and start with the (0, 0) pixel.
fn seed_from_candidates<M>(
    candidates: &[Color],
    num_colors: usize,
    metric: &M,
    parallelism: Parallelism,
) -> Palette
where
    M: DistanceMetric + ?Sized,
{
    let first = candidates[0];
    let mut palette = Vec::with_capacity(num_colors);
    palette.push(first);

    let parallel = parallelism.is_parallel(candidates.len());

    // distance of every candidate to its nearest chosen centroid, refreshed
    // against the newest centroid only
    let mut nearest = vec![0.0; candidates.len()];
    let mut scratch = vec![0.0; candidates.len()];
    relax(metric, first, candidates, &mut nearest, &mut scratch, parallel, true);

    while palette.len() < num_colors {
        let winner = if parallel {
            nearest
                .par_iter()
                .zip(candidates.par_iter())
                .map(|(&distance, &color)| Candidate { distance, color })
                .reduce_with(Candidate::best)
        } else {
            nearest
                .iter()
                .zip(candidates.iter())
                .map(|(&distance, &color)| Candidate { distance, color })
                .reduce(Candidate::best)
        };
        // candidates is never empty
        let Some(winner) = winner else { break };

        debug!(
            slot = palette.len(),
            color = %winner.color,
            distance = winner.distance,
            "picked seed centroid"
        );
        palette.push(winner.color);
        relax(metric, winner.color, candidates, &mut nearest, &mut scratch, parallel, false);
    }

    Palette::new(palette)
}

const RELAX_CHUNK: usize = 4096;

/// Lower every `nearest` entry to the candidate's distance to `centroid`,
/// or overwrite them all when `reset` is set. Distances are computed in
/// batches through [DistanceMetric::distances_to].
fn relax<M>(
    metric: &M,
    centroid: Color,
    candidates: &[Color],
    nearest: &mut [f64],
    scratch: &mut [f64],
    parallel: bool,
    reset: bool,
) where
    M: DistanceMetric + ?Sized,
{
    let apply = |(nearest, (candidates, scratch)): (&mut [f64], (&[Color], &mut [f64]))| {
        metric.distances_to(centroid, candidates, scratch);
        nearest.iter_mut().zip(scratch.iter()).for_each(|(dist, &d)| {
            if reset || d < *dist {
                *dist = d;
            }
        });
    };
    if parallel {
        nearest
            .par_chunks_mut(RELAX_CHUNK)
            .zip(candidates.par_chunks(RELAX_CHUNK).zip(scratch.par_chunks_mut(RELAX_CHUNK)))
            .for_each(apply);
    } else {
        apply((nearest, (candidates, scratch)));
    }
}
