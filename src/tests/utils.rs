use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{matrix::PixelMatrix, utils::pixel::Color};

pub const TEST_IMAGE_SIZE: usize = 64;

pub fn rand_color(rng: &mut impl Rng) -> Color {
    Color::new(rng.random(), rng.random(), rng.random())
}

/// Random image, reproducible through `seed`.
pub fn gen_random_image(size: usize, seed: u64) -> PixelMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let buffer = (0..(size * size)).map(|_| rand_color(&mut rng)).collect();
    PixelMatrix::from_vec(size, size, buffer).unwrap()
}

/// Random image drawing from only `colors` distinct values.
pub fn gen_indexed_image(size: usize, colors: usize, seed: u64) -> PixelMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let palette: Vec<Color> = (0..colors).map(|_| rand_color(&mut rng)).collect();
    let buffer = (0..(size * size))
        .map(|_| palette[rng.random_range(0..colors)])
        .collect();
    PixelMatrix::from_vec(size, size, buffer).unwrap()
}
