#[cfg(test)]
mod parallelism_strategy_tests {
    use crate::{
        clustering::{ClusteringMapGenerator, ColorMapGenerator, Parallelism},
        matrix::PixelMatrix,
        metric::Metric,
        palette::Palette,
        tests::utils::*,
    };

    /// Run seeding and clustering with the given strategy
    fn run_strategy(
        matrix: &PixelMatrix,
        metric: Metric,
        colors: usize,
        parallelism: Parallelism,
    ) -> (Palette, crate::clustering::Clustering) {
        let generator = ClusteringMapGenerator::new(metric)
            .with_parallelism(parallelism)
            .with_max_iterations(200);
        let seed = generator.generate_palette(matrix, colors).unwrap();
        let clustering = generator.generate_color_map(matrix, &seed).unwrap();
        (seed, clustering)
    }

    /// Macro to generate Parallelism comparison tests
    macro_rules! test_strategy_comparison {
        ($test_name:ident, $metric:expr, $colors:expr, $seed:expr) => {
            #[test]
            fn $test_name() {
                let matrix = gen_random_image(TEST_IMAGE_SIZE, $seed);

                let (seed_a, a) = run_strategy(&matrix, $metric, $colors, Parallelism::Sequential);
                let (seed_b, b) = run_strategy(&matrix, $metric, $colors, Parallelism::Parallel);

                assert_eq!(seed_a, seed_b, "seed palettes differ");
                assert_eq!(a.palette, b.palette, "final palettes differ");
                assert_eq!(a.color_map, b.color_map, "color maps differ");
                assert_eq!(a.iterations, b.iterations, "pass counts differ");
                assert_eq!(a.convergence, b.convergence);
            }
        };
    }

    test_strategy_comparison!(test_euclidean_2_colors, Metric::SquaredEuclidean, 2, 101);
    test_strategy_comparison!(test_euclidean_8_colors, Metric::SquaredEuclidean, 8, 102);
    test_strategy_comparison!(test_euclidean_32_colors, Metric::SquaredEuclidean, 32, 103);
    test_strategy_comparison!(test_hue_2_colors, Metric::CircularHue, 2, 104);
    test_strategy_comparison!(test_hue_8_colors, Metric::CircularHue, 8, 105);
    test_strategy_comparison!(test_hue_32_colors, Metric::CircularHue, 32, 106);

    #[test]
    fn test_indexed_image_with_heavy_ties() {
        // few colors, many duplicates: hue ties everywhere
        let matrix = gen_indexed_image(TEST_IMAGE_SIZE, 6, 107);
        let distinct = matrix.distinct_colors().len();
        let (seed_a, a) =
            run_strategy(&matrix, Metric::CircularHue, distinct, Parallelism::Sequential);
        let (seed_b, b) =
            run_strategy(&matrix, Metric::CircularHue, distinct, Parallelism::Parallel);
        assert_eq!(seed_a, seed_b);
        assert_eq!(a.color_map, b.color_map);
    }
}
