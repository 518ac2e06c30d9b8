#[cfg(test)]
mod scenario_tests {
    use crate::{
        clustering::{
            ClusteringMapGenerator, ColorMapGenerator, Convergence, LloydEngine, Parallelism,
        },
        config::QuantizeConfig,
        error::QuantizeError,
        matrix::PixelMatrix,
        metric::{CircularHue, Metric, SquaredEuclidean},
        quantizer::ColorQuantizer,
        tests::utils::*,
        utils::{self, pixel::Color},
    };

    fn checkerboard() -> PixelMatrix {
        PixelMatrix::from_rows(&[[Color::BLACK, Color::WHITE], [Color::BLACK, Color::WHITE]])
            .unwrap()
    }

    #[test]
    fn test_black_and_white_keeps_both_colors() {
        let quantizer =
            ColorQuantizer::new(checkerboard(), ClusteringMapGenerator::new(SquaredEuclidean));
        let quantized = quantizer.quantize(2).unwrap();

        assert_eq!(quantized.palette.colors(), &[Color::BLACK, Color::WHITE]);
        assert_eq!(quantized.convergence, Convergence::Converged);
        assert_eq!(quantized.iterations, 1);
        assert!(quantized.color_map.is_identity());
        assert_eq!(quantized.matrix, checkerboard());
    }

    #[test]
    fn test_more_colors_than_present_is_rejected() {
        let quantizer =
            ColorQuantizer::new(checkerboard(), ClusteringMapGenerator::new(SquaredEuclidean));
        let err = quantizer.quantize(3).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(matches!(
            err,
            QuantizeError::TooManyColors {
                requested: 3,
                distinct: 2
            }
        ));
    }

    #[test]
    fn test_single_color_image() {
        let color = Color::new(12, 34, 56);
        let matrix = PixelMatrix::filled(5, 3, color).unwrap();
        let quantizer =
            ColorQuantizer::new(matrix.clone(), ClusteringMapGenerator::new(CircularHue));
        let quantized = quantizer.quantize(1).unwrap();

        assert_eq!(quantized.palette.colors(), &[color]);
        assert_eq!(quantized.color_map.get(&color), Some(color));
        // one confirming pass, no refinement
        assert_eq!(quantized.iterations, 1);
        assert!(quantized.converged());
        assert_eq!(quantized.matrix, matrix);
    }

    #[test]
    fn test_seed_of_one_is_top_left_pixel() {
        let matrix = gen_random_image(TEST_IMAGE_SIZE, 7);
        let top_left = matrix.get(0, 0).unwrap();
        for metric in [Metric::SquaredEuclidean, Metric::CircularHue] {
            let palette = ClusteringMapGenerator::new(metric)
                .generate_palette(&matrix, 1)
                .unwrap();
            assert_eq!(palette.colors(), &[top_left]);
        }
    }

    #[test]
    fn test_seeding_is_deterministic() {
        let matrix = gen_random_image(TEST_IMAGE_SIZE, 11);
        for metric in [Metric::SquaredEuclidean, Metric::CircularHue] {
            let generator = ClusteringMapGenerator::new(metric);
            let first = generator.generate_palette(&matrix, 12).unwrap();
            let second = generator.generate_palette(&matrix, 12).unwrap();
            assert_eq!(first, second, "{metric}");
            assert_eq!(first.len(), 12);
        }
    }

    #[test]
    fn test_k_equal_to_distinct_is_identity() {
        let matrix = gen_indexed_image(TEST_IMAGE_SIZE, 9, 3);
        let distinct = matrix.distinct_colors().len();
        let generator = ClusteringMapGenerator::new(SquaredEuclidean);
        let quantized = ColorQuantizer::new(matrix.clone(), generator)
            .quantize(distinct)
            .unwrap();

        assert!(quantized.iterations <= 1);
        assert!(quantized.converged());
        assert!(quantized.color_map.is_identity());
        assert_eq!(quantized.color_map.len(), distinct);
        assert_eq!(quantized.matrix, matrix);
    }

    #[test]
    fn test_rerun_from_converged_palette_is_stable() {
        let matrix = gen_indexed_image(32, 12, 5);
        let generator = ClusteringMapGenerator::new(SquaredEuclidean);
        let seed = generator.generate_palette(&matrix, 4).unwrap();
        let first = generator.generate_color_map(&matrix, &seed).unwrap();
        assert!(first.converged());

        let second = generator.generate_color_map(&matrix, &first.palette).unwrap();
        assert_eq!(second.iterations, 1);
        assert_eq!(second.palette, first.palette);
        assert_eq!(second.color_map, first.color_map);
    }

    #[test]
    fn test_every_output_pixel_is_in_palette() {
        let matrix = gen_random_image(TEST_IMAGE_SIZE, 17);
        for metric in [Metric::SquaredEuclidean, Metric::CircularHue] {
            let generator = ClusteringMapGenerator::new(metric);
            let quantized = ColorQuantizer::new(matrix.clone(), generator)
                .quantize(8)
                .unwrap();
            assert_eq!(quantized.palette.len(), 8);
            assert_eq!(quantized.matrix.shape(), matrix.shape());
            assert!(quantized.color_map.image_within(&quantized.palette));
            assert!(
                quantized
                    .matrix
                    .as_ref()
                    .iter()
                    .all(|color| quantized.palette.contains(color)),
                "{metric}"
            );
        }
    }

    #[test]
    fn test_capped_run_is_observable() {
        let matrix = gen_random_image(TEST_IMAGE_SIZE, 23);
        let generator = ClusteringMapGenerator::new(SquaredEuclidean).with_max_iterations(1);
        let quantized = ColorQuantizer::new(matrix, generator).quantize(16).unwrap();

        assert_eq!(quantized.convergence, Convergence::Capped);
        assert_eq!(quantized.iterations, 1);
        assert!(
            quantized
                .matrix
                .as_ref()
                .iter()
                .all(|color| quantized.palette.contains(color))
        );
    }

    #[test]
    fn test_boxed_generator_is_interchangeable() {
        let matrix = gen_random_image(16, 29);
        let generators: Vec<Box<dyn ColorMapGenerator>> = vec![
            Box::new(ClusteringMapGenerator::new(SquaredEuclidean)),
            Box::new(ClusteringMapGenerator::new(CircularHue)),
        ];
        for generator in generators {
            let quantized = ColorQuantizer::new(matrix.clone(), generator)
                .quantize(4)
                .unwrap();
            assert_eq!(quantized.palette.len(), 4);
        }
    }

    #[test]
    fn test_pixel_frequency_weights_centroids() {
        let odd = Color::new(4, 8, 12);
        let matrix = PixelMatrix::from_rows(&[[Color::BLACK, Color::BLACK], [Color::BLACK, odd]])
            .unwrap();
        let quantized = ColorQuantizer::new(matrix, ClusteringMapGenerator::new(SquaredEuclidean))
            .quantize(1)
            .unwrap();

        assert_eq!(quantized.palette.colors(), &[Color::new(1, 2, 3)]);
        assert_eq!(quantized.color_map.get(&odd), Some(Color::new(1, 2, 3)));
        assert_eq!(quantized.iterations, 2);
    }

    #[test]
    fn test_engine_matches_generator_on_raw_pixels() {
        let matrix = gen_indexed_image(32, 20, 31);
        let generator = ClusteringMapGenerator::new(SquaredEuclidean);
        let seed = generator.generate_palette(&matrix, 5).unwrap();
        let by_generator = generator.generate_color_map(&matrix, &seed).unwrap();
        let by_engine = LloydEngine::new(&SquaredEuclidean)
            .with_parallelism(Parallelism::Sequential)
            .run(matrix.as_ref(), &seed)
            .unwrap();

        assert_eq!(by_engine.palette, by_generator.palette);
        assert_eq!(by_engine.color_map, by_generator.color_map);
        assert_eq!(by_engine.iterations, by_generator.iterations);
    }

    #[test]
    fn test_run_writes_quantized_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bmp");
        let output = dir.path().join("out.bmp");
        utils::image::write_image(&gen_random_image(24, 37), &input, None).unwrap();

        let config = QuantizeConfig {
            num_colors: 5,
            ..QuantizeConfig::default()
        };
        let quantized = crate::run(&config, &input, &output).unwrap();

        let written = utils::image::read_image(&output).unwrap();
        assert_eq!(written, quantized.matrix);
        assert!(written.distinct_colors().len() <= 5);
    }

    #[test]
    fn test_run_propagates_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bmp");
        utils::image::write_image(&gen_random_image(8, 41), &input, None).unwrap();

        let config = QuantizeConfig {
            num_colors: 2,
            ..QuantizeConfig::default()
        };
        let output = dir.path().join("no-such-dir").join("out.bmp");
        assert!(matches!(
            crate::run(&config, &input, &output).unwrap_err(),
            QuantizeError::Io(_)
        ));
    }
}
