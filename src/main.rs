use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quantpunker::{clustering::Parallelism, config::QuantizeConfig, metric::Metric, run};
use tracing_subscriber::EnvFilter;

/// Reduce an image to a fixed number of colors with k-means clustering.
#[derive(Parser)]
#[command(name = "quantpunker", version, long_about = None)]
struct Cli {
    /// Image to quantize
    input: PathBuf,

    /// Where to write the quantized image, format follows the extension
    output: PathBuf,

    /// JSON settings file, flags below take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Palette size
    #[arg(short = 'k', long)]
    colors: Option<usize>,

    /// Distance metric: euclidean or circular_hue
    #[arg(short, long)]
    metric: Option<Metric>,

    /// Refinement pass limit
    #[arg(long)]
    max_iterations: Option<usize>,

    /// seq, par or auto
    #[arg(short, long)]
    parallelism: Option<Parallelism>,

    /// Output format (bmp, png, ...), overrides the extension
    #[arg(short, long)]
    format: Option<String>,
}

impl Cli {
    fn config(&self) -> Result<QuantizeConfig> {
        let mut config = match &self.config {
            Some(path) => QuantizeConfig::read_config(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => QuantizeConfig::default(),
        };

        if let Some(colors) = self.colors {
            config.num_colors = colors;
        }
        if let Some(metric) = self.metric {
            config.metric = metric;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(format) = &self.format {
            config.output_format = Some(quantpunker::config::parse_format(format)?);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    let quantized = run(&config, &cli.input, &cli.output).with_context(|| {
        format!(
            "quantizing {} into {}",
            cli.input.display(),
            cli.output.display()
        )
    })?;

    tracing::info!(
        output = %cli.output.display(),
        colors = quantized.palette.len(),
        iterations = quantized.iterations,
        convergence = %quantized.convergence,
        "done"
    );
    Ok(())
}
