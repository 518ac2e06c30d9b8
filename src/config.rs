use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use image::ImageFormat;
use json::JsonValue;

use crate::{
    clustering::{ClusteringMapGenerator, DEFAULT_MAX_ITERATIONS, Parallelism},
    error::QuantizeError,
    metric::Metric,
};

/// Quantization settings, stored as a flat JSON object:
///
/// ```json
/// {
///     "num_colors": 16,
///     "metric": "euclidean",
///     "max_iterations": 1000,
///     "parallelism": "auto",
///     "output_format": "bmp"
/// }
/// ```
///
/// Every key is optional when reading; missing keys keep their default.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeConfig {
    pub num_colors: usize,
    pub metric: Metric,
    pub max_iterations: usize,
    pub parallelism: Parallelism,
    /// `None` derives the format from the output path.
    pub output_format: Option<ImageFormat>,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            num_colors: 16,
            metric: Metric::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parallelism: Parallelism::default(),
            output_format: None,
        }
    }
}

impl QuantizeConfig {
    fn from_json(json_string: &str) -> crate::error::Result<QuantizeConfig> {
        let json = json::parse(json_string)?;
        if !json.is_object() {
            return Err(QuantizeError::Config(
                "config must be a JSON object".to_string(),
            ));
        }

        let mut config = QuantizeConfig::default();

        if let Some(value) = optional(&json, "num_colors", JsonValue::as_usize)? {
            config.num_colors = value;
        }
        if let Some(value) = optional(&json, "max_iterations", JsonValue::as_usize)? {
            config.max_iterations = value;
        }
        if let Some(value) = optional(&json, "metric", JsonValue::as_str)? {
            config.metric = value.parse()?;
        }
        if let Some(value) = optional(&json, "parallelism", JsonValue::as_str)? {
            config.parallelism = value.parse()?;
        }
        if let Some(value) = optional(&json, "output_format", JsonValue::as_str)? {
            config.output_format = Some(parse_format(value)?);
        }

        config.validate()?;
        Ok(config)
    }

    fn to_json(&self) -> String {
        let mut data = JsonValue::new_object();

        data["num_colors"] = self.num_colors.into();
        data["metric"] = self.metric.name().into();
        data["max_iterations"] = self.max_iterations.into();
        data["parallelism"] = self.parallelism.name().into();
        if let Some(format) = self.output_format {
            data["output_format"] = format.extensions_str().first().copied().into();
        }

        data.pretty(4)
    }

    /// Reject values the quantizer can't run with.
    pub fn validate(&self) -> crate::error::Result {
        if self.num_colors == 0 {
            return Err(QuantizeError::Config(
                "num_colors must be positive".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(QuantizeError::Config(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Generator configured from these settings.
    pub fn generator(&self) -> ClusteringMapGenerator<Metric> {
        ClusteringMapGenerator::new(self.metric)
            .with_max_iterations(self.max_iterations)
            .with_parallelism(self.parallelism)
    }

    pub fn read_config<P: AsRef<Path>>(path: P) -> crate::error::Result<QuantizeConfig> {
        let mut file = File::open(path)?;
        let mut buff = String::new();
        file.read_to_string(&mut buff)?;

        QuantizeConfig::from_json(&buff)
    }

    pub fn write_config<P: AsRef<Path>>(&self, path: P) -> crate::error::Result {
        let string = self.to_json();
        let mut file = File::create(path)?;
        file.write_all(string.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// `Ok(None)` for a missing key, an error for a key holding the wrong type.
fn optional<'j, T>(
    json: &'j JsonValue,
    key: &str,
    read: impl Fn(&'j JsonValue) -> Option<T>,
) -> crate::error::Result<Option<T>> {
    let value = &json[key];
    if value.is_null() {
        return Ok(None);
    }
    match read(value) {
        Some(v) => Ok(Some(v)),
        None => Err(QuantizeError::Config(format!("Couldn't parse {key}"))),
    }
}

pub fn parse_format(name: &str) -> crate::error::Result<ImageFormat> {
    ImageFormat::from_extension(name)
        .ok_or_else(|| QuantizeError::Config(format!("Not recognized output_format {name:?}")))
}
