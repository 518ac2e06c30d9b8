/// The main error type for the quantpunker crate
#[derive(Debug, thiserror::Error)]
pub enum QuantizeError {
    /// A caller supplied argument cannot be used (empty matrix, zero colors, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// More palette entries were requested than the image has distinct colors
    #[error("Requested {requested} colors but the image only has {distinct} distinct colors")]
    TooManyColors { requested: usize, distinct: usize },

    /// Error occurred while reading or decoding an image
    #[error("Image decode error: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// Error occurred while writing or encoding an image
    #[error("Image encode error: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// Error occurred during I/O operations (file read/write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration document is malformed or holds unusable values
    #[error("Config error: {0}")]
    Config(String),
}

impl QuantizeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QuantizeError::InvalidArgument(msg.into())
    }

    /// True for every variant the taxonomy files under "invalid argument".
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            QuantizeError::InvalidArgument(_) | QuantizeError::TooManyColors { .. }
        )
    }
}

impl From<image::ImageError> for QuantizeError {
    fn from(err: image::ImageError) -> Self {
        // Distinguish between decode and encode errors based on the error kind
        match err {
            image::ImageError::Encoding(_) => QuantizeError::ImageEncode(err),
            image::ImageError::IoError(e) => QuantizeError::Io(e),
            _ => QuantizeError::ImageDecode(err),
        }
    }
}

impl From<json::Error> for QuantizeError {
    fn from(err: json::Error) -> Self {
        QuantizeError::Config(err.to_string())
    }
}

// Convenience type alias for Results using QuantizeError
pub type Result<T = ()> = std::result::Result<T, QuantizeError>;
