use std::{fs::File, io::BufWriter, path::Path};

use image::{ImageError, ImageFormat, ImageReader};
use tracing::debug;

use crate::{error::QuantizeError, matrix::PixelMatrix};

/// Decode an image file into a color matrix. Alpha is dropped.
///
/// The format is sniffed from the file contents, falling back to the extension.
pub fn read_image<P: AsRef<Path>>(path: P) -> crate::error::Result<PixelMatrix> {
    let path = path.as_ref();
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgb8();
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "decoded image"
    );
    PixelMatrix::try_from(&image)
}

/// Encode `matrix` to `path`.
///
/// Without an explicit `format` it is derived from the path extension.
/// Every failure is returned, including the ones raised while flushing.
pub fn write_image<P: AsRef<Path>>(
    matrix: &PixelMatrix,
    path: P,
    format: Option<ImageFormat>,
) -> crate::error::Result {
    let path = path.as_ref();
    let format = match format {
        Some(format) => format,
        None => ImageFormat::from_path(path).map_err(QuantizeError::ImageEncode)?,
    };

    let image = matrix.to_rgb_image()?;
    let file = &mut BufWriter::new(File::create(path)?);
    image.write_to(file, format).map_err(encode_error)?;
    std::io::Write::flush(file)?;

    debug!(path = %path.display(), ?format, "encoded image");
    Ok(())
}

// anything but plain I/O is an encoder problem on the write path
fn encode_error(err: ImageError) -> QuantizeError {
    match err {
        ImageError::IoError(e) => QuantizeError::Io(e),
        other => QuantizeError::ImageEncode(other),
    }
}
