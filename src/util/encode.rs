//! PNG encoding for captured frames
//!
//! Captures are always delivered as PNG. Compression defaults to
//! [`CompressionType::Default`] with adaptive filtering.
//!
//! # Examples
//!
//! ```
//! use shotpipe::{capture::ImageBuffer, util::encode::encode_png};
//!
//! let img = ImageBuffer::from_test_pattern(320, 200);
//! let png_bytes = encode_png(&img).unwrap();
//! assert_eq!(&png_bytes[1..4], b"PNG");
//! ```

use std::io::Cursor;

use image::{
    ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};

use crate::{
    capture::ImageBuffer,
    error::{CaptureError, CaptureResult},
};

/// Encodes an image as PNG with default compression
///
/// # Errors
///
/// - [`CaptureError::EncodingFailed`] - The encoder rejected the image
pub fn encode_png(buffer: &ImageBuffer) -> CaptureResult<Vec<u8>> {
    encode_png_with_compression(buffer, CompressionType::Default)
}

/// Encodes an image as PNG with specified compression level
///
/// Higher compression levels produce smaller files but take longer to encode.
///
/// # Examples
///
/// ```
/// use image::codecs::png::CompressionType;
/// use shotpipe::{capture::ImageBuffer, util::encode::encode_png_with_compression};
///
/// let img = ImageBuffer::from_test_pattern(100, 100);
/// let fast = encode_png_with_compression(&img, CompressionType::Fast).unwrap();
/// assert!(!fast.is_empty());
/// ```
pub fn encode_png_with_compression(
    buffer: &ImageBuffer,
    compression: CompressionType,
) -> CaptureResult<Vec<u8>> {
    let mut output = Vec::new();

    // Use adaptive filter for automatic per-scanline optimization
    let encoder =
        PngEncoder::new_with_quality(Cursor::new(&mut output), compression, FilterType::Adaptive);

    let rgba = buffer.to_rgba8();
    let (width, height) = rgba.dimensions();

    encoder
        .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| CaptureError::EncodingFailed {
            format: "png".to_string(),
            reason: e.to_string(),
        })?;

    Ok(output)
}
