//! Image normalizer
//!
//! Photos are shrunk to fit a bounding box and stored as JPEG

use std::io::Cursor;

use image::DynamicImage;
use image::ImageReader;
use image::ImageResult;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Maximum width and height of a stored photo
pub const MAX_DIMENSION: u32 = 200;

/// Quality of the re-encoded JPEG
pub const JPEG_QUALITY: u8 = 75;

/// A normalized photo, JPEG encoded
#[derive(Debug)]
pub struct Normalized {
    /// JPEG data
    pub bytes: Vec<u8>,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

/// Is the content recognized as an image?
///
/// Only the header is inspected, a truncated image body passes
pub fn is_image(bytes: &[u8]) -> bool {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .filter(|reader| reader.format().is_some())
        .and_then(|reader| reader.into_dimensions().ok())
        .is_some()
}

/// Decode, shrink and re-encode a photo
///
/// The photo is never enlarged, the aspect ratio is kept
pub fn normalize(bytes: &[u8]) -> ImageResult<Normalized> {
    let image = image::load_from_memory(bytes)?;
    let image = shrink(image);

    let rgb = image.to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode_image(&rgb)?;

    Ok(Normalized {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}

fn shrink(image: DynamicImage) -> DynamicImage {
    if image.width() <= MAX_DIMENSION && image.height() <= MAX_DIMENSION {
        return image;
    }

    image.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
}
