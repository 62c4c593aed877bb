//! Image encoding: cropped region → base64 PNG for the request body.
//!
//! Multimodal APIs accept images as base64 data embedded in the JSON request
//! body. PNG is chosen over JPEG because it is lossless — text crispness
//! matters far more than file size when the model must read glyph-level
//! detail out of a low-resolution crop.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a cropped block region as base64 PNG.
pub fn encode_region(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded region → {} bytes base64", b64.len());
    Ok(b64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let b64 = encode_region(&img).expect("encode should succeed");
        assert!(!b64.is_empty());
        let decoded = STANDARD.decode(&b64).expect("valid base64");
        // PNG magic bytes survive the round trip.
        assert_eq!(&decoded[..4], &[0x89, b'P', b'N', b'G']);
    }
}
