use std::io::Cursor;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageOutputFormat, RgbaImage};

/// Base64 PNG ready for the wire, plus the dimensions it was encoded at.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

/// Proportional target size with width capped at `max_width`. Never upscales.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let scaled_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
    (max_width, scaled_height)
}

/// Downscale (never upscale), re-encode as PNG and base64 the result.
/// Deterministic for identical input and `max_width`.
pub fn encode_for_upload(image: &RgbaImage, max_width: u32) -> Result<EncodedImage> {
    let (width, height) = scaled_dimensions(image.width(), image.height(), max_width);

    let resized = if (width, height) == image.dimensions() {
        DynamicImage::ImageRgba8(image.clone())
    } else {
        DynamicImage::ImageRgba8(image.clone()).resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut png = Cursor::new(Vec::new());
    resized
        .write_to(&mut png, ImageOutputFormat::Png)
        .context("failed to encode screenshot as PNG")?;

    Ok(EncodedImage {
        data: BASE64.encode(png.into_inner()),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn caps_width_and_preserves_aspect() {
        assert_eq!(scaled_dimensions(2400, 1200, 1200), (1200, 600));
        assert_eq!(scaled_dimensions(1201, 1000, 1200), (1200, 999));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(scaled_dimensions(800, 600, 1200), (800, 600));
        assert_eq!(scaled_dimensions(1200, 900, 1200), (1200, 900));
    }

    #[test]
    fn degenerate_sizes_survive() {
        assert_eq!(scaled_dimensions(0, 0, 1200), (0, 0));
        // A very wide sliver still gets at least one row.
        assert_eq!(scaled_dimensions(100_000, 10, 1200), (1200, 1));
    }

    #[test]
    fn encoded_output_respects_max_width() {
        let image = RgbaImage::from_pixel(2400, 1200, Rgba([10, 20, 30, 255]));
        let encoded = encode_for_upload(&image, 1200).unwrap();
        assert_eq!((encoded.width, encoded.height), (1200, 600));

        let png = BASE64.decode(encoded.data.as_bytes()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1200, 600));
    }

    #[test]
    fn small_images_pass_through_unscaled() {
        let image = RgbaImage::from_pixel(640, 480, Rgba([1, 2, 3, 255]));
        let encoded = encode_for_upload(&image, 1200).unwrap();
        assert_eq!((encoded.width, encoded.height), (640, 480));
    }

    #[test]
    fn encoding_is_deterministic() {
        let image = RgbaImage::from_pixel(1600, 900, Rgba([200, 100, 50, 255]));
        let first = encode_for_upload(&image, 1200).unwrap();
        let second = encode_for_upload(&image, 1200).unwrap();
        assert_eq!(first.data, second.data);
    }
}
