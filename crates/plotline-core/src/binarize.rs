//! Image decoding and ink thresholding.
//!
//! Raw bytes (PNG, JPEG, BMP, WebP) are decoded to grayscale and then
//! split into ink (255) and background (0), which is the only thing the
//! tracers look at.

use image::GrayImage;

use crate::types::PlotError;

/// Decode raw image bytes and convert to grayscale.
///
/// # Errors
///
/// Returns [`PlotError::EmptyInput`] if `bytes` is empty.
/// Returns [`PlotError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded grayscale image"]
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PlotError> {
    if bytes.is_empty() {
        return Err(PlotError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Mark ink pixels.
///
/// A pixel is ink when its luminance is below `threshold` (dark lines on
/// light paper). With `invert` set, pixels at or above `threshold` are ink
/// instead.
#[must_use]
pub fn binarize(gray: &GrayImage, threshold: u8, invert: bool) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let dark = gray.get_pixel(x, y).0[0] < threshold;
        image::Luma([if dark != invert { 255 } else { 0 }])
    })
}

/// Count ink pixels in a binary image.
#[must_use]
pub fn count_ink(binary: &GrayImage) -> u64 {
    binary.pixels().map(|p| u64::from(p.0[0] != 0)).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_and_grayscale(&[]);
        assert!(matches!(result, Err(PlotError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_and_grayscale(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PlotError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes_with_matching_dimensions() {
        let img = image::RgbaImage::from_fn(17, 31, |_, _| image::Rgba([255, 255, 255, 255]));
        let gray = decode_and_grayscale(&encode_png(&img)).unwrap();
        assert_eq!(gray.dimensions(), (17, 31));
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn dark_pixels_become_ink() {
        let mut gray = GrayImage::from_pixel(4, 1, image::Luma([200]));
        gray.put_pixel(1, 0, image::Luma([10]));
        gray.put_pixel(2, 0, image::Luma([127]));
        gray.put_pixel(3, 0, image::Luma([128]));

        let binary = binarize(&gray, 128, false);
        let values: Vec<u8> = binary.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![0, 255, 255, 0]);
        assert_eq!(count_ink(&binary), 2);
    }

    #[test]
    fn invert_swaps_ink_and_background() {
        let mut gray = GrayImage::from_pixel(3, 1, image::Luma([0]));
        gray.put_pixel(2, 0, image::Luma([250]));

        let binary = binarize(&gray, 128, true);
        let values: Vec<u8> = binary.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![0, 0, 255]);
    }

    #[test]
    fn zero_threshold_has_no_ink() {
        let gray = GrayImage::from_pixel(5, 5, image::Luma([0]));
        assert_eq!(count_ink(&binarize(&gray, 0, false)), 0);
    }
}
