//! Image normalization before OCR: grayscale, global binarization and
//! median denoising. Deterministic for a given input.

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::median_filter;
use thiserror::Error;

use crate::document::{EmbeddedImage, ImageData, RawColor};

/// Images smaller than this in either dimension are decorations, not text.
pub const MIN_DIMENSION: u32 = 8;

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Sample buffer of {actual} bytes does not fit {width}x{height} ({expected} bytes expected)")]
    SampleSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported image encoding: {0}")]
    Unsupported(String),
}

/// Decode an embedded image into pixels.
pub fn decode(image: &EmbeddedImage) -> Result<DynamicImage, ImageDecodeError> {
    match &image.data {
        ImageData::Encoded(bytes) => Ok(image::load_from_memory(bytes)?),
        ImageData::Raw { color, samples } => decode_raw(image.width, image.height, *color, samples),
        ImageData::Unsupported(what) => Err(ImageDecodeError::Unsupported(what.clone())),
    }
}

fn decode_raw(
    width: u32,
    height: u32,
    color: RawColor,
    samples: &[u8],
) -> Result<DynamicImage, ImageDecodeError> {
    let expected = width as usize * height as usize * color.channels();
    let size_error = || ImageDecodeError::SampleSize {
        width,
        height,
        expected,
        actual: samples.len(),
    };
    if samples.len() < expected || expected == 0 {
        return Err(size_error());
    }
    let samples = &samples[..expected];

    match color {
        RawColor::Gray => GrayImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(size_error),
        RawColor::Rgb => RgbImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(size_error),
        RawColor::Cmyk => {
            let rgb: Vec<u8> = samples
                .chunks_exact(4)
                .flat_map(|px| {
                    let k = 255 - px[3] as u16;
                    let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
                    [channel(px[0]), channel(px[1]), channel(px[2])]
                })
                .collect();
            RgbImage::from_raw(width, height, rgb)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(size_error)
        }
    }
}

/// Whether an image is too small to hold legible text.
pub fn is_decoration(width: u32, height: u32) -> bool {
    width < MIN_DIMENSION || height < MIN_DIMENSION
}

/// Grayscale, Otsu binarization, then a median filter of `denoise_radius`
/// (0 disables denoising).
pub fn preprocess(image: &DynamicImage, denoise_radius: u32) -> GrayImage {
    let gray = image.to_luma8();
    let binary = binarize(&gray);
    if denoise_radius == 0 {
        binary
    } else {
        median_filter(&binary, denoise_radius, denoise_radius)
    }
}

/// Global threshold chosen by Otsu's method: dark text on white.
fn binarize(gray: &GrayImage) -> GrayImage {
    threshold(gray, otsu_level(gray), ThresholdType::Binary)
}
