//! Resizing and encoding. Everything here is CPU-bound and runs on the
//! blocking pool.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use mediadesk_core::{AppError, AppResult};

use super::params::{FitMode, ImageSize, ImageType};

/// Compute the output dimensions for a source of `src_w`×`src_h`.
pub fn target_dimensions(src_w: u32, src_h: u32, size: ImageSize, fit: FitMode) -> (u32, u32) {
    let (width, height) = match size {
        ImageSize::Default => return (src_w, src_h),
        ImageSize::Box { width, height } => (width, height),
    };
    let (sw, sh) = (f64::from(src_w.max(1)), f64::from(src_h.max(1)));
    let scaled = |scale: f64| {
        (
            ((sw * scale).round() as u32).max(1),
            ((sh * scale).round() as u32).max(1),
        )
    };

    match (width, height) {
        (None, None) => (src_w, src_h),
        (Some(w), Some(h)) => match fit {
            FitMode::Fit => scaled((f64::from(w) / sw).min(f64::from(h) / sh)),
            FitMode::ShrinkOnly => scaled((f64::from(w) / sw).min(f64::from(h) / sh).min(1.0)),
            FitMode::Fill => scaled((f64::from(w) / sw).max(f64::from(h) / sh)),
            FitMode::Exact | FitMode::Stretch => (w, h),
        },
        (Some(w), None) => match fit {
            FitMode::Stretch => (w, src_h),
            FitMode::ShrinkOnly => scaled((f64::from(w) / sw).min(1.0)),
            _ => scaled(f64::from(w) / sw),
        },
        (None, Some(h)) => match fit {
            FitMode::Stretch => (src_w, h),
            FitMode::ShrinkOnly => scaled((f64::from(h) / sh).min(1.0)),
            _ => scaled(f64::from(h) / sh),
        },
    }
}

/// Output settings shared by every render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderLimits {
    /// JPEG encoding quality.
    pub jpeg_quality: u8,
    /// Largest allowed output side in pixels.
    pub max_dimension: u32,
}

/// Decode `data`, resize it and encode the result as `output`.
///
/// Sides derived from the aspect ratio are checked against the limit too.
pub fn render(
    data: &[u8],
    size: ImageSize,
    fit: FitMode,
    output: ImageType,
    limits: RenderLimits,
) -> AppResult<Vec<u8>> {
    let source = image::load_from_memory(data)?;
    let (w, h) = target_dimensions(source.width(), source.height(), size, fit);
    if w.max(h) > limits.max_dimension && (w, h) != (source.width(), source.height()) {
        return Err(AppError::validation(format!(
            "Derived image size {w}x{h} exceeds the {}px limit",
            limits.max_dimension
        )));
    }

    let resized = if (w, h) == (source.width(), source.height()) {
        source
    } else {
        match (fit, size) {
            (FitMode::Exact, ImageSize::Box { width: Some(_), height: Some(_) }) => {
                source.resize_to_fill(w, h, FilterType::Lanczos3)
            }
            _ => source.resize_exact(w, h, FilterType::Lanczos3),
        }
    };

    encode(&resized, output, limits.jpeg_quality)
}

fn encode(img: &DynamicImage, output: ImageType, jpeg_quality: u8) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    match output {
        ImageType::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality.clamp(1, 100));
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageType::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut Cursor::new(&mut buf), output.format())?;
        }
        ImageType::Png => {
            img.write_to(&mut Cursor::new(&mut buf), output.format())?;
        }
    }
    Ok(buf)
}
