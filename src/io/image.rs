//! Codec boundary: decode, resample, and save RGB images

use crate::io::error::{MosaicError, Result};
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::path::Path;

/// Decode any supported image file into 8-bit RGB
///
/// # Errors
///
/// Returns an error if the file is missing or cannot be decoded
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).map_err(|e| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(image.to_rgb8())
}

/// Decode a candidate and resample it to a `tile_size` square
///
/// # Errors
///
/// Returns an error if the file is missing or cannot be decoded
pub fn load_tile(path: &Path, tile_size: u32) -> Result<RgbImage> {
    let image = load_rgb(path)?;
    Ok(imageops::resize(
        &image,
        tile_size,
        tile_size,
        FilterType::Lanczos3,
    ))
}

/// Dimensions after scaling the longest side down or up to `max_size`
///
/// Aspect ratio is kept; neither side collapses below one pixel.
pub fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let longest = width.max(height).max(1);
    let scale = |side: u32| {
        let scaled = u64::from(side) * u64::from(max_size) / u64::from(longest);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    };
    (scale(width), scale(height))
}

/// Resample `image` so its longest side equals `max_size`
pub fn resize_to_fit(image: &RgbImage, max_size: u32) -> RgbImage {
    let (width, height) = fit_within(image.width(), image.height(), max_size);
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Write the canvas, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded to the path's format
pub fn save_canvas(canvas: &RgbImage, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    canvas
        .save(output_path)
        .map_err(|e| MosaicError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
