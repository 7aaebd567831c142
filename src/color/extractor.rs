//! Mean color signatures for candidate tiles, computed across a worker pool

use crate::io::error::{MosaicError, Result};
use crate::io::image::load_rgb;
use image::RgbImage;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Color as red, green, blue channel values
pub type RgbColor = [u8; 3];

/// One indexable tile: stable identifier plus its mean color
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateTile {
    /// Filename inside the candidate directory
    pub identifier: String,
    /// Mean color of the decoded image
    pub color: RgbColor,
}

/// Mean color of an RGB pixel buffer
///
/// Channels are averaged independently and truncated toward zero.
///
/// # Errors
///
/// Returns an error if the image has no pixels
pub fn mean_color(image: &RgbImage) -> Result<RgbColor> {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return Err(MosaicError::InvalidSourceData {
            reason: format!(
                "cannot average an empty {}x{} image",
                image.width(),
                image.height()
            ),
        });
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, &channel) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += u64::from(channel);
        }
    }

    // Each mean is bounded by 255, so the narrowing cast is lossless
    Ok(sums.map(|sum| (sum / pixel_count) as u8))
}

/// Decode one candidate file and compute its signature
///
/// # Errors
///
/// Returns an error if the file cannot be decoded, has no usable filename,
/// or has no pixels
pub fn extract_candidate(path: &Path) -> Result<CandidateTile> {
    let identifier = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| MosaicError::InvalidSourceData {
            reason: format!("'{}' has no UTF-8 filename", path.display()),
        })?
        .to_string();

    let image = load_rgb(path)?;
    let color = mean_color(&image)?;

    Ok(CandidateTile { identifier, color })
}

/// Compute signatures for every candidate path in parallel
///
/// Output order follows `paths`, independent of worker completion order.
/// Files that fail to decode are dropped with a warning rather than failing
/// the whole pool.
pub fn extract_candidates(paths: &[PathBuf], progress: Option<&ProgressBar>) -> Vec<CandidateTile> {
    let results: Vec<Option<CandidateTile>> = paths
        .par_iter()
        .map(|path| {
            let outcome = extract_candidate(path);
            if let Some(bar) = progress {
                bar.inc(1);
            }
            match outcome {
                Ok(tile) => Some(tile),
                Err(error) => {
                    warn!(path = %path.display(), %error, "Dropping unreadable candidate");
                    None
                }
            }
        })
        .collect();

    let tiles: Vec<CandidateTile> = results.into_iter().flatten().collect();
    debug!(
        scanned = paths.len(),
        kept = tiles.len(),
        "Candidate colors extracted"
    );
    tiles
}
