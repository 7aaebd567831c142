//! Pipeline constants and runtime configuration defaults

use crate::io::error::{Result, invalid_parameter};
use std::path::PathBuf;

// Default file layout
/// Image to reconstruct
pub const DEFAULT_TARGET_PATH: &str = "input.jpg";
/// Video sampled for candidate tiles
pub const DEFAULT_VIDEO_PATH: &str = "input.mp4";
/// Flat directory holding one file per candidate tile
pub const DEFAULT_CANDIDATE_DIR: &str = "frames";
/// Composed canvas destination
pub const DEFAULT_OUTPUT_PATH: &str = "final_collage.jpg";

// Mosaic geometry
/// Edge length in pixels of each square output tile
pub const DEFAULT_TILE_SIZE: u32 = 64;
/// Longest side of the downscaled target; one grid cell per pixel
pub const DEFAULT_TARGET_MAX_SIZE: u32 = 256;

// Matching
/// Nearest candidates considered per cell before random selection
pub const DEFAULT_NEIGHBORS: usize = 5;
/// Fixed seed for reproducible tile selection
pub const DEFAULT_SEED: u64 = 42;

// Frame sampling
/// Frames per second requested from the extractor (ffmpeg rational syntax)
pub const DEFAULT_FRAME_RATE: &str = "1/2";
/// Longer edge in pixels of each extracted frame
pub const DEFAULT_FRAME_SIZE: u32 = 64;
/// Filename pattern handed to the extractor
pub const FRAME_FILE_PATTERN: &str = "frame_%06d.jpg";
/// Extensions recognized as candidate tiles
pub const CANDIDATE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

// Tile cache
/// Maximum decoded tiles held at once
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

// Safety limit to prevent excessive canvas allocation
/// Maximum allowed canvas dimension in pixels
pub const MAX_CANVAS_DIMENSION: u32 = 65_535;

/// Explicit settings threaded through every pipeline stage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicConfig {
    /// Image to reconstruct
    pub target: PathBuf,
    /// Directory of candidate tiles
    pub candidate_dir: PathBuf,
    /// Video to sample when the candidate directory is empty
    pub video: PathBuf,
    /// Where the composed canvas is written
    pub output: PathBuf,
    /// Square tile edge in output pixels
    pub tile_size: u32,
    /// Longest side of the downscaled target
    pub target_max_size: u32,
    /// Number of nearest candidates per cell (k)
    pub neighbors: usize,
    /// Frame sampling rate passed to the extractor
    pub frame_rate: String,
    /// Longer edge of extracted frames
    pub frame_size: u32,
    /// Tile cache bound
    pub cache_capacity: usize,
    /// Seed for the selection RNG
    pub seed: u64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from(DEFAULT_TARGET_PATH),
            candidate_dir: PathBuf::from(DEFAULT_CANDIDATE_DIR),
            video: PathBuf::from(DEFAULT_VIDEO_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            tile_size: DEFAULT_TILE_SIZE,
            target_max_size: DEFAULT_TARGET_MAX_SIZE,
            neighbors: DEFAULT_NEIGHBORS,
            frame_rate: DEFAULT_FRAME_RATE.to_string(),
            frame_size: DEFAULT_FRAME_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            seed: DEFAULT_SEED,
        }
    }
}

impl MosaicConfig {
    /// Reject settings no stage can work with
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error for zero sizes, zero k, a zero cache
    /// capacity, or an empty frame rate
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &self.tile_size,
                &"must be at least 1 pixel",
            ));
        }
        if self.target_max_size == 0 {
            return Err(invalid_parameter(
                "target_max_size",
                &self.target_max_size,
                &"must be at least 1 pixel",
            ));
        }
        if self.neighbors == 0 {
            return Err(invalid_parameter(
                "neighbors",
                &self.neighbors,
                &"at least one candidate is needed per cell",
            ));
        }
        if self.frame_size == 0 {
            return Err(invalid_parameter(
                "frame_size",
                &self.frame_size,
                &"must be at least 1 pixel",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(invalid_parameter(
                "cache_capacity",
                &self.cache_capacity,
                &"cache must hold at least one tile",
            ));
        }
        if self.frame_rate.trim().is_empty() {
            return Err(invalid_parameter(
                "frame_rate",
                &self.frame_rate,
                &"must not be empty",
            ));
        }
        Ok(())
    }
}
