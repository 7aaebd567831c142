//! Command-line interface mapping flags onto a mosaic configuration

use crate::io::configuration::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CANDIDATE_DIR, DEFAULT_FRAME_RATE, DEFAULT_FRAME_SIZE,
    DEFAULT_NEIGHBORS, DEFAULT_OUTPUT_PATH, DEFAULT_SEED, DEFAULT_TARGET_MAX_SIZE,
    DEFAULT_TARGET_PATH, DEFAULT_TILE_SIZE, DEFAULT_VIDEO_PATH, MosaicConfig,
};
use crate::io::error::Result;
use crate::io::pipeline::{MosaicPipeline, MosaicReport};
use crate::io::progress::ProgressManager;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framemosaic")]
#[command(
    author,
    version,
    about = "Rebuild an image as a mosaic of video frames"
)]
/// Command-line arguments for the mosaic builder
pub struct Cli {
    /// Image to reconstruct
    #[arg(short, long, default_value = DEFAULT_TARGET_PATH)]
    pub target: PathBuf,

    /// Directory of candidate tiles (filled from the video when empty)
    #[arg(short, long, default_value = DEFAULT_CANDIDATE_DIR)]
    pub frames: PathBuf,

    /// Video sampled for candidate tiles
    #[arg(long, default_value = DEFAULT_VIDEO_PATH)]
    pub video: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Edge length of each output tile in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// Longest side of the downscaled target (cells per side)
    #[arg(long, default_value_t = DEFAULT_TARGET_MAX_SIZE)]
    pub grid_size: u32,

    /// Nearest candidates considered per cell
    #[arg(short, long, default_value_t = DEFAULT_NEIGHBORS)]
    pub neighbors: usize,

    /// Frame sampling rate passed to ffmpeg (e.g. 1/2)
    #[arg(long, default_value = DEFAULT_FRAME_RATE)]
    pub frame_rate: String,

    /// Longer edge of extracted frames in pixels
    #[arg(long, default_value_t = DEFAULT_FRAME_SIZE)]
    pub frame_size: u32,

    /// Maximum decoded tiles kept in memory
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    /// Random seed for reproducible tile selection
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Log filter implied by the flags; `RUST_LOG` takes precedence when set
    pub fn log_filter(&self) -> EnvFilter {
        let level = if self.verbose { "debug" } else { "warn" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }

    /// Configuration described by the flags
    pub fn to_config(&self) -> MosaicConfig {
        MosaicConfig {
            target: self.target.clone(),
            candidate_dir: self.frames.clone(),
            video: self.video.clone(),
            output: self.output.clone(),
            tile_size: self.tile_size,
            target_max_size: self.grid_size,
            neighbors: self.neighbors,
            frame_rate: self.frame_rate.clone(),
            frame_size: self.frame_size,
            cache_capacity: self.cache_capacity,
            seed: self.seed,
        }
    }

    /// Install the log subscriber and run the pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or any stage fails
    pub fn run(&self) -> Result<MosaicReport> {
        // A subscriber may already be installed when embedded in another program
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .try_init();

        let progress = if self.should_show_progress() {
            ProgressManager::new()
        } else {
            ProgressManager::hidden()
        };

        MosaicPipeline::new(self.to_config())?
            .with_progress(progress)
            .run()
    }
}
