//! Input/output boundaries and pipeline orchestration

/// Command-line interface
pub mod cli;
/// Default constants and the explicit run configuration
pub mod configuration;
/// Error types and stage tagging
pub mod error;
/// Candidate discovery and ffmpeg frame sampling
pub mod frames;
/// Image decode, resampling and export
pub mod image;
/// Stage ordering from target image to saved canvas
pub mod pipeline;
/// Progress bar management
pub mod progress;
