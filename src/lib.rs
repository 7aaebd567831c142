//! Photo mosaics assembled from video frames
//!
//! A target image is downscaled to a grid of cells. Every candidate tile gets
//! a mean color, the colors go into a k-d tree, and each cell is filled with
//! one of its k nearest candidates chosen by a seeded random draw.

#![forbid(unsafe_code)]

/// Candidate color signatures and the nearest-color index
pub mod color;
/// Input/output, configuration, pipeline driver and error handling
pub mod io;
/// Target grid, tile cache and mosaic assembly
pub mod mosaic;

pub use io::error::{MosaicError, Result};
