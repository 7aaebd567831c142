//! Mosaic composition
//!
//! This module contains:
//! - The target grid derived from the downscaled image
//! - The bounded tile cache
//! - Candidate selection and canvas assembly

/// Candidate selection and canvas composition
pub mod assembler;
/// Bounded LRU cache of decoded tiles
pub mod cache;
/// Per-cell target colors
pub mod grid;

pub use assembler::MosaicAssembler;
pub use cache::TileCache;
pub use grid::TargetGrid;
