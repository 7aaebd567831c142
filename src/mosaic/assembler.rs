//! Tile selection and canvas composition
//!
//! Every cell takes the `k` nearest candidates from one bulk index query and
//! picks among them uniformly at random. Choosing only the nearest repeats the
//! same tile across flat regions; the random pick spreads usage over near
//! matches while a fixed seed keeps runs reproducible.

use crate::color::index::CandidatePool;
use crate::io::configuration::MAX_CANVAS_DIMENSION;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::mosaic::cache::{TileCache, TileLoader};
use crate::mosaic::grid::TargetGrid;
use image::{RgbImage, imageops};
use indicatif::ProgressBar;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Seeded uniform choice among a cell's nearest candidates
pub struct CandidateSelector {
    rng: StdRng,
}

impl CandidateSelector {
    /// Create a deterministic selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick one entry of `candidates` uniformly at random
    pub fn choose(&mut self, candidates: &[usize]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        let pick = self.rng.random_range(0..candidates.len());
        candidates.get(pick).copied()
    }
}

/// Composes a target grid out of candidate tiles
pub struct MosaicAssembler<'a> {
    pool: &'a CandidatePool,
    neighbors: usize,
    selector: CandidateSelector,
    progress: Option<ProgressBar>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> MosaicAssembler<'a> {
    /// Assemble from `pool`, drawing each cell among its `neighbors` nearest
    pub fn new(pool: &'a CandidatePool, neighbors: usize, seed: u64) -> Self {
        Self {
            pool,
            neighbors,
            selector: CandidateSelector::new(seed),
            progress: None,
            cancel: None,
        }
    }

    /// Advance `bar` by one per composited cell
    #[must_use]
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Stop before the next cell once `flag` is set
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Build the output canvas for `target`
    ///
    /// The canvas is `width * tile_size` by `height * tile_size`; cell `(x, y)`
    /// is pasted at `(x * tile_size, y * tile_size)`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `neighbors` is zero or larger than the candidate pool
    /// - The canvas would exceed the maximum dimension
    /// - A chosen tile cannot be loaded (the run is aborted, nothing is skipped)
    /// - A loaded tile does not match the cache's tile size
    /// - The cancellation flag was raised
    pub fn assemble<L: TileLoader>(
        &mut self,
        target: &TargetGrid,
        cache: &mut TileCache<L>,
    ) -> Result<RgbImage> {
        let tile_size = cache.tile_size();
        let canvas_width = canvas_dimension("canvas_width", target.width(), tile_size)?;
        let canvas_height = canvas_dimension("canvas_height", target.height(), tile_size)?;

        let colors = target.flatten();
        let neighbors = self.pool.index().query(&colors, self.neighbors)?;
        let total = neighbors.len();

        let mut canvas = RgbImage::new(canvas_width, canvas_height);

        for (flat_index, candidates) in neighbors.rows().enumerate() {
            if self
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
            {
                return Err(MosaicError::Cancelled {
                    completed: flat_index,
                    total,
                });
            }

            let (x, y) = target.position(flat_index);
            let chosen = self
                .selector
                .choose(candidates)
                .ok_or_else(|| MosaicError::InvalidSourceData {
                    reason: format!("no candidates returned for cell ({x}, {y})"),
                })?;
            let identifier =
                self.pool
                    .identifier(chosen)
                    .ok_or_else(|| MosaicError::InvalidSourceData {
                        reason: format!("index returned unknown candidate {chosen}"),
                    })?;

            let tile = cache.get(identifier)?;
            if tile.dimensions() != (tile_size, tile_size) {
                return Err(MosaicError::InvalidSourceData {
                    reason: format!(
                        "tile '{identifier}' is {}x{}, expected {tile_size}x{tile_size}",
                        tile.width(),
                        tile.height()
                    ),
                });
            }

            imageops::replace(
                &mut canvas,
                tile,
                i64::from(x as u32 * tile_size),
                i64::from(y as u32 * tile_size),
            );

            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
        }

        debug!(
            cells = total,
            hits = cache.stats.hits,
            misses = cache.stats.misses,
            evictions = cache.stats.evictions,
            "Mosaic assembled"
        );

        Ok(canvas)
    }
}

fn canvas_dimension(parameter: &'static str, cells: usize, tile_size: u32) -> Result<u32> {
    u32::try_from(cells)
        .ok()
        .and_then(|cells| cells.checked_mul(tile_size))
        .filter(|&pixels| pixels <= MAX_CANVAS_DIMENSION)
        .ok_or_else(|| {
            invalid_parameter(
                parameter,
                &format!("{cells} cells x {tile_size}px"),
                &format!("canvas side must not exceed {MAX_CANVAS_DIMENSION} pixels"),
            )
        })
}
