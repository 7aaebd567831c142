//! Stage ordering: resize target, ensure candidates, index, assemble, save

use crate::color::extractor::extract_candidates;
use crate::color::index::CandidatePool;
use crate::io::configuration::MosaicConfig;
use crate::io::error::{MosaicError, PipelineStage, Result, WithStage};
use crate::io::frames::{FfmpegExtractor, FrameExtractor, ensure_candidates, list_candidates};
use crate::io::image::{load_rgb, resize_to_fit, save_canvas};
use crate::io::progress::ProgressManager;
use crate::mosaic::assembler::MosaicAssembler;
use crate::mosaic::cache::{DirectoryTileLoader, TileCache};
use crate::mosaic::grid::TargetGrid;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::{info, warn};

/// Summary of a completed run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicReport {
    /// Where the canvas was written
    pub output: PathBuf,
    /// Grid width in cells
    pub grid_width: usize,
    /// Grid height in cells
    pub grid_height: usize,
    /// Candidates that made it into the index
    pub candidates: usize,
    /// Neighbors actually used per cell after clamping
    pub neighbors: usize,
    /// Whether frames were extracted during this run
    pub extracted_frames: bool,
}

/// Runs every stage for one configuration
pub struct MosaicPipeline {
    config: MosaicConfig,
    extractor: Box<dyn FrameExtractor>,
    progress: ProgressManager,
    cancel: Option<Arc<AtomicBool>>,
}

impl MosaicPipeline {
    /// Pipeline using ffmpeg for frame extraction and terminal progress bars
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: MosaicConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: Box::new(FfmpegExtractor::default()),
            progress: ProgressManager::new(),
            cancel: None,
        })
    }

    /// Replace the frame extractor
    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn FrameExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the progress display
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = progress;
        self
    }

    /// Abort assembly between cells once `flag` is set
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Configuration in effect
    pub const fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Execute all stages; the output file is written only if every stage succeeds
    ///
    /// # Errors
    ///
    /// Returns the first failure tagged with its [`PipelineStage`]
    pub fn run(&mut self) -> Result<MosaicReport> {
        let result = self.run_stages();
        self.progress.finish();
        result
    }

    fn run_stages(&mut self) -> Result<MosaicReport> {
        let start = Instant::now();
        let config = self.config.clone();

        let target = load_rgb(&config.target)
            .and_then(|image| TargetGrid::from_image(&resize_to_fit(&image, config.target_max_size)))
            .in_stage(PipelineStage::ResizeTarget)?;
        info!(
            width = target.width(),
            height = target.height(),
            "Target grid ready"
        );

        let extracted_frames = ensure_candidates(
            self.extractor.as_ref(),
            &config.candidate_dir,
            &config.video,
            &config.frame_rate,
            config.frame_size,
        )
        .in_stage(PipelineStage::PrepareCandidates)?;

        let paths = list_candidates(&config.candidate_dir).in_stage(PipelineStage::ExtractColors)?;
        let extraction_bar = self.progress.start_stage("Extracting colors", paths.len());
        let tiles = extract_candidates(&paths, Some(&extraction_bar));
        ProgressManager::complete_stage(&extraction_bar);

        if tiles.is_empty() {
            return Err(MosaicError::EmptyCandidatePool {
                directory: config.candidate_dir.clone(),
            })
            .in_stage(PipelineStage::BuildIndex);
        }
        let pool = CandidatePool::build(tiles).in_stage(PipelineStage::BuildIndex)?;
        info!(candidates = pool.len(), "Color index built");

        let neighbors = if config.neighbors > pool.len() {
            warn!(
                requested = config.neighbors,
                available = pool.len(),
                "Fewer candidates than requested neighbors; clamping k to the pool size"
            );
            pool.len()
        } else {
            config.neighbors
        };

        let loader = DirectoryTileLoader::new(&config.candidate_dir);
        let mut cache = TileCache::new(loader, config.tile_size, config.cache_capacity)
            .in_stage(PipelineStage::Assemble)?;

        let assembly_bar = self.progress.start_stage("Building mosaic", target.len());
        let mut assembler =
            MosaicAssembler::new(&pool, neighbors, config.seed).with_progress(assembly_bar.clone());
        if let Some(flag) = &self.cancel {
            assembler = assembler.with_cancellation(Arc::clone(flag));
        }
        let canvas = assembler
            .assemble(&target, &mut cache)
            .in_stage(PipelineStage::Assemble)?;
        ProgressManager::complete_stage(&assembly_bar);

        save_canvas(&canvas, &config.output).in_stage(PipelineStage::SaveOutput)?;
        info!(
            output = %config.output.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Mosaic saved"
        );

        Ok(MosaicReport {
            output: config.output,
            grid_width: target.width(),
            grid_height: target.height(),
            candidates: pool.len(),
            neighbors,
            extracted_frames,
        })
    }
}
