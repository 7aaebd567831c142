//! Error types and stage context for mosaic pipeline operations

use std::fmt;
use std::path::PathBuf;

/// Pipeline phase in which an error surfaced
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PipelineStage {
    /// Loading and downscaling the target image
    ResizeTarget,
    /// Ensuring the candidate frame directory is populated
    PrepareCandidates,
    /// Computing mean colors for every candidate
    ExtractColors,
    /// Building the nearest-color index
    BuildIndex,
    /// Compositing tiles onto the output canvas
    Assemble,
    /// Writing the finished canvas to disk
    SaveOutput,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResizeTarget => "resize target",
            Self::PrepareCandidates => "prepare candidates",
            Self::ExtractColors => "extract colors",
            Self::BuildIndex => "build index",
            Self::Assemble => "assemble mosaic",
            Self::SaveOutput => "save output",
        };
        f.write_str(name)
    }
}

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Failed to decode an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// Failed to save the composed canvas
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// No candidate tiles are available to index
    EmptyCandidatePool {
        /// Directory that was scanned for candidates
        directory: PathBuf,
    },

    /// Nearest-neighbor query asked for more results than the index holds
    NeighborCountExceedsPool {
        /// Number of neighbors requested per point
        requested: usize,
        /// Number of indexed colors
        available: usize,
    },

    /// External frame extraction tool missing or failed
    ExtractionUnavailable {
        /// Program that was invoked
        tool: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Input data doesn't meet pipeline requirements
    InvalidSourceData {
        /// Description of what's wrong with the data
        reason: String,
    },

    /// Assembly was aborted by the caller between cells
    Cancelled {
        /// Cells composited before the abort
        completed: usize,
        /// Total cells in the grid
        total: usize,
    },

    /// Error tagged with the pipeline stage that produced it
    Stage {
        /// Failing stage
        stage: PipelineStage,
        /// Underlying error
        source: Box<MosaicError>,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::EmptyCandidatePool { directory } => {
                write!(
                    f,
                    "No usable candidate tiles found in '{}'",
                    directory.display()
                )
            }
            Self::NeighborCountExceedsPool {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Requested {requested} nearest neighbors but only {available} colors are indexed"
                )
            }
            Self::ExtractionUnavailable { tool, reason } => {
                write!(f, "Frame extraction with '{tool}' failed: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::Cancelled { completed, total } => {
                write!(f, "Assembly cancelled after {completed} of {total} cells")
            }
            Self::Stage { stage, source } => {
                write!(f, "Stage '{stage}' failed: {source}")
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl MosaicError {
    /// Stage that produced this error, if it was tagged
    pub const fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error with all stage tags removed
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Tags errors with the pipeline stage they occurred in
pub trait WithStage<T> {
    /// Wrap the error, if any, in a [`MosaicError::Stage`]
    ///
    /// An error already tagged keeps its innermost stage.
    ///
    /// # Errors
    ///
    /// Propagates the original error with the stage applied
    fn in_stage(self, stage: PipelineStage) -> Result<T>;
}

impl<T, E> WithStage<T> for std::result::Result<T, E>
where
    E: Into<MosaicError>,
{
    fn in_stage(self, stage: PipelineStage) -> Result<T> {
        self.map_err(|e| match e.into() {
            tagged @ MosaicError::Stage { .. } => tagged,
            error => MosaicError::Stage {
                stage,
                source: Box::new(error),
            },
        })
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
