//! Candidate pool discovery and frame sampling through ffmpeg

use crate::io::configuration::{CANDIDATE_EXTENSIONS, FRAME_FILE_PATTERN};
use crate::io::error::{MosaicError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// Produces still frames from a video into a directory
pub trait FrameExtractor {
    /// Sample `video` at `frame_rate`, scaling the longer edge to `frame_size`,
    /// writing sequentially numbered images into `output_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unavailable or reports failure
    fn extract(
        &self,
        video: &Path,
        output_dir: &Path,
        frame_rate: &str,
        frame_size: u32,
    ) -> Result<()>;
}

/// Invokes the `ffmpeg` executable
#[derive(Clone, Debug)]
pub struct FfmpegExtractor {
    program: PathBuf,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegExtractor {
    /// Use the executable at `program` (a bare name is resolved through `PATH`)
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Video filter sampling at `frame_rate` and fitting the longer edge to `frame_size`
    pub fn filter_graph(frame_rate: &str, frame_size: u32) -> String {
        format!(
            "fps={frame_rate},scale='if(gte(iw,ih),{frame_size},-1)':'if(gte(iw,ih),-1,{frame_size})'"
        )
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(
        &self,
        video: &Path,
        output_dir: &Path,
        frame_rate: &str,
        frame_size: u32,
    ) -> Result<()> {
        if !video.is_file() {
            return Err(MosaicError::ExtractionUnavailable {
                tool: "ffmpeg",
                reason: format!("video '{}' does not exist", video.display()),
            });
        }

        std::fs::create_dir_all(output_dir).map_err(|e| MosaicError::FileSystem {
            path: output_dir.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;

        info!(video = %video.display(), frame_rate, frame_size, "Sampling frames");

        let output = Command::new(&self.program)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-vf")
            .arg(Self::filter_graph(frame_rate, frame_size))
            .arg(output_dir.join(FRAME_FILE_PATTERN))
            .output()
            .map_err(|e| MosaicError::ExtractionUnavailable {
                tool: "ffmpeg",
                reason: format!("could not start '{}': {e}", self.program.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MosaicError::ExtractionUnavailable {
                tool: "ffmpeg",
                reason: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}

fn is_candidate_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                CANDIDATE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
}

/// Candidate image files in `directory`, sorted by filename
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read
pub fn list_candidates(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let read_error = |e: std::io::Error| MosaicError::FileSystem {
        path: directory.to_path_buf(),
        operation: "read directory",
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if is_candidate_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run the extractor only when `directory` holds no candidates yet
///
/// Returns whether extraction ran.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or extraction fails
pub fn ensure_candidates(
    extractor: &dyn FrameExtractor,
    directory: &Path,
    video: &Path,
    frame_rate: &str,
    frame_size: u32,
) -> Result<bool> {
    if !list_candidates(directory)?.is_empty() {
        info!(directory = %directory.display(), "Reusing existing candidate pool");
        return Ok(false);
    }

    extractor.extract(video, directory, frame_rate, frame_size)?;
    Ok(true)
}
