//! Per-stage progress bars for the mosaic pipeline

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix:>18} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Coordinates the extraction and assembly progress displays
///
/// When hidden, bars are still created so callers can tick them
/// unconditionally; nothing is drawn.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    stage_bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Draw bars to the terminal
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            stage_bars: Vec::new(),
        }
    }

    /// Track progress without drawing anything
    pub fn hidden() -> Self {
        Self {
            multi_progress: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            stage_bars: Vec::new(),
        }
    }

    /// Add a bar for a stage with `len` units of work
    pub fn start_stage(&mut self, label: &str, len: usize) -> ProgressBar {
        let bar = self.multi_progress.add(ProgressBar::new(len as u64));
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(label.to_string());
        self.stage_bars.push(bar.clone());
        bar
    }

    /// Mark a stage bar complete
    pub fn complete_stage(bar: &ProgressBar) {
        bar.finish();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        for bar in &self.stage_bars {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
        let _ = self.multi_progress.clear();
    }
}
