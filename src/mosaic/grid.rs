//! Target grid: one color per mosaic cell, taken from the downscaled target

use crate::color::extractor::RgbColor;
use crate::io::error::{MosaicError, Result};
use image::RgbImage;
use ndarray::Array2;

/// Read-only cell colors indexed `[y, x]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetGrid {
    cells: Array2<RgbColor>,
}

impl TargetGrid {
    /// One cell per pixel of `image`
    ///
    /// # Errors
    ///
    /// Returns an error if the image has no pixels
    pub fn from_image(image: &RgbImage) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let cells = Array2::from_shape_fn((height, width), |(y, x)| {
            image.get_pixel(x as u32, y as u32).0
        });
        Self::from_cells(cells)
    }

    /// Wrap an already computed `[height, width]` color array
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero
    pub fn from_cells(cells: Array2<RgbColor>) -> Result<Self> {
        let (height, width) = cells.dim();
        if width == 0 || height == 0 {
            return Err(MosaicError::InvalidSourceData {
                reason: format!("target grid must not be empty (got {width}x{height})"),
            });
        }
        Ok(Self { cells })
    }

    /// Build from row-major colors
    ///
    /// # Errors
    ///
    /// Returns an error if `colors.len() != width * height` or the grid is empty
    pub fn from_row_major(width: usize, height: usize, colors: Vec<RgbColor>) -> Result<Self> {
        let count = colors.len();
        let cells = Array2::from_shape_vec((height, width), colors).map_err(|_shape_error| {
            MosaicError::InvalidSourceData {
                reason: format!("{count} colors cannot fill a {width}x{height} grid"),
            }
        })?;
        Self::from_cells(cells)
    }

    /// Cells per row
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Total cell count
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Color of cell `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Option<RgbColor> {
        self.cells.get([y, x]).copied()
    }

    /// Colors in row-major order (y outer, x inner)
    pub fn flatten(&self) -> Vec<RgbColor> {
        self.cells.iter().copied().collect()
    }

    /// Map a flat row-major index back to `(x, y)`
    pub fn position(&self, flat_index: usize) -> (usize, usize) {
        let width = self.width();
        (flat_index % width, flat_index / width)
    }
}
