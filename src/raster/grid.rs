use std::ops::Range;

use anyhow::{Result, ensure};
use geo::{Coord, Rect};

/// A single-band georeferenced grid with square cells and a no-data marker.
///
/// Values are stored row-major with row 0 at the northern edge, matching the
/// on-disk order of ESRI ASCII grids. Coordinates are in the raster's own
/// CRS (meters for the sinusoidal land-cover and elevation sources).
#[derive(Debug, Clone)]
pub struct RasterGrid {
    rows: usize,
    cols: usize,
    xll: f64,       // x of the lower-left corner
    yll: f64,       // y of the lower-left corner
    cell_size: f64,
    nodata: f64,
    values: Vec<f64>,
}

impl RasterGrid {
    /// Construct a grid from row-major values (row 0 = northernmost).
    pub fn new(
        rows: usize, cols: usize,
        xll: f64, yll: f64,
        cell_size: f64, nodata: f64,
        values: Vec<f64>,
    ) -> Result<Self> {
        ensure!(rows > 0 && cols > 0, "raster must have at least one cell");
        ensure!(cell_size > 0.0, "cell size must be positive, got {cell_size}");
        ensure!(
            values.len() == rows * cols,
            "expected {} values for a {rows}x{cols} raster, got {}",
            rows * cols, values.len()
        );
        Ok(Self { rows, cols, xll, yll, cell_size, nodata, values })
    }

    /// Get the number of rows in the grid.
    #[inline] pub fn rows(&self) -> usize { self.rows }

    /// Get the number of columns in the grid.
    #[inline] pub fn cols(&self) -> usize { self.cols }

    /// Get the cell edge length, in CRS units.
    #[inline] pub fn cell_size(&self) -> f64 { self.cell_size }

    /// Check whether a raw value is the no-data marker (or non-finite).
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        !value.is_finite() || value == self.nodata
    }

    /// Get the value at (row, col), or None for no-data or out-of-bounds cells.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols { return None; }
        let v = self.values[row * self.cols + col];
        (!self.is_nodata(v)).then_some(v)
    }

    /// Compute the full extent of the grid.
    pub fn extent(&self) -> Rect<f64> {
        Rect::new(
            Coord { x: self.xll, y: self.yll },
            Coord {
                x: self.xll + self.cols as f64 * self.cell_size,
                y: self.yll + self.rows as f64 * self.cell_size,
            },
        )
    }

    /// Compute the square footprint of the cell at (row, col).
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect<f64> {
        let x0 = self.xll + col as f64 * self.cell_size;
        let y1 = self.yll + (self.rows - row) as f64 * self.cell_size;
        Rect::new(
            Coord { x: x0, y: y1 - self.cell_size },
            Coord { x: x0 + self.cell_size, y: y1 },
        )
    }

    /// Row and column ranges of cells whose footprints intersect `rect`,
    /// clamped to the grid. Returns None when the rectangle misses the grid.
    pub fn window(&self, rect: &Rect<f64>) -> Option<(Range<usize>, Range<usize>)> {
        let extent = self.extent();
        if rect.max().x <= extent.min().x || rect.min().x >= extent.max().x
            || rect.max().y <= extent.min().y || rect.min().y >= extent.max().y
        {
            return None;
        }

        let col0 = ((rect.min().x - self.xll) / self.cell_size).floor().max(0.0) as usize;
        let col1 = (((rect.max().x - self.xll) / self.cell_size).ceil() as usize).min(self.cols);

        // Row 0 is at the top, so rows count down from the northern edge.
        let top = self.yll + self.rows as f64 * self.cell_size;
        let row0 = ((top - rect.max().y) / self.cell_size).floor().max(0.0) as usize;
        let row1 = (((top - rect.min().y) / self.cell_size).ceil() as usize).min(self.rows);

        (row0 < row1 && col0 < col1).then_some((row0..row1, col0..col1))
    }
}
