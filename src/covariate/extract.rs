use geo::{Area, BooleanOps, BoundingRect, Polygon};

use crate::raster::RasterGrid;

/// A raster cell value with the fraction of its footprint inside a neighborhood.
#[derive(Debug, Clone, Copy)]
pub struct WeightedCell {
    pub value: f64,
    pub weight: f64, // in (0, 1]
}

/// Exact (area-weighted) extraction: each cell contributes the fraction of
/// its area covered by `neighborhood`, not a centroid-in/out vote. No-data
/// cells are excluded entirely, so they never enter a numerator or a
/// denominator downstream.
pub fn weighted_cells(grid: &RasterGrid, neighborhood: &Polygon<f64>) -> Vec<WeightedCell> {
    let Some(bbox) = neighborhood.bounding_rect() else { return Vec::new() };
    let Some((rows, cols)) = grid.window(&bbox) else { return Vec::new() };

    let cell_area = grid.cell_size() * grid.cell_size();
    let mut cells = Vec::new();
    for row in rows {
        for col in cols.clone() {
            let Some(value) = grid.value(row, col) else { continue };
            let clipped = neighborhood.intersection(&grid.cell_rect(row, col).to_polygon());
            let weight = clipped.unsigned_area() / cell_area;
            if weight > 0.0 {
                cells.push(WeightedCell { value, weight });
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString, Point};

    use crate::geom::disk;

    fn uniform_grid(rows: usize, cols: usize, value: f64) -> RasterGrid {
        RasterGrid::new(
            rows, cols, 0.0, 0.0, 10.0, -9999.0,
            vec![value; rows * cols],
        ).unwrap()
    }

    /// An axis-aligned square polygon, for exact weight arithmetic.
    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                Coord { x: x0, y: y0 },
                Coord { x: x1, y: y0 },
                Coord { x: x1, y: y1 },
                Coord { x: x0, y: y1 },
            ]),
            vec![],
        )
    }

    #[test]
    fn interior_cells_have_full_weight() {
        let grid = uniform_grid(4, 4, 7.0);
        // Exactly covers the four central cells.
        let cells = weighted_cells(&grid, &square(10.0, 10.0, 30.0, 30.0));
        assert_eq!(cells.len(), 4);
        for cell in &cells {
            assert_eq!(cell.value, 7.0);
            assert!((cell.weight - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn straddling_polygon_counts_cells_fractionally() {
        let grid = uniform_grid(2, 2, 1.0);
        // Covers the left half of both western cells and a quarter of nothing else.
        let cells = weighted_cells(&grid, &square(0.0, 0.0, 5.0, 20.0));
        assert_eq!(cells.len(), 2);
        let total: f64 = cells.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-9); // two half-cells
    }

    #[test]
    fn nodata_cells_are_skipped() {
        let grid = RasterGrid::new(
            1, 2, 0.0, 0.0, 10.0, -9999.0,
            vec![5.0, -9999.0],
        ).unwrap();
        let cells = weighted_cells(&grid, &square(0.0, 0.0, 20.0, 10.0));
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].value, 5.0);
    }

    #[test]
    fn polygon_outside_extent_yields_nothing() {
        let grid = uniform_grid(2, 2, 1.0);
        assert!(weighted_cells(&grid, &square(100.0, 100.0, 120.0, 120.0)).is_empty());
    }

    #[test]
    fn disk_weights_sum_close_to_disk_area() {
        let grid = uniform_grid(10, 10, 1.0);
        let radius = 25.0;
        let cells = weighted_cells(&grid, &disk(Point::new(50.0, 50.0), radius));
        let total_area: f64 = cells.iter().map(|c| c.weight * 100.0).sum();
        let disk_area = std::f64::consts::PI * radius * radius;
        assert!((total_area - disk_area).abs() / disk_area < 0.01);
    }
}
