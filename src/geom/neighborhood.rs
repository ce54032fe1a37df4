use geo::{Coord, LineString, Point, Polygon};

// Segment count for the polygonal disk approximation.
const DISK_SEGMENTS: usize = 64;

/// Covariate-extraction radius for a raster: 2.5 cell-widths, rounded up to
/// whole units, so each neighborhood spans at least one full cell even after
/// reprojection or resampling. Identical for every neighborhood in a run.
pub fn neighborhood_radius(cell_size: f64) -> f64 {
    5.0 * cell_size.ceil() / 2.0
}

/// Build a closed polygon approximating the disk of `radius` around `center`.
pub fn disk(center: Point<f64>, radius: f64) -> Polygon<f64> {
    let ring = (0..DISK_SEGMENTS)
        .map(|i| {
            let theta = (i as f64 / DISK_SEGMENTS as f64) * std::f64::consts::TAU;
            Coord {
                x: center.x() + radius * theta.cos(),
                y: center.y() + radius * theta.sin(),
            }
        })
        .collect::<Vec<_>>();
    Polygon::new(LineString::from(ring), vec![])
}
