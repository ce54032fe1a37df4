use anyhow::Result;
use geo::Point;
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::error::PipelineError;

/// MODIS sinusoidal equal-area CRS, the native projection of the land-cover
/// source. Equal-area is required for unbiased cell counting.
pub const SINUSOIDAL_CRS: &str =
    "+proj=sinu +lon_0=0 +x_0=0 +y_0=0 +R=6371007.181 +units=m +no_defs";

const WGS84_CRS: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Transforms WGS84 observation coordinates into the raster CRS.
pub struct Projector {
    from: Proj4,
    to: Proj4,
}

impl Projector {
    /// Build a projector from WGS84 lon/lat to the given PROJ.4 target CRS.
    pub fn new(target_crs: &str) -> Result<Self> {
        let from = Proj4::from_proj_string(WGS84_CRS)
            .map_err(|e| PipelineError::Projection(format!("source CRS: {e}")))?;
        let to = Proj4::from_proj_string(target_crs)
            .map_err(|e| PipelineError::Projection(format!("target CRS '{target_crs}': {e}")))?;
        Ok(Self { from, to })
    }

    /// Project a WGS84 (latitude, longitude) pair into the target CRS.
    /// Degrees in, target units (meters) out.
    pub fn project(&self, lat: f64, lon: f64) -> Result<Point<f64>> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(PipelineError::InvalidCoordinate { lat, lon }.into());
        }

        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| PipelineError::Projection(format!("transform ({lat}, {lon}): {e}")))?;
        Ok(Point::new(point.0, point.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f64 = 6371007.181;

    #[test]
    fn sinusoidal_equator_scales_by_radius() {
        let proj = Projector::new(SINUSOIDAL_CRS).unwrap();
        let p = proj.project(0.0, 1.0).unwrap();
        assert!((p.x() - R * 1.0_f64.to_radians()).abs() < 1.0);
        assert!(p.y().abs() < 1.0);
    }

    #[test]
    fn sinusoidal_meridian_preserves_latitude_arc() {
        let proj = Projector::new(SINUSOIDAL_CRS).unwrap();
        let p = proj.project(45.0, 0.0).unwrap();
        assert!(p.x().abs() < 1.0);
        assert!((p.y() - R * 45.0_f64.to_radians()).abs() < 1.0);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let proj = Projector::new(SINUSOIDAL_CRS).unwrap();
        assert!(proj.project(91.0, 0.0).is_err());
        assert!(proj.project(-90.5, 0.0).is_err());
        assert!(proj.project(0.0, 181.0).is_err());
    }

    #[test]
    fn unresolvable_target_crs_fails() {
        assert!(Projector::new("+proj=not_a_projection").is_err());
    }
}
