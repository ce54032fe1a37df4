use ahash::AHashMap;
use anyhow::{Result, ensure};
use geo::{BoundingRect, Point, Polygon, Rect};
use rstar::{AABB, RTree};

use crate::geom::{BoundingBox, Projector, disk};
use crate::types::LocalityId;

/// One buffered neighborhood polygon per distinct observation location,
/// projected into the raster CRS, with an R-tree over the footprints for
/// extent queries. Every neighborhood in an index has the same radius; the
/// same geometry serves land-cover (per year) and elevation extraction.
#[derive(Debug)]
pub struct GeometryIndex {
    localities: Vec<LocalityId>,
    index: AHashMap<LocalityId, u32>,
    centers: Vec<Point<f64>>,
    neighborhoods: Vec<Polygon<f64>>,
    rtree: RTree<BoundingBox>,
    radius: f64,
}

impl GeometryIndex {
    /// Build neighborhoods for a set of (locality, latitude, longitude) rows.
    /// Duplicate localities keep their first coordinates; out-of-range
    /// coordinates or an unresolvable projection fail the whole build.
    pub fn build(
        locations: impl IntoIterator<Item = (LocalityId, f64, f64)>,
        projector: &Projector,
        radius: f64,
    ) -> Result<Self> {
        ensure!(radius > 0.0, "neighborhood radius must be positive, got {radius}");

        let mut localities = Vec::new();
        let mut index = AHashMap::new();
        let mut centers = Vec::new();
        let mut neighborhoods = Vec::new();

        for (locality, lat, lon) in locations {
            if index.contains_key(&locality) { continue; }
            let center = projector.project(lat, lon)?;
            index.insert(locality.clone(), localities.len() as u32);
            localities.push(locality);
            centers.push(center);
            neighborhoods.push(disk(center, radius));
        }

        let rtree = RTree::bulk_load(
            neighborhoods.iter().enumerate()
                .map(|(i, polygon)| BoundingBox::new(i, polygon.bounding_rect().unwrap()))
                .collect()
        );

        Ok(Self { localities, index, centers, neighborhoods, rtree, radius })
    }

    /// Get the number of distinct locations.
    #[inline] pub fn len(&self) -> usize { self.localities.len() }

    /// Check if the index holds no locations.
    #[inline] pub fn is_empty(&self) -> bool { self.localities.is_empty() }

    /// Get the shared neighborhood radius.
    #[inline] pub fn radius(&self) -> f64 { self.radius }

    /// Get the neighborhood polygon for a locality, if present.
    pub fn neighborhood(&self, locality: &LocalityId) -> Option<&Polygon<f64>> {
        self.index.get(locality).map(|&i| &self.neighborhoods[i as usize])
    }

    /// Get the projected center for a locality, if present.
    pub fn center(&self, locality: &LocalityId) -> Option<Point<f64>> {
        self.index.get(locality).map(|&i| self.centers[i as usize])
    }

    /// Iterate localities with their neighborhood polygons, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&LocalityId, &Polygon<f64>)> {
        self.localities.iter().zip(self.neighborhoods.iter())
    }

    /// Localities whose neighborhood footprint intersects `extent`.
    /// Lets extraction reports separate "outside the raster" from
    /// "inside but all no-data".
    pub fn within_extent(&self, extent: &Rect<f64>) -> Vec<&LocalityId> {
        let envelope = AABB::from_corners(extent.min().into(), extent.max().into());
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(|b| &self.localities[b.idx()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    use crate::geom::SINUSOIDAL_CRS;

    fn build_index(rows: Vec<(&str, f64, f64)>) -> Result<GeometryIndex> {
        let projector = Projector::new(SINUSOIDAL_CRS).unwrap();
        GeometryIndex::build(
            rows.into_iter().map(|(id, lat, lon)| (LocalityId::from(id), lat, lon)),
            &projector,
            1250.0,
        )
    }

    #[test]
    fn duplicate_localities_collapse_to_one_neighborhood() {
        let idx = build_index(vec![
            ("L1", 42.0, -76.0),
            ("L2", 42.1, -76.1),
            ("L1", 42.0, -76.0),
        ]).unwrap();
        assert_eq!(idx.len(), 2);
        assert!(idx.neighborhood(&LocalityId::from("L1")).is_some());
        assert!(idx.neighborhood(&LocalityId::from("L3")).is_none());
    }

    #[test]
    fn invalid_coordinate_fails_the_build() {
        assert!(build_index(vec![("L1", 95.0, 0.0)]).is_err());
    }

    #[test]
    fn within_extent_finds_only_overlapping_neighborhoods() {
        let idx = build_index(vec![
            ("near", 0.0, 0.0),
            ("far", 10.0, 10.0),
        ]).unwrap();

        let center = idx.center(&LocalityId::from("near")).unwrap();
        let extent = Rect::new(
            Coord { x: center.x() - 2000.0, y: center.y() - 2000.0 },
            Coord { x: center.x() + 2000.0, y: center.y() + 2000.0 },
        );

        let hits = idx.within_extent(&extent);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].as_str(), "near");
    }

    #[test]
    fn zero_radius_is_rejected() {
        let projector = Projector::new(SINUSOIDAL_CRS).unwrap();
        let result = GeometryIndex::build(
            vec![(LocalityId::from("L1"), 0.0, 0.0)],
            &projector,
            0.0,
        );
        assert!(result.is_err());
    }
}
