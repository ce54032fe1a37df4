use geo::Point;
use rstar::RTree;
use rstar::primitives::GeomWithData;

/// Sphere-of-influence refinement of a neighbor edge list.
///
/// Each point gets an influence circle whose radius is the distance to its
/// nearest neighbor; an edge survives only when the two circles intersect
/// (`d(i, j) <= r_i + r_j`). This prunes Delaunay edges that are long
/// relative to local point density, leaving a sparser, more locally
/// meaningful adjacency.
pub fn sphere_of_influence(
    points: &[Point<f64>],
    edges: &[(usize, usize)],
) -> Vec<(usize, usize)> {
    if points.len() < 2 { return Vec::new(); }

    let rtree = RTree::bulk_load(
        points.iter().enumerate()
            .map(|(i, p)| GeomWithData::new([p.x(), p.y()], i))
            .collect()
    );

    // Influence radius: distance to the nearest other point.
    let radius: Vec<f64> = points.iter().enumerate()
        .map(|(i, p)| {
            rtree.nearest_neighbor_iter(&[p.x(), p.y()])
                .find(|neighbor| neighbor.data != i)
                .map(|neighbor| distance(p, neighbor.geom()))
                .unwrap_or(0.0)
        })
        .collect();

    edges.iter().copied()
        .filter(|&(i, j)| {
            let d = distance(&points[i], &[points[j].x(), points[j].y()]);
            d <= radius[i] + radius[j]
        })
        .collect()
}

#[inline]
fn distance(p: &Point<f64>, q: &[f64; 2]) -> f64 {
    ((p.x() - q[0]).powi(2) + (p.y() - q[1]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::delaunay_edges;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point<f64>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn evenly_spaced_chain_is_fully_kept() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let kept = sphere_of_influence(&points, &delaunay_edges(&points));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn long_edges_between_clusters_are_pruned() {
        // Two tight pairs far apart: the Delaunay triangulation bridges the
        // clusters, the sphere-of-influence graph does not.
        let points = pts(&[
            (0.0, 0.0), (1.0, 0.0),
            (100.0, 0.0), (101.0, 0.0),
        ]);
        let delaunay = delaunay_edges(&points);
        assert!(delaunay.iter().any(|&(a, b)| a < 2 && b >= 2));

        let mut kept = sphere_of_influence(&points, &delaunay);
        kept.sort_unstable();
        assert_eq!(kept, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn outlier_keeps_its_nearest_link() {
        // The outlier's own influence radius reaches its nearest neighbor,
        // so it is never fully disconnected.
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (50.0, 0.0)]);
        let kept = sphere_of_influence(&points, &delaunay_edges(&points));

        let mut degree = [0usize; 4];
        for &(a, b) in &kept {
            degree[a] += 1;
            degree[b] += 1;
        }
        assert!(degree[3] > 0);
    }

    #[test]
    fn too_few_points_yield_no_edges() {
        assert!(sphere_of_influence(&pts(&[(0.0, 0.0)]), &[]).is_empty());
    }
}
