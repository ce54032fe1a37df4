use ahash::AHashSet;
use geo::Point;
use smallvec::SmallVec;

/// Delaunay neighbor edges over a set of distinct points, via incremental
/// Bowyer-Watson insertion into an enclosing super-triangle.
///
/// An edge is reported for every pair of input points that share a triangle
/// in the final triangulation. For degenerate (collinear) inputs no
/// all-real triangle exists, but consecutive points still share triangles
/// with a super-triangle vertex, so the chain of nearest links survives and
/// no triangulated point is left isolated.
pub fn delaunay_edges(points: &[Point<f64>]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 2 { return Vec::new(); }
    if n == 2 { return vec![(0, 1)]; }

    let triangles = triangulate(points);

    let mut seen = AHashSet::new();
    let mut edges = Vec::new();
    for tri in &triangles {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[0], tri[2])] {
            if a >= n || b >= n { continue; } // super-triangle vertex
            let pair = (a.min(b), a.max(b));
            if seen.insert(pair) {
                edges.push(pair);
            }
        }
    }
    edges
}

/// Triangles as index triples; indices >= points.len() are the three
/// super-triangle vertices, still attached to hull/degenerate regions.
fn triangulate(points: &[Point<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();

    // Enclosing super-triangle, comfortably larger than the point extent.
    let (min_x, max_x) = min_max(points.iter().map(|p| p.x()));
    let (min_y, max_y) = min_max(points.iter().map(|p| p.y()));
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;

    let mut coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x(), p.y())).collect();
    coords.push((cx - 20.0 * span, cy - span));
    coords.push((cx + 20.0 * span, cy - span));
    coords.push((cx, cy + 20.0 * span));

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for point in 0..n {
        let p = coords[point];

        // Triangles whose circumcircle contains the new point.
        let mut bad: Vec<usize> = Vec::new();
        for (t, tri) in triangles.iter().enumerate() {
            if in_circumcircle(coords[tri[0]], coords[tri[1]], coords[tri[2]], p) {
                bad.push(t);
            }
        }

        // Boundary of the cavity: edges owned by exactly one bad triangle.
        let mut boundary: SmallVec<[(usize, usize); 16]> = SmallVec::new();
        for &t in &bad {
            let tri = triangles[t];
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let edge = (a.min(b), a.max(b));
                if let Some(pos) = boundary.iter().position(|&e| e == edge) {
                    boundary.swap_remove(pos); // shared by two bad triangles
                } else {
                    boundary.push(edge);
                }
            }
        }

        let bad_set: AHashSet<usize> = bad.into_iter().collect();
        let mut keep = Vec::with_capacity(triangles.len());
        for (t, tri) in triangles.iter().enumerate() {
            if !bad_set.contains(&t) { keep.push(*tri); }
        }

        // Retriangulate the cavity around the new point.
        for (a, b) in boundary {
            keep.push([a, b, point]);
        }
        triangles = keep;
    }

    triangles
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Test whether `p` lies strictly inside the circumcircle of (a, b, c).
/// Degenerate triangles have an unbounded circumcircle and report every
/// point as inside, so they cannot survive later insertions.
fn in_circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64), p: (f64, f64)) -> bool {
    let orient = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
    if orient == 0.0 { return true; }

    let (ax, ay) = (a.0 - p.0, a.1 - p.1);
    let (bx, by) = (b.0 - p.0, b.1 - p.1);
    let (cx, cy) = (c.0 - p.0, c.1 - p.1);

    let det = (ax * ax + ay * ay) * (bx * cy - cx * by)
        - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);

    // det > 0 means inside for counterclockwise (a, b, c).
    if orient > 0.0 { det > 0.0 } else { det < 0.0 }
}
