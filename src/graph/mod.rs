mod delaunay;
mod graph;
mod soi;

pub use delaunay::delaunay_edges;
pub use graph::NeighborGraph;
pub use soi::sphere_of_influence;
