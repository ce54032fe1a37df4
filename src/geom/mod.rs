mod bbox;
mod index;
mod neighborhood;
mod proj;

use bbox::BoundingBox;
pub use index::GeometryIndex;
pub use neighborhood::{disk, neighborhood_radius};
pub use proj::{Projector, SINUSOIDAL_CRS};
