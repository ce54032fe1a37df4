mod grid;

pub use grid::RasterGrid;
