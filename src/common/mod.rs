mod data;

pub use data::{read_ascii_grid, read_from_csv, write_to_csv};
