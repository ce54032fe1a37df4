pub mod observation;

mod join;

pub use join::{JoinReport, ModelInput, join_observations};
