mod land_class;
mod locality_id;

pub use land_class::LandClass;
pub use locality_id::LocalityId;
