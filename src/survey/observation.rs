//! Checklist observation tables.
//!
//! One row per checklist: identifiers, WGS84 coordinates, date-derived and
//! effort fields, and the (possibly unreported) species count. Produced by
//! the upstream extraction step; consumed read-only here. Helpers derive
//! new tables rather than mutating in place.

use anyhow::{Context, Result, ensure};
use polars::frame::DataFrame;
use polars::prelude::{Column, DataType};

use crate::types::LocalityId;

pub const COL_CHECKLIST: &str = "checklist_id";
pub const COL_OBSERVER: &str = "observer_id";
pub const COL_LOCALITY: &str = "locality_id";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_YEAR: &str = "year";
pub const COL_DAY_OF_YEAR: &str = "day_of_year";
pub const COL_START_HOUR: &str = "time_observations_started";
pub const COL_DURATION: &str = "duration_minutes";
pub const COL_DISTANCE: &str = "effort_distance_km";
pub const COL_OBSERVERS: &str = "number_observers";
pub const COL_PROTOCOL: &str = "protocol_type";
pub const COL_COUNT: &str = "observation_count";

const STATIONARY: &str = "Stationary";

/// Columns the core pipeline cannot run without.
const REQUIRED: [&str; 5] = [COL_CHECKLIST, COL_LOCALITY, COL_LATITUDE, COL_LONGITUDE, COL_YEAR];

/// Check that an observation table carries the columns the pipeline joins
/// and extracts on.
pub fn validate_observations(df: &DataFrame) -> Result<()> {
    for name in REQUIRED {
        ensure!(
            df.column(name).is_ok(),
            "observation table is missing required column '{name}'"
        );
    }
    Ok(())
}

/// (locality, latitude, longitude) for every row, in row order.
/// Downstream deduplication keeps the first coordinates per locality.
pub fn locations(df: &DataFrame) -> Result<Vec<(LocalityId, f64, f64)>> {
    let locality = df.column(COL_LOCALITY)?.str()?;
    let lat = df.column(COL_LATITUDE)?.cast(&DataType::Float64)?;
    let lat = lat.f64()?;
    let lon = df.column(COL_LONGITUDE)?.cast(&DataType::Float64)?;
    let lon = lon.f64()?;

    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let id = locality.get(i).context("null locality_id in observation table")?;
        let lat = lat.get(i).context("null latitude in observation table")?;
        let lon = lon.get(i).context("null longitude in observation table")?;
        out.push((LocalityId::from(id), lat, lon));
    }
    Ok(out)
}

/// Distinct (locality, year) pairs, in first-seen order.
pub fn location_years(df: &DataFrame) -> Result<Vec<(LocalityId, i32)>> {
    let locality = df.column(COL_LOCALITY)?.str()?;
    let year = df.column(COL_YEAR)?.cast(&DataType::Int32)?;
    let year = year.i32()?;

    let mut seen = ahash::AHashSet::new();
    let mut out = Vec::new();
    for i in 0..df.height() {
        let id = locality.get(i).context("null locality_id in observation table")?;
        let year = year.get(i).context("null year in observation table")?;
        let key = (LocalityId::from(id), year);
        if seen.insert(key.clone()) {
            out.push(key);
        }
    }
    Ok(out)
}

/// Derive a table where stationary-protocol rows have distance 0 instead of
/// null. Distance traveled is defined as 0 for stationary checklists.
pub fn zero_fill_stationary_distance(df: &DataFrame) -> Result<DataFrame> {
    let protocol = df.column(COL_PROTOCOL)?.str()?;
    let distance = df.column(COL_DISTANCE)?.cast(&DataType::Float64)?;
    let distance = distance.f64()?;

    let filled: Vec<Option<f64>> = (0..df.height())
        .map(|i| match (distance.get(i), protocol.get(i)) {
            (None, Some(STATIONARY)) => Some(0.0),
            (value, _) => value,
        })
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(COL_DISTANCE.into(), filled))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn observations() -> DataFrame {
        df![
            COL_CHECKLIST => ["S1", "S2", "S3"],
            COL_LOCALITY => ["L1", "L2", "L1"],
            COL_LATITUDE => [42.0, 42.5, 42.0],
            COL_LONGITUDE => [-76.0, -76.5, -76.0],
            COL_YEAR => [2016i32, 2016, 2017],
            COL_PROTOCOL => ["Stationary", "Traveling", "Stationary"],
            COL_DISTANCE => [None, Some(1.2), None],
        ].unwrap()
    }

    #[test]
    fn validation_requires_core_columns() {
        assert!(validate_observations(&observations()).is_ok());
        let missing = df![COL_CHECKLIST => ["S1"]].unwrap();
        assert!(validate_observations(&missing).is_err());
    }

    #[test]
    fn location_years_are_distinct_in_first_seen_order() {
        let pairs = location_years(&observations()).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], (LocalityId::from("L1"), 2016));
        assert_eq!(pairs[2], (LocalityId::from("L1"), 2017));
    }

    #[test]
    fn stationary_distance_is_zero_filled() {
        let filled = zero_fill_stationary_distance(&observations()).unwrap();
        let distance = filled.column(COL_DISTANCE).unwrap().f64().unwrap();
        assert_eq!(distance.get(0), Some(0.0));
        assert_eq!(distance.get(1), Some(1.2));
        assert_eq!(distance.get(2), Some(0.0));
    }
}
