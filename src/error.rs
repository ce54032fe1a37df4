use thiserror::Error;

/// Failure taxonomy for the extraction and validation pipeline.
///
/// Structural failures (unreadable raster, unresolvable CRS) abort the run
/// for that data source. Per-row conditions (empty neighborhood, join miss,
/// missing response) are recoverable: they surface as nulls or dropped rows
/// and are counted in the stage reports instead of raised.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Latitude or longitude outside the valid WGS84 range.
    #[error("invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// The target CRS string could not be resolved or a transform failed.
    #[error("projection error: {0}")]
    Projection(String),

    /// No valid raster cells intersect the neighborhood.
    #[error("neighborhood contains no valid raster cells")]
    EmptyNeighborhood,

    /// Autocorrelation testing attempted on non-unique coordinates.
    /// The Moran statistic is undefined for repeated points; callers must
    /// deduplicate (median residual per coordinate) first.
    #[error("duplicate coordinate at ({x}, {y}); deduplicate residuals before testing")]
    DuplicateCoordinate { x: f64, y: f64 },
}
