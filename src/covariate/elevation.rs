use geo::Polygon;

use crate::covariate::{WeightedCell, weighted_cells};
use crate::raster::RasterGrid;
use crate::types::LocalityId;

/// Weighted elevation statistics over one neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationStats {
    pub mean: f64,
    pub median: f64,
    pub sd: f64,
    pub iqr: f64,
}

/// Elevation summary for one location. `stats` is None when the neighborhood
/// intersects no valid elevation cells, an expected condition near
/// raster-extent boundaries; it propagates as nulls rather than a failure.
#[derive(Debug, Clone)]
pub struct ElevationSummary {
    pub locality: LocalityId,
    pub stats: Option<ElevationStats>,
}

impl ElevationSummary {
    /// The statistics, or the typed empty-neighborhood error for callers
    /// that cannot proceed on nulls.
    pub fn require_stats(&self) -> anyhow::Result<&ElevationStats> {
        self.stats.as_ref()
            .ok_or_else(|| crate::error::PipelineError::EmptyNeighborhood.into())
    }
}

/// Computes area-weighted mean/median/sd/iqr of elevation per neighborhood.
/// Elevation is year-independent, so each distinct location is summarized once.
pub struct ElevationAggregator<'a> {
    grid: &'a RasterGrid,
}

impl<'a> ElevationAggregator<'a> {
    pub fn new(grid: &'a RasterGrid) -> Self {
        Self { grid }
    }

    pub fn summarize(&self, locality: &LocalityId, neighborhood: &Polygon<f64>) -> ElevationSummary {
        let cells = weighted_cells(self.grid, neighborhood);
        ElevationSummary {
            locality: locality.clone(),
            stats: stats_of(&cells),
        }
    }
}

fn stats_of(cells: &[WeightedCell]) -> Option<ElevationStats> {
    let total: f64 = cells.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return None;
    }

    let mean = cells.iter().map(|c| c.value * c.weight).sum::<f64>() / total;
    let variance = cells.iter()
        .map(|c| c.weight * (c.value - mean).powi(2))
        .sum::<f64>() / total;

    let mut sorted: Vec<WeightedCell> = cells.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
    let q25 = weighted_quantile(&sorted, total, 0.25);
    let q75 = weighted_quantile(&sorted, total, 0.75);

    Some(ElevationStats {
        mean,
        median: weighted_quantile(&sorted, total, 0.5),
        sd: variance.sqrt(),
        iqr: q75 - q25,
    })
}

/// Weighted quantile with midpoint plotting positions: each sorted cell sits
/// at (cum_weight - weight/2) / total, and the quantile interpolates linearly
/// between the bracketing cells. Reduces to the classic sample median for
/// equal weights.
fn weighted_quantile(sorted: &[WeightedCell], total: f64, q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());

    let mut cum = 0.0;
    let mut prev_pos = f64::NEG_INFINITY;
    let mut prev_value = sorted[0].value;
    for cell in sorted {
        let pos = (cum + cell.weight / 2.0) / total;
        if q <= pos {
            if prev_pos.is_infinite() {
                return cell.value; // below the first midpoint
            }
            let t = (q - prev_pos) / (pos - prev_pos);
            return prev_value + t * (cell.value - prev_value);
        }
        cum += cell.weight;
        prev_pos = pos;
        prev_value = cell.value;
    }
    prev_value // above the last midpoint
}
