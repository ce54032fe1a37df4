use std::collections::BTreeMap;

use anyhow::{Result, ensure};
use geo::Polygon;

use crate::covariate::weighted_cells;
use crate::raster::RasterGrid;
use crate::types::{LandClass, LocalityId};

// Reconstruction smaller than this is measurement noise from fractional
// extraction; anything more negative is flagged.
const NEGATIVE_TOLERANCE: f64 = 1e-6;

/// Per-class neighborhood proportions (PLAND) for one (location, year) pair.
#[derive(Debug, Clone)]
pub struct LandCoverSample {
    pub locality: LocalityId,
    pub year: i32,
    /// Raster year actually sampled; differs from `year` when the
    /// latest-layer substitution policy fired.
    pub source_year: i32,
    /// Proportion of neighborhood area per class code, zero-filled.
    pub pland: [f64; LandClass::COUNT],
    /// True when the reconstructed class came out below -1e-6.
    pub negative_reconstruction: bool,
}

impl LandCoverSample {
    #[inline] pub fn pland(&self, class: LandClass) -> f64 { self.pland[class.code() as usize] }

    /// True when the observation year was served by a different raster year.
    #[inline] pub fn substituted(&self) -> bool { self.year != self.source_year }
}

/// Outcome of a single land-cover extraction. `NoLayer` and `Empty` are
/// recoverable per-row conditions; callers count them and continue.
#[derive(Debug, Clone)]
pub enum LandCoverOutcome {
    Sample(LandCoverSample),
    /// No raster layer covers the observation year.
    NoLayer,
    /// The neighborhood held no valid (non-nodata) cells.
    Empty,
}

impl LandCoverOutcome {
    /// Unwrap to a sample, raising the typed per-row error instead. For
    /// callers that treat an uncovered year or empty neighborhood as fatal.
    pub fn into_sample(self) -> anyhow::Result<LandCoverSample> {
        match self {
            LandCoverOutcome::Sample(sample) => Ok(sample),
            LandCoverOutcome::NoLayer => {
                anyhow::bail!("no land-cover layer covers the observation year")
            }
            LandCoverOutcome::Empty => Err(crate::error::PipelineError::EmptyNeighborhood.into()),
        }
    }
}

/// Counts land-cover raster cells by class within each neighborhood and
/// converts the counts to proportions.
pub struct LandCoverAggregator<'a> {
    layers: &'a BTreeMap<i32, RasterGrid>,
    extend_latest_year: bool,
    reconstruct: Option<LandClass>,
}

impl<'a> LandCoverAggregator<'a> {
    /// `layers` maps raster year to its land-cover grid. `extend_latest_year`
    /// reuses the latest layer for observation years beyond it (land cover
    /// assumed static past data availability). `reconstruct` names the class
    /// whose source layer is unreliable; its proportion is rebuilt as
    /// `1 - sum(all other proportions)` instead of being read directly.
    pub fn new(
        layers: &'a BTreeMap<i32, RasterGrid>,
        extend_latest_year: bool,
        reconstruct: Option<LandClass>,
    ) -> Result<Self> {
        ensure!(!layers.is_empty(), "at least one land-cover layer is required");
        Ok(Self { layers, extend_latest_year, reconstruct })
    }

    /// Get the most recent raster year available.
    #[inline]
    pub fn latest_year(&self) -> i32 {
        *self.layers.keys().next_back().unwrap()
    }

    /// Raster year serving an observation year, applying the substitution
    /// policy for years beyond the latest layer.
    pub fn source_year(&self, year: i32) -> Option<i32> {
        if self.layers.contains_key(&year) {
            Some(year)
        } else if self.extend_latest_year && year > self.latest_year() {
            Some(self.latest_year())
        } else {
            None
        }
    }

    /// Extract class proportions for one neighborhood and observation year.
    pub fn sample(
        &self,
        locality: &LocalityId,
        year: i32,
        neighborhood: &Polygon<f64>,
    ) -> LandCoverOutcome {
        let Some(source_year) = self.source_year(year) else {
            return LandCoverOutcome::NoLayer;
        };
        let grid = &self.layers[&source_year];

        // Class codes outside 0-15 are treated like no-data: excluded from
        // both numerator and denominator.
        let mut weights = [0.0_f64; LandClass::COUNT];
        let mut total = 0.0;
        for cell in weighted_cells(grid, neighborhood) {
            let code = cell.value.round();
            if cell.value.fract() != 0.0 || !(0.0..LandClass::COUNT as f64).contains(&code) {
                continue;
            }
            weights[code as usize] += cell.weight;
            total += cell.weight;
        }
        if total == 0.0 {
            return LandCoverOutcome::Empty;
        }

        let mut pland = weights.map(|w| w / total);

        let mut negative_reconstruction = false;
        if let Some(class) = self.reconstruct {
            let others: f64 = pland.iter().enumerate()
                .filter(|&(code, _)| code != class.code() as usize)
                .map(|(_, p)| p)
                .sum();
            let value = 1.0 - others;
            negative_reconstruction = value < -NEGATIVE_TOLERANCE;
            pland[class.code() as usize] = value;
        }

        LandCoverOutcome::Sample(LandCoverSample {
            locality: locality.clone(),
            year,
            source_year,
            pland,
            negative_reconstruction,
        })
    }
}
