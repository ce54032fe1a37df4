use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::geom::SINUSOIDAL_CRS;
use crate::types::LandClass;
use crate::validate::VIF_THRESHOLD;

/// Configuration for one pipeline run. Every knob the source treats as a
/// modeling assumption is explicit here: the reconstructed class, the
/// latest-year substitution policy, the held-out years, and the protected
/// covariates all come from the caller, not from constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// PROJ.4 string of the covariate-extraction CRS. Defaults to the
    /// sinusoidal CRS of the land-cover source.
    pub target_crs: String,

    /// Neighborhood radius override, in CRS units. When absent the radius
    /// is derived from the coarsest land-cover cell size.
    pub radius: Option<f64>,

    /// Code of the land-cover class rebuilt as `1 - sum(others)` instead of
    /// read from its (unreliable) layer. None disables reconstruction.
    pub unreliable_class: Option<u8>,

    /// Reuse the latest land-cover year for observation years past it.
    pub extend_landcover_years: bool,

    /// Years held out as the test split; every other year trains.
    pub test_years: Vec<i32>,

    pub vif_threshold: f64,

    /// Covariates never dropped during inflation resolution.
    pub protected_covariates: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_crs: SINUSOIDAL_CRS.to_string(),
            radius: None,
            unreliable_class: Some(LandClass::Urban.code()),
            extend_landcover_years: true,
            test_years: Vec::new(),
            vif_threshold: VIF_THRESHOLD,
            protected_covariates: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config: {}", path.display()))?;
        let config: Self = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.reconstruct_class()?;
        Ok(config)
    }

    /// The class to reconstruct, validated against the classification scheme.
    pub fn reconstruct_class(&self) -> Result<Option<LandClass>> {
        self.unreliable_class
            .map(|code| {
                let class = LandClass::from_code(code);
                ensure!(class.is_some(), "unreliable_class {code} is not a land-cover code (0-15)");
                Ok(class.unwrap())
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_landcover_source() {
        let config = RunConfig::default();
        assert_eq!(config.target_crs, SINUSOIDAL_CRS);
        assert_eq!(config.reconstruct_class().unwrap(), Some(LandClass::Urban));
        assert!(config.extend_landcover_years);
        assert_eq!(config.vif_threshold, 5.0);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test_years": [2019], "unreliable_class": 0}}"#).unwrap();
        let config = RunConfig::from_path(file.path()).unwrap();
        assert_eq!(config.test_years, vec![2019]);
        assert_eq!(config.reconstruct_class().unwrap(), Some(LandClass::Water));
        assert_eq!(config.target_crs, SINUSOIDAL_CRS);
    }

    #[test]
    fn invalid_class_code_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"unreliable_class": 99}}"#).unwrap();
        assert!(RunConfig::from_path(file.path()).is_err());
    }
}
