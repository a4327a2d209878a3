//! Policy constants for the impact engine.
//!
//! Defaults are embedded from `config/impact.toml`. Setting
//! `PARKPULSE_IMPACT_CONFIG` to a TOML file with the same shape replaces
//! them at startup.

use parkpulse_impact_models::LandUseScenario;
use parkpulse_raster::metrics::round_to;
use serde::Deserialize;

use crate::ImpactError;

const IMPACT_TOML: &str = include_str!("../config/impact.toml");

/// PM2.5 multiplier per land-use scenario.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MultiplierTable {
    pub removed: f64,
    pub replaced_by_building: f64,
    /// Applied to every other scenario.
    pub modification: f64,
}

impl MultiplierTable {
    /// Multiplier applied to before-PM2.5 for `scenario`.
    #[must_use]
    pub const fn for_scenario(&self, scenario: LandUseScenario) -> f64 {
        match scenario {
            LandUseScenario::Removed => self.removed,
            LandUseScenario::ReplacedByBuilding => self.replaced_by_building,
            LandUseScenario::Modification => self.modification,
        }
    }

    /// `(multiplier - 1) * 100`, rounded to one decimal.
    #[must_use]
    pub fn increase_percent(&self, scenario: LandUseScenario) -> f64 {
        round_to((self.for_scenario(scenario) - 1.0) * 100.0, 1)
    }
}

/// Settings for the full impact report.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReportPolicy {
    /// Service-area buffer radius in metres.
    pub buffer_m: f64,
    /// NDVI blended into a footprint replaced by buildings.
    pub built_up_ndvi: f64,
    pub pm25_multipliers: MultiplierTable,
}

/// Settings for the PM2.5-only report.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PollutionPolicy {
    /// Service-area buffer radius in metres.
    pub buffer_m: f64,
    pub pm25_multipliers: MultiplierTable,
}

/// All impact policy constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ImpactConfig {
    pub report: ReportPolicy,
    pub pollution: PollutionPolicy,
}

impl ImpactConfig {
    /// The embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the file is embedded).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(IMPACT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded impact config: {e}"))
    }

    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::Config`] if the document is malformed or a
    /// value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ImpactError> {
        let config: Self = toml::de::from_str(text).map_err(|e| ImpactError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `PARKPULSE_IMPACT_CONFIG`, or the embedded
    /// defaults when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::Config`] if the file cannot be read or
    /// parsed.
    pub fn from_env() -> Result<Self, ImpactError> {
        let Ok(path) = std::env::var("PARKPULSE_IMPACT_CONFIG") else {
            return Ok(Self::embedded());
        };

        log::info!("Loading impact policy from {path}");
        let text = std::fs::read_to_string(&path).map_err(|e| ImpactError::Config {
            message: format!("Failed to read {path}: {e}"),
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ImpactError> {
        for (name, radius) in [
            ("report.buffer_m", self.report.buffer_m),
            ("pollution.buffer_m", self.pollution.buffer_m),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ImpactError::Config {
                    message: format!("{name} must be a positive number of metres, got {radius}"),
                });
            }
        }
        if !(-1.0..=1.0).contains(&self.report.built_up_ndvi) {
            return Err(ImpactError::Config {
                message: format!(
                    "report.built_up_ndvi must be within [-1, 1], got {}",
                    self.report.built_up_ndvi
                ),
            });
        }
        Ok(())
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
