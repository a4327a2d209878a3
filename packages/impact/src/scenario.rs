//! Scenario simulation: what the service area looks like after a
//! land-use change.
//!
//! Only NDVI is scenario-sensitive. Walkability (and population) after
//! the change are always measured on the service area with the park
//! footprint removed, and PM2.5 after is never measured here at all.

use parkpulse_geometry::Geometry;
use parkpulse_impact_models::LandUseScenario;
use parkpulse_raster::metrics::MetricProviders;

/// How NDVI is obtained for the "after" state.
#[derive(Debug, Clone, PartialEq)]
pub enum NdviAfter {
    /// Re-measured on the service area minus the park footprint.
    Remaining,
    /// Re-measured on the full service area with `value` blended into
    /// the park footprint.
    Overlay {
        /// Park footprint the value is clipped to.
        footprint: Geometry,
        /// Constant NDVI of the new land cover.
        value: f64,
    },
    /// Carried over from "before".
    Unchanged,
}

/// The simulated "after" state of a service area.
#[derive(Debug, Clone, PartialEq)]
pub struct AfterState {
    /// Service area with the park footprint excised.
    pub remaining: Geometry,
    /// NDVI strategy for the scenario.
    pub ndvi: NdviAfter,
}

impl AfterState {
    /// Computes NDVI for this state.
    ///
    /// `service_area` is the unmodified buffer; `before` is returned
    /// as-is for [`NdviAfter::Unchanged`].
    pub async fn measure_ndvi(
        &self,
        metrics: &MetricProviders,
        service_area: &Geometry,
        before: Option<f64>,
    ) -> Option<f64> {
        match &self.ndvi {
            NdviAfter::Remaining => metrics.ndvi(&self.remaining).await,
            NdviAfter::Overlay { footprint, value } => {
                metrics
                    .ndvi_with_overlay(service_area, footprint, *value)
                    .await
            }
            NdviAfter::Unchanged => before,
        }
    }
}

/// Builds "after" states for land-use scenarios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioSimulator {
    built_up_ndvi: f64,
}

impl ScenarioSimulator {
    /// `built_up_ndvi` is the vegetation signature of built-up land.
    #[must_use]
    pub const fn new(built_up_ndvi: f64) -> Self {
        Self { built_up_ndvi }
    }

    /// Simulates `scenario` applied to `park` inside `service_area`.
    #[must_use]
    pub fn simulate_after(
        &self,
        service_area: &Geometry,
        park: &Geometry,
        scenario: LandUseScenario,
    ) -> AfterState {
        let remaining = service_area.difference(park);
        if !park.is_areal() {
            log::warn!("Park footprint has no area; the service area is left unchanged");
        }

        let ndvi = match scenario {
            LandUseScenario::Removed => NdviAfter::Remaining,
            LandUseScenario::ReplacedByBuilding => NdviAfter::Overlay {
                footprint: park.clone(),
                value: self.built_up_ndvi,
            },
            LandUseScenario::Modification => NdviAfter::Unchanged,
        };

        AfterState { remaining, ndvi }
    }
}
