//! Metric providers.
//!
//! Each provider reduces one raster product over a geometry through
//! [`MetricProviders::reduce`], the shared primitive that applies the
//! per-call timeout and the product's client-side value scale. Provider
//! failures never propagate: they are logged and reported as `None`
//! ("unknown"), which callers must keep distinct from zero.

use std::sync::Arc;
use std::time::Duration;

use parkpulse_geometry::Geometry;
use parkpulse_raster_models::{MetricKind, RasterQuery};

use crate::catalog::ProductCatalog;
use crate::{RasterError, RasterService, RasterSettings};

/// Density (people per km²) at which walkability scores 50.
const WALKABILITY_MIDPOINT_DENSITY: f64 = 100.0;

/// Logistic steepness of the walkability curve.
const WALKABILITY_STEEPNESS: f64 = 0.03;

/// Rounds `value` to `places` decimal places.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Maps population density onto a 0-100 walkability score.
///
/// `score = 100 / (1 + e^(-0.03 * (density - 100)))`, rounded to two
/// decimals. A zero or negative area yields a density of zero.
#[must_use]
pub fn walkability_score(population: f64, area_km2: f64) -> f64 {
    let density = if area_km2 > 0.0 {
        population / area_km2
    } else {
        0.0
    };
    let score =
        100.0 / (1.0 + (-WALKABILITY_STEEPNESS * (density - WALKABILITY_MIDPOINT_DENSITY)).exp());
    round_to(score, 2)
}

/// The four raster-backed metric providers over one raster service.
#[derive(Clone)]
pub struct MetricProviders {
    service: Arc<dyn RasterService>,
    catalog: ProductCatalog,
    timeout: Duration,
}

impl MetricProviders {
    /// Creates providers backed by `service`.
    #[must_use]
    pub fn new(
        service: Arc<dyn RasterService>,
        catalog: ProductCatalog,
        settings: RasterSettings,
    ) -> Self {
        Self {
            service,
            catalog,
            timeout: settings.timeout,
        }
    }

    /// Reduces `query` over `geometry`, bounded by the configured timeout.
    ///
    /// The product's `value_scale` is applied to the reduced value.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError`] if the service fails or the call times out.
    pub async fn reduce(
        &self,
        geometry: &Geometry,
        query: &RasterQuery,
    ) -> Result<Option<f64>, RasterError> {
        let geojson = geometry.to_geojson();
        let value = tokio::time::timeout(self.timeout, self.service.reduce(&geojson, query))
            .await
            .map_err(|_| RasterError::Timeout {
                product: query.product.id.clone(),
                after: self.timeout,
            })??;

        Ok(value.map(|v| v * query.product.value_scale))
    }

    /// Mean summer NDVI over `geometry`, or `None` if no imagery intersects.
    pub async fn ndvi(&self, geometry: &Geometry) -> Option<f64> {
        let query = RasterQuery::observed(self.catalog.ndvi.clone());
        degrade(MetricKind::Ndvi, self.reduce(geometry, &query).await)
    }

    /// Mean NDVI over `region` after blending `value` into `footprint`.
    ///
    /// Uses the same composite as [`Self::ndvi`]; only pixels inside the
    /// footprint are replaced.
    pub async fn ndvi_with_overlay(
        &self,
        region: &Geometry,
        footprint: &Geometry,
        value: f64,
    ) -> Option<f64> {
        let query =
            RasterQuery::with_overlay(self.catalog.ndvi.clone(), value, footprint.to_geojson());
        degrade(MetricKind::Ndvi, self.reduce(region, &query).await)
    }

    /// Population sum over `geometry`.
    ///
    /// No data counts as zero residents; only a failed query is `None`.
    pub async fn population(&self, geometry: &Geometry) -> Option<f64> {
        let query = RasterQuery::observed(self.catalog.population.clone());
        degrade(
            MetricKind::Population,
            self.reduce(geometry, &query)
                .await
                .map(|v| Some(v.unwrap_or(0.0))),
        )
    }

    /// Annual mean PM2.5 over `geometry` in µg/m³.
    ///
    /// Falls back to the scaled aerosol index only when the primary
    /// product errors. A primary "no data" answer is returned as-is, and
    /// a non-positive proxy value is unknown.
    pub async fn pm25(&self, geometry: &Geometry) -> Option<f64> {
        let primary = RasterQuery::observed(self.catalog.pm25.clone());
        match self.reduce(geometry, &primary).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("Error computing PM2.5 from '{}': {e}", primary.product.id);
                let proxy = RasterQuery::observed(self.catalog.aerosol_index.clone());
                degrade(MetricKind::Pm25, self.reduce(geometry, &proxy).await).filter(|v| {
                    if *v > 0.0 {
                        return true;
                    }
                    log::warn!("Discarding non-positive PM2.5 estimate {v} from aerosol index");
                    false
                })
            }
        }
    }

    /// Walkability score for `geometry` derived from population density.
    pub async fn walkability(&self, geometry: &Geometry) -> Option<f64> {
        let population = self.population(geometry).await?;
        Some(walkability_score(population, geometry.area_km2()))
    }

    /// Computes a single metric by kind.
    pub async fn metric(&self, kind: MetricKind, geometry: &Geometry) -> Option<f64> {
        match kind {
            MetricKind::Ndvi => self.ndvi(geometry).await,
            MetricKind::Population => self.population(geometry).await,
            MetricKind::Pm25 => self.pm25(geometry).await,
            MetricKind::Walkability => self.walkability(geometry).await,
        }
    }
}

/// Turns a provider failure into an unknown value.
fn degrade(metric: MetricKind, result: Result<Option<f64>, RasterError>) -> Option<f64> {
    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            log::debug!("No {metric} data for geometry");
            None
        }
        Err(e) => {
            log::warn!("Metric {metric} unavailable: {e}");
            None
        }
    }
}
