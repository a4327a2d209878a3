//! The impact engine.
//!
//! Before/after metrics are measured on a buffered service area. Within
//! each phase the independent provider calls run concurrently; the after
//! phase only depends on the before phase through PM2.5, which is
//! synthesized from the before value rather than measured.

use std::sync::Arc;

use parkpulse_ai::describe::describe_park;
use parkpulse_ai::providers::NarrativeProvider;
use parkpulse_geometry::Geometry;
use parkpulse_impact_models::{
    DemographicBreakdown, ImpactDeltas, ImpactReport, ImpactSummary, LandUseScenario, MetricDelta,
    MetricSnapshot, ParkAirQuality, ParkFacts, ParkInformation, PollutionImpactReport,
};
use parkpulse_parks::ParkStore;
use parkpulse_parks_models::{ParkRecord, ParkStatistics};
use parkpulse_raster::metrics::{MetricProviders, round_to, walkability_score};
use parkpulse_raster_models::MetricKind;

use crate::ImpactError;
use crate::air_quality::{assess_after, classify_air_quality};
use crate::config::ImpactConfig;
use crate::narrative;
use crate::scenario::ScenarioSimulator;

/// Orchestrates park lookup, scenario simulation and metric providers.
pub struct ImpactEngine {
    parks: Arc<dyn ParkStore>,
    metrics: MetricProviders,
    config: ImpactConfig,
    simulator: ScenarioSimulator,
    narrator: Option<Arc<dyn NarrativeProvider>>,
}

/// Population and the walkability derived from it, for one geometry.
struct Occupancy {
    population: Option<f64>,
    walkability: Option<f64>,
}

impl ImpactEngine {
    /// Creates an engine without a narrative provider; descriptions use
    /// templates.
    #[must_use]
    pub fn new(parks: Arc<dyn ParkStore>, metrics: MetricProviders, config: ImpactConfig) -> Self {
        Self {
            parks,
            metrics,
            simulator: ScenarioSimulator::new(config.report.built_up_ndvi),
            config,
            narrator: None,
        }
    }

    /// Attaches a narrative provider for park descriptions and proposals.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeProvider>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub(crate) fn narrator(&self) -> Option<&dyn NarrativeProvider> {
        self.narrator.as_deref()
    }

    /// Full before/after impact report for a stored park.
    ///
    /// # Errors
    ///
    /// * [`ImpactError::NotFound`] if the park id is unknown
    /// * [`ImpactError::NoGeometry`] if the park has no stored geometry
    /// * [`ImpactError::InvalidGeometry`] if the stored geometry is malformed
    /// * [`ImpactError::ParkStore`] if the park lookup fails
    pub async fn compute_impact(
        &self,
        park_id: &str,
        scenario: LandUseScenario,
    ) -> Result<ImpactReport, ImpactError> {
        let (park, stats) = tokio::join!(self.parks.park(park_id), self.statistics(park_id));
        let park = park?.ok_or_else(|| ImpactError::NotFound {
            park_id: park_id.to_string(),
        })?;
        let footprint = park_geometry(&park)?;

        log::info!(
            "Computing {scenario} impact for park {park_id} ({})",
            park.display_name()
        );

        let policy = self.config.report;
        let service_area = footprint.buffer_meters(policy.buffer_m);

        let (ndvi_before, pm25_before, occupancy_before) = tokio::join!(
            self.metrics.ndvi(&service_area),
            self.metrics.pm25(&service_area),
            self.occupancy(&service_area),
        );

        let after_state = self
            .simulator
            .simulate_after(&service_area, &footprint, scenario);
        let (ndvi_after, occupancy_after) = tokio::join!(
            after_state.measure_ndvi(&self.metrics, &service_area, ndvi_before),
            self.occupancy(&after_state.remaining),
        );

        let multiplier = policy.pm25_multipliers.for_scenario(scenario);
        let pm25_after = pm25_before.map(|v| v * multiplier);

        let deltas = ImpactDeltas {
            ndvi_loss_percent: ndvi_loss_percent(ndvi_before, ndvi_after),
            pm25_increase: pm25_before
                .zip(pm25_after)
                .map(|(before, after)| round_to(after - before, 2)),
            pm25_increase_percent: policy.pm25_multipliers.increase_percent(scenario),
        };

        let mut report = ImpactReport {
            park_id: park.park_id.clone(),
            park_name: park.display_name().to_string(),
            scenario,
            buffer_m: policy.buffer_m,
            before: snapshot(ndvi_before, pm25_before, &occupancy_before),
            after: snapshot(ndvi_after, pm25_after, &occupancy_after),
            deltas,
            demographics: DemographicBreakdown::from(&stats),
            summary: ImpactSummary::default(),
            message: String::new(),
        };
        report.summary = narrative::impact_summary(&report);
        report.message = narrative::impact_message(&report);

        Ok(report)
    }

    /// Before/after metrics for an ad hoc geometry.
    ///
    /// Skips park and statistics lookup. Unlike [`Self::compute_impact`],
    /// PM2.5 after is measured on the service area minus the footprint.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidGeometry`] before any raster call if
    /// `raw` is not a usable geometry.
    pub async fn compute_impact_for_geometry(
        &self,
        raw: &serde_json::Value,
        scenario: LandUseScenario,
    ) -> Result<MetricDelta, ImpactError> {
        let footprint = parkpulse_geometry::parse(raw)?;

        let buffer_m = self.config.report.buffer_m;
        let service_area = footprint.buffer_meters(buffer_m);

        let (ndvi_before, pm25_before, occupancy_before) = tokio::join!(
            self.metrics.ndvi(&service_area),
            self.metrics.pm25(&service_area),
            self.occupancy(&service_area),
        );

        let after_state = self
            .simulator
            .simulate_after(&service_area, &footprint, scenario);
        let (ndvi_after, pm25_after, occupancy_after) = tokio::join!(
            after_state.measure_ndvi(&self.metrics, &service_area, ndvi_before),
            self.metrics.pm25(&after_state.remaining),
            self.occupancy(&after_state.remaining),
        );

        Ok(MetricDelta {
            scenario,
            buffer_m,
            before: snapshot(ndvi_before, pm25_before, &occupancy_before),
            after: snapshot(ndvi_after, pm25_after, &occupancy_after),
            ndvi_loss_percent: ndvi_loss_percent(ndvi_before, ndvi_after),
        })
    }

    /// A single metric over `raw`, without buffering.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::InvalidGeometry`] if `raw` is not a usable
    /// geometry.
    pub async fn compute_single_metric(
        &self,
        raw: &serde_json::Value,
        kind: MetricKind,
    ) -> Result<Option<f64>, ImpactError> {
        let geometry = parkpulse_geometry::parse(raw)?;
        let value = self.metrics.metric(kind, &geometry).await;
        Ok(value.map(|v| match kind {
            MetricKind::Ndvi => round_to(v, 4),
            MetricKind::Pm25 | MetricKind::Walkability => round_to(v, 2),
            MetricKind::Population => v.round(),
        }))
    }

    /// PM2.5-only impact report over the wider pollution buffer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_impact`].
    pub async fn assess_pollution_only(
        &self,
        park_id: &str,
        scenario: LandUseScenario,
    ) -> Result<PollutionImpactReport, ImpactError> {
        let (park, footprint) = self.resolve_park(park_id).await?;

        let policy = self.config.pollution;
        let service_area = footprint.buffer_meters(policy.buffer_m);
        let current = self.metrics.pm25(&service_area).await;

        let multiplier = policy.pm25_multipliers.for_scenario(scenario);
        let after = current.map(|v| v * multiplier);

        let mut report = PollutionImpactReport {
            park_id: park.park_id.clone(),
            park_name: park.display_name().to_string(),
            scenario,
            buffer_m: policy.buffer_m,
            current_pm25: current.map(|v| round_to(v, 2)),
            estimated_pm25_after: after.map(|v| round_to(v, 2)),
            pollution_increase: current.zip(after).map(|(c, a)| round_to(a - c, 2)),
            pollution_increase_percent: policy.pm25_multipliers.increase_percent(scenario),
            after_assessment: after.map(assess_after),
            impact_description: scenario.description().to_string(),
            message: String::new(),
        };
        report.message = narrative::pollution_message(&report);

        Ok(report)
    }

    /// Mean NDVI over the park footprint itself, 4 decimals.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_impact`].
    pub async fn park_ndvi(&self, park_id: &str) -> Result<Option<f64>, ImpactError> {
        let (_, footprint) = self.resolve_park(park_id).await?;
        Ok(self.metrics.ndvi(&footprint).await.map(|v| round_to(v, 4)))
    }

    /// Current air quality over the park footprint.
    ///
    /// An unknown PM2.5 yields `current_air_quality: None`, not an error.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_impact`].
    pub async fn park_air_quality(&self, park_id: &str) -> Result<ParkAirQuality, ImpactError> {
        let (park, footprint) = self.resolve_park(park_id).await?;
        let assessment = self
            .metrics
            .pm25(&footprint)
            .await
            .map(classify_air_quality);

        let park_name = park.display_name().to_string();
        Ok(ParkAirQuality {
            message: narrative::air_quality_message(&park_name, assessment.as_ref()),
            park_id: park.park_id,
            park_name,
            current_air_quality: assessment,
        })
    }

    /// Park facts plus a generated (or templated) description.
    ///
    /// A missing or malformed geometry only blanks the NDVI and air
    /// quality fields.
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::NotFound`] if the park id is unknown, or
    /// [`ImpactError::ParkStore`] if the lookup fails.
    pub async fn park_information(&self, park_id: &str) -> Result<ParkInformation, ImpactError> {
        let (park, stats) = tokio::join!(self.parks.park(park_id), self.statistics(park_id));
        let park = park?.ok_or_else(|| ImpactError::NotFound {
            park_id: park_id.to_string(),
        })?;

        let (ndvi, air_quality) = match park_geometry(&park) {
            Ok(footprint) => {
                let (ndvi, pm25) =
                    tokio::join!(self.metrics.ndvi(&footprint), self.metrics.pm25(&footprint));
                (ndvi.map(|v| round_to(v, 3)), pm25.map(classify_air_quality))
            }
            Err(e) => {
                log::warn!("Describing park {park_id} without environmental data: {e}");
                (None, None)
            }
        };

        let facts = ParkFacts {
            name: park.display_name().to_string(),
            address: park.address.clone(),
            owner: park.owner.clone(),
            zip: park.zip.clone(),
            area_acres: park.area_acres().map(|a| round_to(a, 2)),
            population_served: stats.total_population,
            kids_served: stats.kids,
            seniors_served: stats.seniors,
            per_acre_demand: stats.per_acre_demand,
            ndvi,
            air_quality,
        };

        let description = describe_park(self.narrator(), &facts).await;

        Ok(ParkInformation {
            park_id: park.park_id,
            park_name: facts.name.clone(),
            description,
            details: facts,
        })
    }

    /// Looks up a park and parses its geometry.
    async fn resolve_park(&self, park_id: &str) -> Result<(ParkRecord, Geometry), ImpactError> {
        let park = self
            .parks
            .park(park_id)
            .await?
            .ok_or_else(|| ImpactError::NotFound {
                park_id: park_id.to_string(),
            })?;
        let footprint = park_geometry(&park)?;
        Ok((park, footprint))
    }

    /// Statistics for a park; a missing record or failed lookup yields an
    /// empty record.
    async fn statistics(&self, park_id: &str) -> ParkStatistics {
        match self.parks.statistics(park_id).await {
            Ok(Some(stats)) => stats,
            Ok(None) => {
                log::warn!("No statistics recorded for park {park_id}");
                ParkStatistics::default()
            }
            Err(e) => {
                log::warn!("Statistics lookup for park {park_id} failed: {e}");
                ParkStatistics::default()
            }
        }
    }

    /// Population over `geometry` and the walkability derived from it.
    async fn occupancy(&self, geometry: &Geometry) -> Occupancy {
        let population = self.metrics.population(geometry).await;
        Occupancy {
            population,
            walkability: population.map(|p| walkability_score(p, geometry.area_km2())),
        }
    }
}

/// Parses a park's stored geometry.
fn park_geometry(park: &ParkRecord) -> Result<Geometry, ImpactError> {
    match &park.geometry {
        Some(raw) if park.has_geometry() => Ok(parkpulse_geometry::parse(raw)?),
        _ => Err(ImpactError::NoGeometry {
            park_id: park.park_id.clone(),
        }),
    }
}

/// `(before - after) / before * 100`, 1 decimal. `None` if either value
/// is unknown or `before` is zero.
fn ndvi_loss_percent(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    let (before, after) = before.zip(after)?;
    if before == 0.0 {
        return None;
    }
    Some(round_to((before - after) / before * 100.0, 1))
}

fn snapshot(ndvi: Option<f64>, pm25: Option<f64>, occupancy: &Occupancy) -> MetricSnapshot {
    MetricSnapshot {
        ndvi: ndvi.map(|v| round_to(v, 4)),
        walkability: occupancy.walkability,
        pm25: pm25.map(|v| round_to(v, 2)),
        affected_population: occupancy.population.map(people),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn people(population: f64) -> u64 {
    population.max(0.0).round() as u64
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parkpulse_impact_models::HealthRisk;
    use parkpulse_parks::ParkStoreError;
    use parkpulse_parks::geojson_file::GeoJsonStore;
    use parkpulse_raster::catalog::ProductCatalog;
    use parkpulse_raster::{RasterError, RasterService, RasterSettings};
    use parkpulse_raster_models::RasterQuery;
    use serde_json::json;

    use super::*;

    /// Which geometry a raster call was made against.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Region {
        /// The park polygon itself.
        Footprint,
        /// The buffered service area.
        ServiceArea,
        /// The service area with the park cut out.
        Remaining,
    }

    fn region_of(geometry: &geojson::Geometry) -> Region {
        match &geometry.value {
            geojson::Value::Polygon(_) => Region::Footprint,
            geojson::Value::MultiPolygon(polygons) if polygons.iter().any(|p| p.len() > 1) => {
                Region::Remaining
            }
            _ => Region::ServiceArea,
        }
    }

    /// Raster double answering per product and region.
    #[derive(Default)]
    struct ScriptedRaster {
        ndvi_service_area: Option<f64>,
        ndvi_remaining: Option<f64>,
        ndvi_overlay: Option<f64>,
        ndvi_footprint: Option<f64>,
        pm25: Option<f64>,
        pm25_remaining: Option<f64>,
        pm25_fails: bool,
        population: Option<f64>,
        calls: AtomicUsize,
        log: Mutex<Vec<(String, Region, bool)>>,
    }

    impl ScriptedRaster {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl RasterService for ScriptedRaster {
        async fn reduce(
            &self,
            geometry: &geojson::Geometry,
            query: &RasterQuery,
        ) -> Result<Option<f64>, RasterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let region = region_of(geometry);
            self.log.lock().unwrap().push((
                query.product.id.clone(),
                region,
                query.overlay.is_some(),
            ));

            let value = match (query.product.id.as_str(), region) {
                ("ndvi", _) if query.overlay.is_some() => self.ndvi_overlay,
                ("ndvi", Region::ServiceArea) => self.ndvi_service_area,
                ("ndvi", Region::Remaining) => self.ndvi_remaining,
                ("ndvi", Region::Footprint) => self.ndvi_footprint,
                ("pm25" | "aerosol_index", _) if self.pm25_fails => {
                    return Err(RasterError::Service {
                        status: 500,
                        message: "collection unavailable".to_string(),
                    });
                }
                ("pm25", Region::Remaining) => self.pm25_remaining,
                ("pm25", _) => self.pm25,
                ("population", _) => self.population,
                (other, _) => panic!("unexpected product {other}"),
            };
            Ok(value)
        }
    }

    const PARK_ID: &str = "501";
    /// Mapped as a point and without statistics.
    const POINT_PARK_ID: &str = "503";

    fn park_polygon() -> serde_json::Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [-122.4300, 37.7600], [-122.4290, 37.7600], [-122.4290, 37.7610],
                [-122.4300, 37.7610], [-122.4300, 37.7600]
            ]]
        })
    }

    fn store() -> Arc<dyn ParkStore> {
        let parks = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": park_polygon(),
                    "properties": {
                        "Park_id": PARK_ID,
                        "Park_Name": "Duboce Park",
                        "Park_Size_Acres": 4.3
                    }
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": { "Park_id": "502", "Park_Name": "Paper Park" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-122.4295, 37.7605] },
                    "properties": { "Park_id": POINT_PARK_ID, "Park_Name": "Pocket Plaza" }
                }
            ]
        });
        let stats = json!([
            { "park_id": PARK_ID, "sum_totpop": 12500, "sum_kidsvc": 1800, "sum_senior": 2100,
              "sum_hisp_s": 2600, "sum_hhilow": 900, "peracre": 2907.0 }
        ]);
        let stats = stats.to_string();
        let store = GeoJsonStore::from_json(&parks.to_string(), Some(&stats)).unwrap();
        Arc::new(store)
    }

    /// Store whose statistics lookup always fails.
    struct FailingStatistics(Arc<dyn ParkStore>);

    #[async_trait::async_trait]
    impl ParkStore for FailingStatistics {
        async fn park(&self, park_id: &str) -> Result<Option<ParkRecord>, ParkStoreError> {
            self.0.park(park_id).await
        }

        async fn statistics(
            &self,
            _park_id: &str,
        ) -> Result<Option<ParkStatistics>, ParkStoreError> {
            Err(ParkStoreError::Config {
                message: "statistics table missing".to_string(),
            })
        }
    }

    fn engine_with_store(raster: &Arc<ScriptedRaster>, parks: Arc<dyn ParkStore>) -> ImpactEngine {
        let service: Arc<dyn RasterService> = raster.clone();
        let metrics = MetricProviders::new(
            service,
            ProductCatalog::embedded(),
            RasterSettings::default(),
        );
        ImpactEngine::new(parks, metrics, ImpactConfig::embedded())
    }

    fn engine(raster: &Arc<ScriptedRaster>) -> ImpactEngine {
        engine_with_store(raster, store())
    }

    fn baseline() -> ScriptedRaster {
        ScriptedRaster {
            ndvi_service_area: Some(0.6),
            ndvi_remaining: Some(0.45),
            ndvi_overlay: Some(0.51),
            ndvi_footprint: Some(0.72),
            pm25: Some(20.0),
            pm25_remaining: Some(21.5),
            population: Some(15_000.0),
            ..ScriptedRaster::default()
        }
    }

    #[tokio::test]
    async fn removal_report_matches_expected_numbers() {
        let raster = Arc::new(baseline());
        let report = engine(&raster)
            .compute_impact(PARK_ID, LandUseScenario::Removed)
            .await
            .unwrap();

        assert_eq!(report.park_name, "Duboce Park");
        assert_eq!(report.before.pm25, Some(20.0));
        assert_eq!(report.after.pm25, Some(24.0));
        assert_eq!(report.deltas.pm25_increase, Some(4.0));
        assert!((report.deltas.pm25_increase_percent - 20.0).abs() < f64::EPSILON);
        assert_eq!(report.deltas.ndvi_loss_percent, Some(25.0));
        assert_eq!(report.before.ndvi, Some(0.6));
        assert_eq!(report.after.ndvi, Some(0.45));
        assert_eq!(report.before.affected_population, Some(15_000));
        assert_eq!(report.demographics.total_population, Some(12_500.0));
        assert_eq!(report.demographics.income.low, Some(900.0));
        assert!(report.message.contains("Removing Duboce Park"));
    }

    #[tokio::test]
    async fn pm25_after_is_synthesized_not_measured() {
        let raster = Arc::new(baseline());
        engine(&raster)
            .compute_impact(PARK_ID, LandUseScenario::Removed)
            .await
            .unwrap();

        let log = raster.log.lock().unwrap();
        let pm25_calls: Vec<_> = log.iter().filter(|(id, _, _)| id == "pm25").collect();
        assert_eq!(pm25_calls.len(), 1);
        assert_eq!(pm25_calls[0].1, Region::ServiceArea);
    }

    #[tokio::test]
    async fn walkability_after_uses_remaining_area_for_every_scenario() {
        for scenario in [
            LandUseScenario::Removed,
            LandUseScenario::ReplacedByBuilding,
            LandUseScenario::Modification,
        ] {
            let raster = Arc::new(baseline());
            engine(&raster)
                .compute_impact(PARK_ID, scenario)
                .await
                .unwrap();

            let log = raster.log.lock().unwrap();
            let regions: Vec<Region> = log
                .iter()
                .filter(|(id, _, _)| id == "population")
                .map(|(_, region, _)| *region)
                .collect();
            assert!(regions.contains(&Region::ServiceArea), "{scenario}");
            assert!(regions.contains(&Region::Remaining), "{scenario}");
        }
    }

    #[tokio::test]
    async fn replacement_blends_built_up_ndvi_and_uses_higher_multiplier() {
        let raster = Arc::new(baseline());
        let report = engine(&raster)
            .compute_impact(PARK_ID, LandUseScenario::ReplacedByBuilding)
            .await
            .unwrap();

        assert!((report.deltas.pm25_increase_percent - 35.0).abs() < f64::EPSILON);
        assert_eq!(report.after.pm25, Some(27.0));
        assert_eq!(report.after.ndvi, Some(0.51));
        assert_eq!(report.deltas.ndvi_loss_percent, Some(15.0));

        let log = raster.log.lock().unwrap();
        let overlay_regions: Vec<Region> = log
            .iter()
            .filter(|(id, _, overlay)| id == "ndvi" && *overlay)
            .map(|(_, region, _)| *region)
            .collect();
        assert!(overlay_regions.contains(&Region::ServiceArea));
    }

    #[tokio::test]
    async fn modification_keeps_ndvi_and_uses_report_multiplier() {
        let raster = Arc::new(baseline());
        let report = engine(&raster)
            .compute_impact(PARK_ID, LandUseScenario::Modification)
            .await
            .unwrap();

        assert_eq!(report.after.ndvi, report.before.ndvi);
        assert_eq!(report.deltas.ndvi_loss_percent, Some(0.0));
        assert!((report.deltas.pm25_increase_percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(report.after.pm25, Some(22.0));
    }

    #[tokio::test]
    async fn unknown_pm25_keeps_increase_percent() {
        let raster = Arc::new(ScriptedRaster {
            pm25_fails: true,
            ..baseline()
        });
        let report = engine(&raster)
            .compute_impact(PARK_ID, LandUseScenario::Removed)
            .await
            .unwrap();

        assert_eq!(report.before.pm25, None);
        assert_eq!(report.after.pm25, None);
        assert_eq!(report.deltas.pm25_increase, None);
        assert!((report.deltas.pm25_increase_percent - 20.0).abs() < f64::EPSILON);
        let summary = &report.summary;
        assert!(summary.pm25_impact.contains("from unknown to unknown"));
    }

    #[tokio::test]
    async fn failed_statistics_lookup_yields_empty_demographics() {
        let raster = Arc::new(baseline());
        let parks: Arc<dyn ParkStore> = Arc::new(FailingStatistics(store()));
        let report = engine_with_store(&raster, parks)
            .compute_impact(PARK_ID, LandUseScenario::Removed)
            .await
            .unwrap();

        assert_eq!(report.demographics, DemographicBreakdown::default());
        assert_eq!(report.before.affected_population, Some(15_000));
        assert_eq!(report.after.pm25, Some(24.0));
    }

    #[tokio::test]
    async fn point_park_leaves_service_area_unchanged() {
        let raster = Arc::new(baseline());
        let report = engine(&raster)
            .compute_impact(POINT_PARK_ID, LandUseScenario::Removed)
            .await
            .unwrap();

        assert_eq!(report.park_name, "Pocket Plaza");
        assert_eq!(report.demographics, DemographicBreakdown::default());
        assert_eq!(report.before.ndvi, Some(0.6));
        assert_eq!(report.after.ndvi, Some(0.6));
        assert_eq!(report.deltas.ndvi_loss_percent, Some(0.0));
        assert_eq!(report.after.affected_population, Some(15_000));
        assert_eq!(report.after.pm25, Some(24.0));

        let log = raster.log.lock().unwrap();
        assert!(!log.is_empty());
        for (product, region, _) in log.iter() {
            assert_eq!(*region, Region::ServiceArea, "{product}");
        }
    }

    #[tokio::test]
    async fn unknown_park_fails_before_any_raster_call() {
        let raster = Arc::new(baseline());
        let err = engine(&raster)
            .compute_impact("nope", LandUseScenario::Removed)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(raster.calls(), 0);
    }

    #[tokio::test]
    async fn park_without_geometry_is_client_error() {
        let raster = Arc::new(baseline());
        let err = engine(&raster)
            .compute_impact("502", LandUseScenario::Removed)
            .await
            .unwrap_err();

        assert!(matches!(err, ImpactError::NoGeometry { .. }));
        assert!(err.is_client_error());
        assert_eq!(raster.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_geometry_fails_before_any_raster_call() {
        let raster = Arc::new(baseline());
        let err = engine(&raster)
            .compute_impact_for_geometry(&json!({ "type": "Polygon" }), LandUseScenario::Removed)
            .await
            .unwrap_err();

        assert!(matches!(err, ImpactError::InvalidGeometry(_)));
        assert_eq!(raster.calls(), 0);

        let err = engine(&raster)
            .compute_single_metric(&json!("not json"), MetricKind::Ndvi)
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(raster.calls(), 0);
    }

    #[tokio::test]
    async fn ad_hoc_geometry_measures_pm25_after() {
        let raster = Arc::new(baseline());
        let delta = engine(&raster)
            .compute_impact_for_geometry(&park_polygon(), LandUseScenario::Removed)
            .await
            .unwrap();

        assert_eq!(delta.before.pm25, Some(20.0));
        assert_eq!(delta.after.pm25, Some(21.5));
        assert_eq!(delta.ndvi_loss_percent, Some(25.0));
        assert!((delta.buffer_m - 800.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn single_metric_is_measured_on_raw_geometry() {
        let raster = Arc::new(baseline());
        let value = engine(&raster)
            .compute_single_metric(&park_polygon(), MetricKind::Ndvi)
            .await
            .unwrap();

        assert_eq!(value, Some(0.72));
        assert_eq!(raster.calls(), 1);
    }

    #[tokio::test]
    async fn pollution_only_uses_its_own_table() {
        let raster = Arc::new(baseline());
        let report = engine(&raster)
            .assess_pollution_only(PARK_ID, LandUseScenario::Modification)
            .await
            .unwrap();

        assert!((report.buffer_m - 1000.0).abs() < f64::EPSILON);
        assert!((report.pollution_increase_percent - 15.0).abs() < f64::EPSILON);
        assert_eq!(report.current_pm25, Some(20.0));
        assert_eq!(report.estimated_pm25_after, Some(23.0));
        assert_eq!(report.pollution_increase, Some(3.0));
        assert_eq!(report.impact_description, "modification");

        let after = report.after_assessment.unwrap();
        assert_eq!(after.health_risk, HealthRisk::UnhealthyForSensitiveGroups);
        assert!(report.message.contains("could increase by 15.0%"));
    }

    #[tokio::test]
    async fn pollution_only_without_pm25_has_no_after_assessment() {
        let raster = Arc::new(ScriptedRaster {
            pm25_fails: true,
            ..baseline()
        });
        let report = engine(&raster)
            .assess_pollution_only(PARK_ID, LandUseScenario::Removed)
            .await
            .unwrap();

        assert_eq!(report.current_pm25, None);
        assert!(report.after_assessment.is_none());
        assert!((report.pollution_increase_percent - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn park_ndvi_uses_footprint() {
        let raster = Arc::new(baseline());
        let ndvi = engine(&raster).park_ndvi(PARK_ID).await.unwrap();
        assert_eq!(ndvi, Some(0.72));
    }

    #[tokio::test]
    async fn park_air_quality_classifies_footprint_pm25() {
        let raster = Arc::new(baseline());
        let aq = engine(&raster).park_air_quality(PARK_ID).await.unwrap();

        let current = aq.current_air_quality.unwrap();
        assert_eq!(current.health_risk, HealthRisk::UnhealthyForSensitiveGroups);
        assert!((current.who_guideline_exceedance - 4.0).abs() < f64::EPSILON);
        let message = &aq.message;
        assert!(message.starts_with("Air quality assessment for Duboce Park"));
    }

    #[tokio::test]
    async fn park_information_falls_back_to_template() {
        let raster = Arc::new(baseline());
        let info = engine(&raster).park_information(PARK_ID).await.unwrap();

        assert_eq!(info.details.area_acres, Some(4.3));
        assert_eq!(info.details.population_served, Some(12_500.0));
        assert_eq!(info.details.ndvi, Some(0.72));
        assert!(info.description.starts_with("**Duboce Park**"));
        assert!(info.description.contains("12,500 people"));
    }

    #[tokio::test]
    async fn park_information_tolerates_missing_geometry() {
        let raster = Arc::new(baseline());
        let info = engine(&raster).park_information("502").await.unwrap();

        assert_eq!(info.details.ndvi, None);
        assert!(info.details.air_quality.is_none());
        assert!(info.description.contains("(NDVI) of Unknown"));
        assert_eq!(raster.calls(), 0);
    }

    #[test]
    fn ndvi_loss_is_relative() {
        assert_eq!(ndvi_loss_percent(Some(0.5), Some(0.3)), Some(40.0));
        assert_eq!(ndvi_loss_percent(Some(0.6), Some(0.45)), Some(25.0));
        assert_eq!(ndvi_loss_percent(Some(0.0), Some(0.1)), None);
        assert_eq!(ndvi_loss_percent(None, Some(0.1)), None);
    }
}
