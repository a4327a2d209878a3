//! Community proposal drafts.
//!
//! Only builds the payload. Submission and voting are handled by
//! whatever consumes the draft.

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use parkpulse_ai::proposal::summarize_proposal;
use parkpulse_impact_models::{ImpactReport, ProposalDraft, ProposalEnvironment};

use crate::engine::ImpactEngine;

/// Deadline used when none is given or it cannot be parsed.
pub const DEFAULT_VOTING_DAYS: u64 = 30;

const DEADLINE_FORMATS: [&str; 3] = ["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d"];

/// Parses a voting deadline such as `"March 5, 2026"`, `"Mar 5, 2026"`
/// or `"2026-03-05"`.
///
/// Falls back to `today` plus [`DEFAULT_VOTING_DAYS`].
#[must_use]
pub fn parse_deadline(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let default = || {
        today
            .checked_add_days(Days::new(DEFAULT_VOTING_DAYS))
            .unwrap_or(today)
    };

    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default();
    };

    DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .unwrap_or_else(|| {
            log::warn!("Unrecognized deadline '{raw}', defaulting to {DEFAULT_VOTING_DAYS} days");
            default()
        })
}

/// Midnight UTC of `date` in nanoseconds since the Unix epoch.
fn epoch_nanos(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp_nanos_opt()
        .unwrap_or_default()
}

impl ImpactEngine {
    /// Drafts a community proposal for the park in `report`.
    ///
    /// The environmental data records current (before) conditions.
    pub async fn draft_proposal(
        &self,
        report: &ImpactReport,
        deadline: Option<&str>,
    ) -> ProposalDraft {
        let created_at = Utc::now();
        let end_date = parse_deadline(deadline, created_at.date_naive());
        let description = summarize_proposal(self.narrator(), report).await;

        ProposalDraft {
            park_id: report.park_id.clone(),
            park_name: report.park_name.clone(),
            description,
            end_date,
            end_date_label: end_date.format("%B %-d, %Y").to_string(),
            end_date_ns: epoch_nanos(end_date),
            environmental_data: ProposalEnvironment {
                pm25: report.before.pm25,
                ndvi: report.before.ndvi,
                walkability: report.before.walkability,
            },
            affected_population: affected_population(report),
            created_at,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn affected_population(report: &ImpactReport) -> Option<u64> {
    report.residents().map(|p| p.max(0.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parkpulse_ai::AiError;
    use parkpulse_ai::providers::NarrativeProvider;
    use parkpulse_impact_models::{
        DemographicBreakdown, ImpactDeltas, ImpactSummary, LandUseScenario, MetricSnapshot,
    };
    use parkpulse_parks::geojson_file::GeoJsonStore;
    use parkpulse_raster::catalog::ProductCatalog;
    use parkpulse_raster::metrics::MetricProviders;
    use parkpulse_raster::{RasterError, RasterService, RasterSettings};
    use parkpulse_raster_models::RasterQuery;

    use super::*;
    use crate::config::ImpactConfig;

    struct NoRaster;

    #[async_trait::async_trait]
    impl RasterService for NoRaster {
        async fn reduce(
            &self,
            _geometry: &geojson::Geometry,
            _query: &RasterQuery,
        ) -> Result<Option<f64>, RasterError> {
            Ok(None)
        }
    }

    struct Echo;

    #[async_trait::async_trait]
    impl NarrativeProvider for Echo {
        async fn complete(&self, _system_prompt: &str, _prompt: &str) -> Result<String, AiError> {
            Ok("  Keep Dolores Park green.  ".to_string())
        }
    }

    fn engine() -> ImpactEngine {
        let parks = GeoJsonStore::from_json(r#"{"type":"FeatureCollection","features":[]}"#, None)
            .unwrap();
        let metrics = MetricProviders::new(
            Arc::new(NoRaster),
            ProductCatalog::embedded(),
            RasterSettings::default(),
        );
        ImpactEngine::new(Arc::new(parks), metrics, ImpactConfig::embedded())
    }

    fn report() -> ImpactReport {
        ImpactReport {
            park_id: "7".to_string(),
            park_name: "Dolores Park".to_string(),
            scenario: LandUseScenario::Removed,
            buffer_m: 800.0,
            before: MetricSnapshot {
                ndvi: Some(0.52),
                walkability: Some(88.1),
                pm25: Some(9.4),
                affected_population: Some(21_300),
            },
            after: MetricSnapshot {
                ndvi: Some(0.4),
                walkability: Some(87.9),
                pm25: Some(11.28),
                affected_population: Some(21_000),
            },
            deltas: ImpactDeltas {
                ndvi_loss_percent: Some(23.1),
                pm25_increase: Some(1.88),
                pm25_increase_percent: 20.0,
            },
            demographics: DemographicBreakdown::default(),
            summary: ImpactSummary::default(),
            message: String::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_deadline_formats() {
        let today = day(2026, 1, 10);
        assert_eq!(parse_deadline(Some("March 5, 2026"), today), day(2026, 3, 5));
        assert_eq!(parse_deadline(Some("Mar 05, 2026"), today), day(2026, 3, 5));
        assert_eq!(parse_deadline(Some(" 2026-03-05 "), today), day(2026, 3, 5));
    }

    #[test]
    fn unparseable_deadline_defaults_to_thirty_days() {
        let today = day(2026, 1, 10);
        assert_eq!(parse_deadline(None, today), day(2026, 2, 9));
        assert_eq!(parse_deadline(Some(""), today), day(2026, 2, 9));
        assert_eq!(parse_deadline(Some("next friday"), today), day(2026, 2, 9));
    }

    #[test]
    fn epoch_nanos_is_midnight_utc() {
        assert_eq!(epoch_nanos(day(1970, 1, 2)), 86_400_000_000_000);
    }

    #[tokio::test]
    async fn draft_uses_template_without_narrator() {
        let draft = engine().draft_proposal(&report(), Some("2026-03-05")).await;

        assert_eq!(draft.end_date_label, "March 5, 2026");
        assert_eq!(draft.environmental_data.pm25, Some(9.4));
        assert_eq!(draft.affected_population, Some(21_300));
        assert!(draft.description.contains("Dolores Park"));
    }

    #[tokio::test]
    async fn draft_uses_narrator_text_when_configured() {
        let engine = engine().with_narrator(Arc::new(Echo));
        let draft = engine.draft_proposal(&report(), None).await;

        assert_eq!(draft.description, "Keep Dolores Park green.");
        assert!(draft.end_date > Utc::now().date_naive());
    }
}
