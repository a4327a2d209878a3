#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Impact report types.
//!
//! Everything the impact engine returns is defined here as an explicit
//! record. Any metric that can fail upstream is an `Option`; `None`
//! means "unknown" and is never interchangeable with zero.

pub mod format;

use chrono::{DateTime, NaiveDate, Utc};
use parkpulse_parks_models::ParkStatistics;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Land-use change applied to a park.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LandUseScenario {
    /// The park footprint is excised from its service area.
    Removed,
    /// The park footprint becomes built-up land.
    ReplacedByBuilding,
    /// Any other change. No NDVI change is modelled.
    #[serde(other)]
    Modification,
}

impl LandUseScenario {
    /// Parses a scenario label, mapping anything unrecognized to
    /// [`Self::Modification`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or(Self::Modification)
    }

    /// Short phrase describing the change, e.g. `"complete removal"`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Removed => "complete removal",
            Self::ReplacedByBuilding => "replacement with buildings",
            Self::Modification => "modification",
        }
    }
}

/// Six-level PM2.5 health-risk tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum HealthRisk {
    /// At most 5 µg/m³.
    Low,
    /// At most 12 µg/m³.
    Moderate,
    /// At most 25 µg/m³.
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    #[strum(serialize = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    /// At most 35 µg/m³.
    Unhealthy,
    /// At most 50 µg/m³.
    #[serde(rename = "Very Unhealthy")]
    #[strum(serialize = "Very Unhealthy")]
    VeryUnhealthy,
    /// Above 50 µg/m³.
    Hazardous,
}

/// Six-level environmental-damage tier, parallel to [`HealthRisk`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum EnvironmentalDamage {
    /// At most 5 µg/m³.
    #[serde(rename = "Minimal environmental impact")]
    #[strum(serialize = "Minimal environmental impact")]
    Minimal,
    /// At most 12 µg/m³.
    #[serde(rename = "Low to moderate environmental stress")]
    #[strum(serialize = "Low to moderate environmental stress")]
    LowToModerate,
    /// At most 25 µg/m³.
    #[serde(rename = "Moderate environmental degradation")]
    #[strum(serialize = "Moderate environmental degradation")]
    Moderate,
    /// At most 35 µg/m³.
    #[serde(rename = "Significant environmental stress")]
    #[strum(serialize = "Significant environmental stress")]
    Significant,
    /// At most 50 µg/m³.
    #[serde(rename = "Severe environmental degradation")]
    #[strum(serialize = "Severe environmental degradation")]
    Severe,
    /// Above 50 µg/m³.
    #[serde(rename = "Critical environmental damage")]
    #[strum(serialize = "Critical environmental damage")]
    Critical,
}

/// Categorical classification of a single PM2.5 value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityAssessment {
    /// PM2.5 concentration in µg/m³, rounded to 2 decimals.
    pub pm25_ugm3: f64,
    /// Health-risk tier.
    pub health_risk: HealthRisk,
    /// Environmental-damage tier.
    pub environmental_damage: EnvironmentalDamage,
    /// Ratio to the WHO annual guideline (5 µg/m³).
    pub who_guideline_exceedance: f64,
    /// Ratio to the EPA annual standard (12 µg/m³).
    pub epa_standard_exceedance: f64,
    /// One-line health impact.
    pub health_impact: String,
    /// Advice for residents.
    pub recommendation: String,
}

/// Metrics for one state (before or after) of a service area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    /// Mean NDVI, 4 decimals.
    pub ndvi: Option<f64>,
    /// Walkability score, 2 decimals.
    pub walkability: Option<f64>,
    /// PM2.5 in µg/m³, 2 decimals.
    pub pm25: Option<f64>,
    /// Residents in the area.
    pub affected_population: Option<u64>,
}

/// Before/after differences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactDeltas {
    /// Relative NDVI loss in percent, 1 decimal.
    pub ndvi_loss_percent: Option<f64>,
    /// Absolute PM2.5 increase in µg/m³, 2 decimals.
    pub pm25_increase: Option<f64>,
    /// PM2.5 increase in percent, derived from the scenario multiplier
    /// alone.
    pub pm25_increase_percent: f64,
}

/// Residents by age band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBreakdown {
    pub kids: Option<f64>,
    pub young_adults: Option<f64>,
    pub seniors: Option<f64>,
}

/// Residents by race/ethnicity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceBreakdown {
    pub white: Option<f64>,
    pub black: Option<f64>,
    pub asian: Option<f64>,
    pub hispanic: Option<f64>,
}

/// Households by income tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBreakdown {
    pub low: Option<f64>,
    pub middle: Option<f64>,
    pub high: Option<f64>,
}

/// Walkshed demographics, carried through from the statistics record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicBreakdown {
    /// Total residents within a 10-minute walk.
    pub total_population: Option<f64>,
    pub age: AgeBreakdown,
    pub race: RaceBreakdown,
    pub income: IncomeBreakdown,
    /// Total households.
    pub households: Option<f64>,
    /// Residents per acre of park.
    pub per_acre_demand: Option<f64>,
}

impl From<&ParkStatistics> for DemographicBreakdown {
    fn from(stats: &ParkStatistics) -> Self {
        Self {
            total_population: stats.total_population,
            age: AgeBreakdown {
                kids: stats.kids,
                young_adults: stats.young_adults,
                seniors: stats.seniors,
            },
            race: RaceBreakdown {
                white: stats.white,
                black: stats.black,
                asian: stats.asian,
                hispanic: stats.hispanic,
            },
            income: IncomeBreakdown {
                low: stats.low_income_households,
                middle: stats.middle_income_households,
                high: stats.high_income_households,
            },
            households: stats.total_households,
            per_acre_demand: stats.per_acre_demand,
        }
    }
}

/// One-line summaries of an impact report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub people_affected: String,
    pub ndvi_impact: String,
    pub pm25_impact: String,
}

/// Full before/after impact report for a stored park.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub park_id: String,
    /// Display name, or a placeholder when the park is unnamed.
    pub park_name: String,
    pub scenario: LandUseScenario,
    /// Service-area buffer radius in metres.
    pub buffer_m: f64,
    /// Measured on the full service area.
    pub before: MetricSnapshot,
    /// Simulated state after the land-use change.
    pub after: MetricSnapshot,
    pub deltas: ImpactDeltas,
    /// Empty when the park has no statistics record.
    pub demographics: DemographicBreakdown,
    pub summary: ImpactSummary,
    /// Long-form multi-section summary.
    pub message: String,
}

impl ImpactReport {
    /// Residents losing park access, preferring the statistics record
    /// over the raster estimate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn residents(&self) -> Option<f64> {
        self.demographics
            .total_population
            .or_else(|| self.before.affected_population.map(|p| p as f64))
    }
}

/// Before/after metrics for an ad hoc geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub scenario: LandUseScenario,
    /// Service-area buffer radius in metres.
    pub buffer_m: f64,
    pub before: MetricSnapshot,
    pub after: MetricSnapshot,
    /// Relative NDVI loss in percent, 1 decimal.
    pub ndvi_loss_percent: Option<f64>,
}

/// Tiers of the estimated post-change PM2.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterAssessment {
    pub pm25_ugm3: f64,
    pub health_risk: HealthRisk,
    pub environmental_damage: EnvironmentalDamage,
}

/// PM2.5-only impact report over the wider pollution buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollutionImpactReport {
    pub park_id: String,
    pub park_name: String,
    pub scenario: LandUseScenario,
    /// Service-area buffer radius in metres.
    pub buffer_m: f64,
    /// PM2.5 over the buffer in µg/m³.
    #[serde(rename = "currentPM25")]
    pub current_pm25: Option<f64>,
    /// Current PM2.5 scaled by the scenario multiplier.
    #[serde(rename = "estimatedPM25After")]
    pub estimated_pm25_after: Option<f64>,
    /// Absolute increase in µg/m³, 2 decimals.
    pub pollution_increase: Option<f64>,
    pub pollution_increase_percent: f64,
    /// `None` when current PM2.5 is unknown.
    pub after_assessment: Option<AfterAssessment>,
    /// Short phrase for the scenario, e.g. `"complete removal"`.
    pub impact_description: String,
    pub message: String,
}

/// Current air quality over a park footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkAirQuality {
    pub park_id: String,
    pub park_name: String,
    /// `None` when PM2.5 is unknown.
    pub current_air_quality: Option<AirQualityAssessment>,
    pub message: String,
}

/// Structured fact sheet about a park, used for descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkFacts {
    pub name: String,
    pub address: Option<String>,
    /// Managing agency.
    pub owner: Option<String>,
    pub zip: Option<String>,
    pub area_acres: Option<f64>,
    /// Walkshed residents from the statistics record.
    pub population_served: Option<f64>,
    pub kids_served: Option<f64>,
    pub seniors_served: Option<f64>,
    /// Residents per acre of park.
    pub per_acre_demand: Option<f64>,
    /// Footprint NDVI, 3 decimals.
    pub ndvi: Option<f64>,
    pub air_quality: Option<AirQualityAssessment>,
}

/// A park's facts plus a prose description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkInformation {
    pub park_id: String,
    pub park_name: String,
    pub description: String,
    pub details: ParkFacts,
}

/// Environmental baseline attached to a proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEnvironment {
    pub pm25: Option<f64>,
    pub ndvi: Option<f64>,
    pub walkability: Option<f64>,
}

/// A community proposal drafted from an impact report.
///
/// Submission and voting happen elsewhere; this is only the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub park_id: String,
    pub park_name: String,
    pub description: String,
    /// Voting deadline.
    pub end_date: NaiveDate,
    /// Deadline formatted as `"Month D, YYYY"`.
    pub end_date_label: String,
    /// Deadline as nanoseconds since the Unix epoch (midnight UTC).
    pub end_date_ns: i64,
    pub environmental_data: ProposalEnvironment,
    pub affected_population: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_labels_parse_leniently() {
        assert_eq!(LandUseScenario::from_label("removed"), LandUseScenario::Removed);
        assert_eq!(
            LandUseScenario::from_label(" Replaced_By_Building "),
            LandUseScenario::ReplacedByBuilding
        );
        assert_eq!(
            LandUseScenario::from_label("parking_lot"),
            LandUseScenario::Modification
        );
    }

    #[test]
    fn unknown_scenario_deserializes_as_modification() {
        let scenario: LandUseScenario = serde_json::from_str("\"paved\"").unwrap();
        assert_eq!(scenario, LandUseScenario::Modification);
        assert_eq!(
            serde_json::to_string(&LandUseScenario::ReplacedByBuilding).unwrap(),
            "\"replaced_by_building\""
        );
    }

    #[test]
    fn tiers_serialize_as_labels() {
        assert_eq!(
            serde_json::to_string(&HealthRisk::UnhealthyForSensitiveGroups).unwrap(),
            "\"Unhealthy for Sensitive Groups\""
        );
        assert_eq!(
            EnvironmentalDamage::LowToModerate.to_string(),
            "Low to moderate environmental stress"
        );
        assert!(HealthRisk::Low < HealthRisk::Hazardous);
    }

    #[test]
    fn demographics_carry_statistics_through() {
        let stats = ParkStatistics {
            total_population: Some(9_000.0),
            kids: Some(1_500.0),
            hispanic: Some(2_000.0),
            high_income_households: Some(700.0),
            per_acre_demand: Some(45.0),
            ..ParkStatistics::default()
        };
        let demographics = DemographicBreakdown::from(&stats);

        assert_eq!(demographics.total_population, Some(9_000.0));
        assert_eq!(demographics.age.kids, Some(1_500.0));
        assert_eq!(demographics.age.seniors, None);
        assert_eq!(demographics.race.hispanic, Some(2_000.0));
        assert_eq!(demographics.income.high, Some(700.0));
        assert_eq!(demographics.per_acre_demand, Some(45.0));
    }

    #[test]
    fn residents_prefer_statistics_over_raster_estimate() {
        let mut report = ImpactReport {
            park_id: "1".to_string(),
            park_name: "Test".to_string(),
            scenario: LandUseScenario::Removed,
            buffer_m: 800.0,
            before: MetricSnapshot {
                affected_population: Some(14_200),
                ..MetricSnapshot::default()
            },
            after: MetricSnapshot::default(),
            deltas: ImpactDeltas {
                ndvi_loss_percent: None,
                pm25_increase: None,
                pm25_increase_percent: 20.0,
            },
            demographics: DemographicBreakdown {
                total_population: Some(12_500.0),
                ..DemographicBreakdown::default()
            },
            summary: ImpactSummary::default(),
            message: String::new(),
        };
        assert_eq!(report.residents(), Some(12_500.0));

        report.demographics = DemographicBreakdown::default();
        assert_eq!(report.residents(), Some(14_200.0));

        report.before.affected_population = None;
        assert_eq!(report.residents(), None);
    }

    #[test]
    fn pollution_report_uses_pm25_field_names() {
        let report = PollutionImpactReport {
            park_id: "1".to_string(),
            park_name: "Test".to_string(),
            scenario: LandUseScenario::Removed,
            buffer_m: 1000.0,
            current_pm25: Some(10.0),
            estimated_pm25_after: Some(12.0),
            pollution_increase: Some(2.0),
            pollution_increase_percent: 20.0,
            after_assessment: None,
            impact_description: "complete removal".to_string(),
            message: String::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["currentPM25"], 10.0);
        assert_eq!(json["estimatedPM25After"], 12.0);
        assert_eq!(json["pollutionIncreasePercent"], 20.0);
    }
}
