//! Deterministic report text.
//!
//! Renders numbers that were already derived elsewhere; nothing here
//! computes a metric. Unknown values render as "Unknown".

use parkpulse_impact_models::format::{count, decimal, decimal_or};
use parkpulse_impact_models::{
    AirQualityAssessment, ImpactReport, ImpactSummary, LandUseScenario, PollutionImpactReport,
};

const fn gerund(scenario: LandUseScenario) -> &'static str {
    match scenario {
        LandUseScenario::Removed => "Removing",
        LandUseScenario::ReplacedByBuilding => "Replacing with buildings",
        LandUseScenario::Modification => "Modifying",
    }
}

/// One-line summaries for an impact report.
#[must_use]
pub fn impact_summary(report: &ImpactReport) -> ImpactSummary {
    let before = &report.before;
    let after = &report.after;
    let deltas = &report.deltas;

    ImpactSummary {
        people_affected: format!(
            "{} people lose park access within 10-minute walk",
            count(report.residents())
        ),
        ndvi_impact: format!(
            "Vegetation health drops from {} to {} ({}% loss)",
            decimal_or(before.ndvi, 3, "unknown"),
            decimal_or(after.ndvi, 3, "unknown"),
            decimal_or(deltas.ndvi_loss_percent, 1, "unknown"),
        ),
        pm25_impact: format!(
            "Air pollution increases by {:.1}% (from {} to {} μg/m³)",
            deltas.pm25_increase_percent,
            decimal_or(before.pm25, 2, "unknown"),
            decimal_or(after.pm25, 2, "unknown"),
        ),
    }
}

/// Long-form multi-section summary for an impact report.
#[must_use]
pub fn impact_message(report: &ImpactReport) -> String {
    let before = &report.before;
    let after = &report.after;
    let deltas = &report.deltas;
    let age = &report.demographics.age;

    format!(
        "Environmental Impact Summary:

VEGETATION HEALTH (NDVI)
   • Before: {ndvi_before}
   • After: {ndvi_after}
   • Loss: {ndvi_loss}% vegetation decline

PEOPLE AFFECTED
   • Total population losing access: {residents} people
   • Demographics: {kids} kids, {adults} young adults, {seniors} seniors

WALKABILITY
   • Before: {walk_before}
   • After: {walk_after}

AIR QUALITY (PM2.5)
   • Before: {pm25_before} μg/m³
   • After: {pm25_after} μg/m³
   • Pollution increase: +{pm25_pct:.1}% ({pm25_increase} μg/m³)

{gerund} {park} would significantly impact {residents} residents through reduced air quality, \
loss of green space, and decreased environmental health.",
        ndvi_before = decimal(before.ndvi, 3),
        ndvi_after = decimal(after.ndvi, 3),
        ndvi_loss = decimal(deltas.ndvi_loss_percent, 1),
        residents = count(report.residents()),
        kids = count(age.kids),
        adults = count(age.young_adults),
        seniors = count(age.seniors),
        walk_before = decimal(before.walkability, 2),
        walk_after = decimal(after.walkability, 2),
        pm25_before = decimal(before.pm25, 2),
        pm25_after = decimal(after.pm25, 2),
        pm25_pct = deltas.pm25_increase_percent,
        pm25_increase = deltas
            .pm25_increase
            .map_or_else(|| "Unknown".to_string(), |v| format!("{v:+.2}")),
        gerund = gerund(report.scenario),
        park = report.park_name,
    )
}

/// One-paragraph summary for a PM2.5-only report.
#[must_use]
pub fn pollution_message(report: &PollutionImpactReport) -> String {
    format!(
        "If {park} undergoes {change}, PM2.5 levels could increase by {pct:.1}% \
         (from {current} to {after} μg/m³), worsening air quality for the surrounding area.",
        park = report.park_name,
        change = report.impact_description,
        pct = report.pollution_increase_percent,
        current = decimal_or(report.current_pm25, 2, "unknown"),
        after = decimal_or(report.estimated_pm25_after, 2, "unknown"),
    )
}

/// One-line air-quality message for a park.
#[must_use]
pub fn air_quality_message(park_name: &str, assessment: Option<&AirQualityAssessment>) -> String {
    match assessment {
        Some(aq) => format!(
            "Air quality assessment for {park_name}: PM2.5 level is {:.2} μg/m³ ({} risk level)",
            aq.pm25_ugm3, aq.health_risk
        ),
        None => format!(
            "Air quality assessment for {park_name}: PM2.5 level is unknown (Unknown risk level)"
        ),
    }
}
