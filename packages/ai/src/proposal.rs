//! Community proposal summaries.

use parkpulse_impact_models::ImpactReport;
use parkpulse_impact_models::format::{count, decimal_or};

use crate::generate_or_fallback;
use crate::providers::NarrativeProvider;

const SYSTEM_PROMPT: &str = "You write concise, persuasive civic proposals. \
                             Do not use markdown formatting or emojis.";

/// Writes the proposal summary for `report`.
pub async fn summarize_proposal(
    provider: Option<&dyn NarrativeProvider>,
    report: &ImpactReport,
) -> String {
    generate_or_fallback(provider, SYSTEM_PROMPT, &summary_prompt(report), || {
        summary_fallback(report)
    })
    .await
}

/// Builds the generation prompt for a proposal summary.
#[must_use]
pub fn summary_prompt(report: &ImpactReport) -> String {
    let age = &report.demographics.age;
    format!(
        "Generate a compelling 2-3 paragraph community proposal summary for protecting this park.

Park: {park}

Environmental Data:
- Vegetation loss if changed ({scenario}): {ndvi_loss}%
- Air pollution increase: +{pm25_pct:.1}%
- Population affected: {population} residents
- Children affected: {kids}
- Young adults affected: {adults}
- Seniors affected: {seniors}

Write a persuasive summary that:
1. Explains why this park is vital to the community
2. Highlights the environmental and health consequences of losing it
3. Calls for community action to protect this green space

Keep it concise, professional, and compelling.",
        park = report.park_name,
        scenario = report.scenario.description(),
        ndvi_loss = decimal_or(report.deltas.ndvi_loss_percent, 1, "unknown"),
        pm25_pct = report.deltas.pm25_increase_percent,
        population = count(report.residents()),
        kids = count(age.kids),
        adults = count(age.young_adults),
        seniors = count(age.seniors),
    )
}

/// Deterministic proposal summary built from the same report.
#[must_use]
pub fn summary_fallback(report: &ImpactReport) -> String {
    let age = &report.demographics.age;
    format!(
        "This proposal seeks to protect {park}, a vital community asset serving {population} \
         residents. Environmental analysis shows that its {scenario} would result in a \
         {ndvi_loss}% loss in vegetation health and a {pm25_pct:.1}% increase in air pollution, \
         significantly impacting {kids} children, {adults} young adults, and {seniors} seniors \
         who depend on this green space for recreation and environmental health benefits.",
        park = report.park_name,
        population = count(report.residents()),
        scenario = report.scenario.description(),
        ndvi_loss = decimal_or(report.deltas.ndvi_loss_percent, 1, "unknown"),
        pm25_pct = report.deltas.pm25_increase_percent,
        kids = count(age.kids),
        adults = count(age.young_adults),
        seniors = count(age.seniors),
    )
}
