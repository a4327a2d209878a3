//! Park descriptions.

use parkpulse_impact_models::format::{count, decimal, text};
use parkpulse_impact_models::{AirQualityAssessment, ParkFacts};

use crate::generate_or_fallback;
use crate::providers::NarrativeProvider;

const SYSTEM_PROMPT: &str = "You write friendly, accurate descriptions of city parks for \
                             residents and visitors. Use only the facts you are given.";

/// Describes a park, using the provider when available and the template
/// otherwise.
pub async fn describe_park(provider: Option<&dyn NarrativeProvider>, facts: &ParkFacts) -> String {
    generate_or_fallback(provider, SYSTEM_PROMPT, &park_prompt(facts), || {
        park_fallback(facts)
    })
    .await
}

/// Builds the generation prompt for a park fact sheet.
#[must_use]
pub fn park_prompt(facts: &ParkFacts) -> String {
    let air_quality = facts
        .air_quality
        .as_ref()
        .map(air_quality_section)
        .unwrap_or_default();

    format!(
        "Generate a comprehensive description of this park based on the following data:

Park Name: {name}
Address: {address}
Owner/Manager: {owner}
ZIP Code: {zip}
Area: {area} acres
Population Served (10-min walk): {population} people
Kids Served: {kids}
Seniors Served: {seniors}
Demand per Acre: {demand}
Vegetation Health (NDVI): {ndvi}{air_quality}

Please provide:
1. A brief overview of the park
2. Key features and characteristics
3. Community impact and demographics served
4. Environmental health indicators (including air quality and pollution impact)
5. Health recommendations based on air quality data

Write in a friendly, informative tone suitable for residents and visitors. \
Pay special attention to air quality concerns and environmental health.",
        name = facts.name,
        address = text(facts.address.as_deref()),
        owner = text(facts.owner.as_deref()),
        zip = text(facts.zip.as_deref()),
        area = decimal(facts.area_acres, 2),
        population = count(facts.population_served),
        kids = count(facts.kids_served),
        seniors = count(facts.seniors_served),
        demand = decimal(facts.per_acre_demand, 1),
        ndvi = decimal(facts.ndvi, 3),
    )
}

fn air_quality_section(aq: &AirQualityAssessment) -> String {
    format!(
        "

Air Quality Assessment:
- PM2.5 Concentration: {pm25:.2} μg/m³
- Health Risk Level: {risk}
- Environmental Impact: {damage}
- WHO Guideline Exceedance: {who:.2}x
- Health Impact: {impact}
- Recommendations: {advice}",
        pm25 = aq.pm25_ugm3,
        risk = aq.health_risk,
        damage = aq.environmental_damage,
        who = aq.who_guideline_exceedance,
        impact = aq.health_impact,
        advice = aq.recommendation,
    )
}

/// Deterministic description built from the same facts.
#[must_use]
pub fn park_fallback(facts: &ParkFacts) -> String {
    let mut description = format!(
        "**{name}**

This {area}-acre park is located at {address} in ZIP code {zip}. \
It's managed by {owner} and serves approximately {population} people within a 10-minute walk.

The park provides recreational opportunities for {kids} children and {seniors} seniors \
in the surrounding community. With a vegetation health index (NDVI) of {ndvi}, it \
contributes to the local environmental quality and urban green space.",
        name = facts.name,
        area = decimal(facts.area_acres, 2),
        address = text(facts.address.as_deref()),
        zip = text(facts.zip.as_deref()),
        owner = text(facts.owner.as_deref()),
        population = count(facts.population_served),
        kids = count(facts.kids_served),
        seniors = count(facts.seniors_served),
        ndvi = decimal(facts.ndvi, 3),
    );

    if let Some(aq) = &facts.air_quality {
        description.push_str(&format!(
            "\n\nAnnual PM2.5 around the park is {:.2} μg/m³ ({}). {}",
            aq.pm25_ugm3, aq.health_risk, aq.recommendation
        ));
    }

    description
}

#[cfg(test)]
mod tests {
    use parkpulse_impact_models::{EnvironmentalDamage, HealthRisk};

    use super::*;
    use crate::testing::FixedProvider;

    fn facts() -> ParkFacts {
        ParkFacts {
            name: "Alamo Square".to_string(),
            address: Some("Steiner St & Hayes St".to_string()),
            owner: None,
            zip: Some("94117".to_string()),
            area_acres: Some(12.7),
            population_served: Some(15_000.0),
            kids_served: Some(2_000.0),
            seniors_served: None,
            per_acre_demand: None,
            ndvi: Some(0.412),
            air_quality: None,
        }
    }

    #[test]
    fn fallback_renders_unknown_for_missing_values() {
        let text = park_fallback(&facts());
        assert!(text.starts_with("**Alamo Square**"));
        assert!(text.contains("This 12.70-acre park"));
        assert!(text.contains("managed by Unknown"));
        assert!(text.contains("approximately 15,000 people"));
        assert!(text.contains("and Unknown seniors"));
        assert!(text.contains("(NDVI) of 0.412"));
        assert!(!text.contains("PM2.5"));
    }

    #[test]
    fn prompt_includes_air_quality_when_known() {
        let facts = ParkFacts {
            air_quality: Some(AirQualityAssessment {
                pm25_ugm3: 8.4,
                health_risk: HealthRisk::Moderate,
                environmental_damage: EnvironmentalDamage::LowToModerate,
                who_guideline_exceedance: 1.68,
                epa_standard_exceedance: 0.7,
                health_impact: "Exceeds WHO guidelines - increased respiratory risk".to_string(),
                recommendation: "Air quality is acceptable.".to_string(),
            }),
            ..facts()
        };
        let prompt = park_prompt(&facts);
        assert!(prompt.contains("PM2.5 Concentration: 8.40 μg/m³"));
        assert!(prompt.contains("Health Risk Level: Moderate"));
        assert!(prompt.contains("WHO Guideline Exceedance: 1.68x"));
    }

    #[tokio::test]
    async fn provider_failure_yields_template() {
        let provider = FixedProvider::failing();
        let description = describe_park(Some(&provider), &facts()).await;
        assert_eq!(description, park_fallback(&facts()));
        assert_eq!(provider.calls(), 1);
    }
}
