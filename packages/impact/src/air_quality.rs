//! PM2.5 classification.
//!
//! Pure and total: every finite PM2.5 value maps to exactly one tier.
//! Each tier's upper bound is inclusive, so 5.0 is `Low` and 5.0001 is
//! `Moderate`.

use parkpulse_impact_models::{
    AfterAssessment, AirQualityAssessment, EnvironmentalDamage, HealthRisk,
};
use parkpulse_raster::metrics::round_to;

/// WHO annual PM2.5 guideline (2021), µg/m³.
pub const WHO_ANNUAL_GUIDELINE: f64 = 5.0;

/// EPA annual PM2.5 standard, µg/m³.
pub const EPA_ANNUAL_STANDARD: f64 = 12.0;

/// Inclusive upper bounds of the first five tiers, µg/m³.
const BREAKPOINTS: [f64; 5] = [5.0, 12.0, 25.0, 35.0, 50.0];

const HEALTH_RISKS: [HealthRisk; 6] = [
    HealthRisk::Low,
    HealthRisk::Moderate,
    HealthRisk::UnhealthyForSensitiveGroups,
    HealthRisk::Unhealthy,
    HealthRisk::VeryUnhealthy,
    HealthRisk::Hazardous,
];

const DAMAGE_LEVELS: [EnvironmentalDamage; 6] = [
    EnvironmentalDamage::Minimal,
    EnvironmentalDamage::LowToModerate,
    EnvironmentalDamage::Moderate,
    EnvironmentalDamage::Significant,
    EnvironmentalDamage::Severe,
    EnvironmentalDamage::Critical,
];

fn tier(pm25: f64) -> usize {
    BREAKPOINTS
        .iter()
        .position(|upper| pm25 <= *upper)
        .unwrap_or(BREAKPOINTS.len())
}

/// Health-risk tier for a PM2.5 concentration.
#[must_use]
pub fn health_risk(pm25: f64) -> HealthRisk {
    HEALTH_RISKS[tier(pm25)]
}

/// Environmental-damage tier for a PM2.5 concentration.
#[must_use]
pub fn environmental_damage(pm25: f64) -> EnvironmentalDamage {
    DAMAGE_LEVELS[tier(pm25)]
}

/// One-line health impact for a tier.
#[must_use]
pub const fn health_impact(risk: HealthRisk) -> &'static str {
    match risk {
        HealthRisk::Low => "Meets WHO guidelines - minimal health risk",
        HealthRisk::Moderate => "Exceeds WHO guidelines - increased respiratory risk",
        HealthRisk::UnhealthyForSensitiveGroups => {
            "Unhealthy for children, elderly, and people with heart/lung disease"
        }
        HealthRisk::Unhealthy => "Everyone may experience health effects",
        HealthRisk::VeryUnhealthy => "Emergency conditions - everyone at risk",
        HealthRisk::Hazardous => "Health warnings - everyone should avoid outdoor activities",
    }
}

/// Advice for residents at a tier.
#[must_use]
pub const fn recommendation(risk: HealthRisk) -> &'static str {
    match risk {
        HealthRisk::Low => "Air quality is good. Continue enjoying outdoor activities.",
        HealthRisk::Moderate => {
            "Air quality is acceptable. Sensitive individuals should consider reducing prolonged \
             outdoor exertion."
        }
        HealthRisk::UnhealthyForSensitiveGroups => {
            "Sensitive groups should reduce outdoor activities. Consider wearing masks during \
             outdoor exercise."
        }
        HealthRisk::Unhealthy => {
            "Everyone should reduce outdoor activities. Avoid outdoor exercise. Consider air \
             purifiers indoors."
        }
        HealthRisk::VeryUnhealthy => {
            "Avoid outdoor activities. Stay indoors with windows closed. Use air purifiers if \
             available."
        }
        HealthRisk::Hazardous => {
            "Emergency conditions. Avoid all outdoor activities. Seek medical attention if \
             experiencing symptoms."
        }
    }
}

/// Classifies a PM2.5 concentration.
#[must_use]
pub fn classify_air_quality(pm25: f64) -> AirQualityAssessment {
    let risk = health_risk(pm25);
    AirQualityAssessment {
        pm25_ugm3: round_to(pm25, 2),
        health_risk: risk,
        environmental_damage: environmental_damage(pm25),
        who_guideline_exceedance: round_to(pm25 / WHO_ANNUAL_GUIDELINE, 2),
        epa_standard_exceedance: round_to(pm25 / EPA_ANNUAL_STANDARD, 2),
        health_impact: health_impact(risk).to_string(),
        recommendation: recommendation(risk).to_string(),
    }
}

/// Tiers of an estimated post-change PM2.5.
#[must_use]
pub fn assess_after(pm25_after: f64) -> AfterAssessment {
    AfterAssessment {
        pm25_ugm3: round_to(pm25_after, 2),
        health_risk: health_risk(pm25_after),
        environmental_damage: environmental_damage(pm25_after),
    }
}
