#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Park record and statistics types.
//!
//! These are the typed shapes of what a park store returns. Every field
//! the upstream tables may leave empty is an `Option`.

use serde::{Deserialize, Serialize};

/// Square metres to acres.
pub const ACRES_PER_SQUARE_METER: f64 = 0.000_247_105;

/// A park as stored upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkRecord {
    /// Stable park identifier.
    pub park_id: String,
    /// Display name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Owning or managing agency.
    pub owner: Option<String>,
    /// ZIP code.
    pub zip: Option<String>,
    /// Surveyed size in acres.
    pub size_acres: Option<f64>,
    /// Footprint area in square metres.
    pub shape_area: Option<f64>,
    /// Raw GeoJSON geometry (object or serialized string).
    pub geometry: Option<serde_json::Value>,
}

impl ParkRecord {
    /// Display name, or `"Unnamed Park"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unnamed Park")
    }

    /// Park area in acres.
    ///
    /// Prefers the surveyed size and falls back to the footprint area.
    /// `None` when neither is recorded.
    #[must_use]
    pub fn area_acres(&self) -> Option<f64> {
        self.size_acres.filter(|acres| *acres > 0.0).or_else(|| {
            self.shape_area
                .filter(|area| *area > 0.0)
                .map(|area| area * ACRES_PER_SQUARE_METER)
        })
    }

    /// Whether a geometry value is present and non-null.
    #[must_use]
    pub fn has_geometry(&self) -> bool {
        match &self.geometry {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }
}

/// Demographic statistics for a park's walkshed.
///
/// Column aliases match the upstream `parks_stats` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkStatistics {
    /// Total residents within a 10-minute walk.
    #[serde(default, alias = "sum_totpop")]
    pub total_population: Option<f64>,
    /// Children served.
    #[serde(default, alias = "sum_kidsvc")]
    pub kids: Option<f64>,
    /// Young adults served.
    #[serde(default, alias = "sum_youngp")]
    pub young_adults: Option<f64>,
    /// Seniors served.
    #[serde(default, alias = "sum_senior")]
    pub seniors: Option<f64>,
    /// Low-income households.
    #[serde(default, alias = "sum_hhilow")]
    pub low_income_households: Option<f64>,
    /// Middle-income households.
    #[serde(default, alias = "sum_hhimed")]
    pub middle_income_households: Option<f64>,
    /// High-income households.
    #[serde(default, alias = "sum_hhihig")]
    pub high_income_households: Option<f64>,
    /// Total households.
    #[serde(default, alias = "sum_tothhs")]
    pub total_households: Option<f64>,
    /// White residents.
    #[serde(default, alias = "sum_white_")]
    pub white: Option<f64>,
    /// Black residents.
    #[serde(default, alias = "sum_black_")]
    pub black: Option<f64>,
    /// Asian residents.
    #[serde(default, alias = "sum_asian_")]
    pub asian: Option<f64>,
    /// Hispanic residents.
    #[serde(default, alias = "sum_hisp_s")]
    pub hispanic: Option<f64>,
    /// Residents per acre of park.
    #[serde(default, alias = "peracre")]
    pub per_acre_demand: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ParkRecord {
        ParkRecord {
            park_id: "42".to_string(),
            name: None,
            address: None,
            owner: None,
            zip: None,
            size_acres: None,
            shape_area: None,
            geometry: None,
        }
    }

    #[test]
    fn area_prefers_surveyed_size() {
        let park = ParkRecord {
            size_acres: Some(12.5),
            shape_area: Some(10_000.0),
            ..record()
        };
        assert_eq!(park.area_acres(), Some(12.5));
    }

    #[test]
    fn area_falls_back_to_shape_area() {
        let park = ParkRecord {
            size_acres: Some(0.0),
            shape_area: Some(10_000.0),
            ..record()
        };
        let acres = park.area_acres().unwrap();
        assert!((acres - 2.471_05).abs() < 1e-9);
    }

    #[test]
    fn area_is_unknown_without_measurements() {
        assert_eq!(record().area_acres(), None);
    }

    #[test]
    fn unnamed_parks_get_placeholder_name() {
        assert_eq!(record().display_name(), "Unnamed Park");
        let named = ParkRecord {
            name: Some("Dolores Park".to_string()),
            ..record()
        };
        assert_eq!(named.display_name(), "Dolores Park");
    }

    #[test]
    fn null_geometry_is_absent() {
        let park = ParkRecord {
            geometry: Some(serde_json::Value::Null),
            ..record()
        };
        assert!(!park.has_geometry());
    }

    #[test]
    fn statistics_deserialize_from_table_columns() {
        let stats: ParkStatistics = serde_json::from_value(serde_json::json!({
            "sum_totpop": 12_000.0,
            "sum_kidsvc": 2_100.0,
            "sum_hisp_s": 3_400.0,
            "peracre": 80.5
        }))
        .unwrap();
        assert_eq!(stats.total_population, Some(12_000.0));
        assert_eq!(stats.kids, Some(2_100.0));
        assert_eq!(stats.hispanic, Some(3_400.0));
        assert_eq!(stats.per_acre_demand, Some(80.5));
        assert_eq!(stats.seniors, None);
    }
}
