//! In-memory park store loaded from local files.
//!
//! Parks come from a `GeoJSON` `FeatureCollection` whose feature
//! properties use either the exported names (`Park_id`, `Park_Name`,
//! `Park_Addre`, `Park_Owner`, `Park_Zip`, `Park_Size_Acres`) or the raw
//! table columns (`park_id`, `park_name`, ...). Statistics come from an
//! optional JSON array of `parks_stats` rows keyed by `park_id`.

use std::collections::BTreeMap;
use std::path::Path;

use geojson::{Feature, FeatureCollection, JsonObject};
use parkpulse_parks_models::{ParkRecord, ParkStatistics};
use serde_json::Value;

use crate::{ParkStore, ParkStoreError, id_string, number, text};

/// Park store held entirely in memory.
#[derive(Debug, Default)]
pub struct GeoJsonStore {
    parks: BTreeMap<String, ParkRecord>,
    statistics: BTreeMap<String, ParkStatistics>,
}

impl GeoJsonStore {
    /// Loads parks from `parks_path` and, optionally, statistics from
    /// `stats_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParkStoreError`] if a file cannot be read or parsed.
    pub fn load(
        parks_path: impl AsRef<Path>,
        stats_path: Option<impl AsRef<Path>>,
    ) -> Result<Self, ParkStoreError> {
        let parks = std::fs::read_to_string(parks_path.as_ref())?;
        let stats = stats_path
            .map(|path| std::fs::read_to_string(path.as_ref()))
            .transpose()?;

        let store = Self::from_json(&parks, stats.as_deref())?;
        log::info!(
            "Loaded {} parks and {} statistics rows from {}",
            store.parks.len(),
            store.statistics.len(),
            parks_path.as_ref().display()
        );
        Ok(store)
    }

    /// Builds a store from already-read file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ParkStoreError::Json`] if either document is malformed.
    pub fn from_json(parks: &str, statistics: Option<&str>) -> Result<Self, ParkStoreError> {
        let collection: FeatureCollection = serde_json::from_str(parks)?;

        let mut store = Self::default();
        for feature in &collection.features {
            match park_from_feature(feature) {
                Some(park) => {
                    store.parks.insert(park.park_id.clone(), park);
                }
                None => log::warn!("Skipping park feature without an id"),
            }
        }

        if let Some(statistics) = statistics {
            let rows: Vec<JsonObject> = serde_json::from_str(statistics)?;
            for row in rows {
                let Some(park_id) = row.get("park_id").and_then(id_string) else {
                    log::warn!("Skipping statistics row without park_id");
                    continue;
                };
                let stats: ParkStatistics = serde_json::from_value(Value::Object(row))?;
                store.statistics.insert(park_id, stats);
            }
        }

        Ok(store)
    }
}

#[async_trait::async_trait]
impl ParkStore for GeoJsonStore {
    async fn park(&self, park_id: &str) -> Result<Option<ParkRecord>, ParkStoreError> {
        Ok(self.parks.get(park_id).cloned())
    }

    async fn statistics(&self, park_id: &str) -> Result<Option<ParkStatistics>, ParkStoreError> {
        Ok(self.statistics.get(park_id).cloned())
    }
}

fn park_from_feature(feature: &Feature) -> Option<ParkRecord> {
    let empty = JsonObject::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);

    let park_id = property(props, &["Park_id", "park_id", "id"])
        .and_then(id_string)
        .or_else(|| {
            feature.id.as_ref().map(|id| match id {
                geojson::feature::Id::String(s) => s.clone(),
                geojson::feature::Id::Number(n) => n.to_string(),
            })
        })?;

    let geometry = feature
        .geometry
        .as_ref()
        .and_then(|g| serde_json::to_value(g).ok());

    Some(ParkRecord {
        park_id,
        name: text(property(props, &["Park_Name", "park_name"])),
        address: text(property(props, &["Park_Addre", "park_addre"])),
        owner: text(property(props, &["Park_Owner", "park_owner"])),
        zip: text(property(props, &["Park_Zip", "park_zip"])),
        size_acres: number(property(props, &["Park_Size_Acres", "park_size_"])),
        shape_area: number(property(props, &["shape_area", "Shape_Area"])),
        geometry,
    })
}

fn property<'a>(props: &'a JsonObject, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| props.get(*key))
        .filter(|v| !v.is_null())
}
