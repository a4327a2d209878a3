//! `PostgREST` park store.
//!
//! Queries the `parks` and `parks_stats` tables through a `PostgREST`
//! endpoint such as the one Supabase exposes at `<project>/rest/v1`.
//! Rows are filtered with `park_id=eq.<id>` and limited to one.

use parkpulse_parks_models::{ParkRecord, ParkStatistics};
use serde_json::{Map, Value};

use crate::{ParkStore, ParkStoreError, id_string, number, text};

const PARK_COLUMNS: &str =
    "park_id,park_name,park_addre,park_owner,park_zip,park_size_,shape_area,geom";

const STATS_COLUMNS: &str = "sum_totpop,sum_kidsvc,sum_youngp,sum_senior,sum_hhilow,sum_hhimed,\
                             sum_hhihig,sum_tothhs,sum_white_,sum_black_,sum_asian_,sum_hisp_s,\
                             peracre";

/// Park store backed by a `PostgREST` HTTP API.
pub struct PostgrestStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl PostgrestStore {
    /// Creates a store against `base_url` (the REST root, e.g.
    /// `https://<project>.supabase.co/rest/v1`).
    #[must_use]
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Reads `POSTGREST_URL` / `POSTGREST_API_KEY`, falling back to
    /// `SUPABASE_URL` (+ `/rest/v1`) / `SUPABASE_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ParkStoreError::Config`] if no endpoint is configured.
    pub fn from_env() -> Result<Self, ParkStoreError> {
        let base_url = std::env::var("POSTGREST_URL")
            .ok()
            .or_else(|| {
                std::env::var("SUPABASE_URL")
                    .ok()
                    .map(|url| format!("{}/rest/v1", url.trim_end_matches('/')))
            })
            .ok_or_else(|| ParkStoreError::Config {
                message: "POSTGREST_URL or SUPABASE_URL must be set".to_string(),
            })?;

        let api_key = std::env::var("POSTGREST_API_KEY")
            .or_else(|_| std::env::var("SUPABASE_KEY"))
            .ok();

        if api_key.is_none() {
            log::warn!("No POSTGREST_API_KEY set; querying {base_url} anonymously");
        }

        Ok(Self::new(&base_url, api_key))
    }

    async fn first_row(
        &self,
        table: &str,
        columns: &str,
        park_id: &str,
    ) -> Result<Option<Map<String, Value>>, ParkStoreError> {
        let url = format!("{}/{table}", self.base_url);
        let filter = format!("eq.{park_id}");

        let mut req = self.client.get(&url).query(&[
            ("select", columns),
            ("park_id", filter.as_str()),
            ("limit", "1"),
        ]);

        if let Some(key) = &self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ParkStoreError::Backend {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        log::debug!("{table} lookup for park {park_id} returned {} bytes", body.len());

        let rows: Vec<Map<String, Value>> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait::async_trait]
impl ParkStore for PostgrestStore {
    async fn park(&self, park_id: &str) -> Result<Option<ParkRecord>, ParkStoreError> {
        let row = self.first_row("parks", PARK_COLUMNS, park_id).await?;
        Ok(row.map(|row| park_from_row(park_id, &row)))
    }

    async fn statistics(&self, park_id: &str) -> Result<Option<ParkStatistics>, ParkStoreError> {
        let Some(row) = self.first_row("parks_stats", STATS_COLUMNS, park_id).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(Value::Object(row))?))
    }
}

/// Maps a `parks` row onto a [`ParkRecord`].
fn park_from_row(park_id: &str, row: &Map<String, Value>) -> ParkRecord {
    ParkRecord {
        park_id: row
            .get("park_id")
            .and_then(id_string)
            .unwrap_or_else(|| park_id.to_string()),
        name: text(row.get("park_name")),
        address: text(row.get("park_addre")),
        owner: text(row.get("park_owner")),
        zip: text(row.get("park_zip")),
        size_acres: number(row.get("park_size_")),
        shape_area: number(row.get("shape_area")),
        geometry: row.get("geom").filter(|g| !g.is_null()).cloned(),
    }
}

/// Extracts `message` from a `PostgREST` error body, or returns the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
