#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Park geometry and statistics lookup.
//!
//! The impact engine reaches park data only through the [`ParkStore`]
//! trait. Two backends are provided:
//!
//! - [`postgrest::PostgrestStore`]: the hosted `parks` / `parks_stats`
//!   tables behind a `PostgREST` endpoint (e.g. Supabase).
//! - [`geojson_file::GeoJsonStore`]: a local `GeoJSON` feature collection
//!   plus an optional statistics JSON file, held in memory.
//!
//! [`create_store_from_env`] picks one from environment variables.

pub mod geojson_file;
pub mod postgrest;

use parkpulse_parks_models::{ParkRecord, ParkStatistics};
use thiserror::Error;

/// Errors from park store backends.
#[derive(Debug, Error)]
pub enum ParkStoreError {
    /// HTTP request to the store failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// The backend rejected the request.
    #[error("Store error ({status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Error message returned by the backend.
        message: String,
    },
}

/// Read-only park lookup keyed by park identifier.
#[async_trait::async_trait]
pub trait ParkStore: Send + Sync {
    /// Looks up a park. `Ok(None)` means the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ParkStoreError`] if the backend cannot be queried.
    async fn park(&self, park_id: &str) -> Result<Option<ParkRecord>, ParkStoreError>;

    /// Looks up the walkshed statistics for a park.
    ///
    /// # Errors
    ///
    /// Returns [`ParkStoreError`] if the backend cannot be queried.
    async fn statistics(&self, park_id: &str) -> Result<Option<ParkStatistics>, ParkStoreError>;
}

/// Creates a park store based on environment variables.
///
/// If `PARK_STORE` is set, uses that backend. Otherwise auto-detects:
///
/// 1. `POSTGREST_URL` or `SUPABASE_URL` set -> `PostgREST`
/// 2. `PARKS_GEOJSON_PATH` set -> local `GeoJSON`
///
/// # Errors
///
/// Returns [`ParkStoreError::Config`] if no backend is configured, or
/// an I/O / JSON error if the local files cannot be loaded.
pub fn create_store_from_env() -> Result<Box<dyn ParkStore>, ParkStoreError> {
    let backend = std::env::var("PARK_STORE").unwrap_or_else(|_| detect_backend());

    match backend.to_lowercase().as_str() {
        "postgrest" | "supabase" => Ok(Box::new(postgrest::PostgrestStore::from_env()?)),
        "geojson" | "file" => {
            let parks_path = std::env::var("PARKS_GEOJSON_PATH").map_err(|_| {
                ParkStoreError::Config {
                    message: "PARKS_GEOJSON_PATH environment variable not set".to_string(),
                }
            })?;
            let stats_path = std::env::var("PARK_STATS_PATH").ok();
            Ok(Box::new(geojson_file::GeoJsonStore::load(
                &parks_path,
                stats_path.as_deref(),
            )?))
        }
        other => Err(ParkStoreError::Config {
            message: format!("Unknown park store: {other}. Use 'postgrest' or 'geojson'."),
        }),
    }
}

fn detect_backend() -> String {
    if std::env::var("POSTGREST_URL").is_ok() || std::env::var("SUPABASE_URL").is_ok() {
        log::info!("Auto-detected park store: PostgREST");
        return "postgrest".to_string();
    }

    if std::env::var("PARKS_GEOJSON_PATH").is_ok() {
        log::info!("Auto-detected park store: GeoJSON file (PARKS_GEOJSON_PATH found)");
        return "geojson".to_string();
    }

    log::warn!(
        "No park store configured. Set POSTGREST_URL (or SUPABASE_URL) or \
         PARKS_GEOJSON_PATH. You can also set PARK_STORE explicitly."
    );

    "postgrest".to_string()
}

/// Renders an id-like JSON value (string or number) as a string.
pub(crate) fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a text-like JSON value, treating blank strings as absent.
pub(crate) fn text(value: Option<&serde_json::Value>) -> Option<String> {
    value.and_then(id_string).filter(|s| !s.trim().is_empty())
}

/// Reads a numeric JSON value, accepting numeric strings.
pub(crate) fn number(value: Option<&serde_json::Value>) -> Option<f64> {
    match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
