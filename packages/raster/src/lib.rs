#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raster query service client and metric providers.
//!
//! The raster platform itself is external. This crate defines the
//! [`RasterService`] seam it is reached through, an HTTP implementation
//! of that seam, the catalog of raster products (embedded TOML under
//! `products/`), and the four metric providers built on a single
//! "reduce raster over geometry" primitive: NDVI, population, PM2.5
//! (with an aerosol-index fallback) and walkability.

pub mod catalog;
pub mod http;
pub mod metrics;

use std::time::Duration;

use parkpulse_raster_models::RasterQuery;
use thiserror::Error;

/// Default per-call timeout for raster reductions.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from raster service calls.
#[derive(Debug, Error)]
pub enum RasterError {
    /// HTTP request to the raster service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with an error.
    #[error("Raster service error ({status}): {message}")]
    Service {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error message returned by the service.
        message: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("Raster query for '{product}' timed out after {after:?}")]
    Timeout {
        /// Catalog id of the queried product.
        product: String,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// Client configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// A service that reduces a raster composite over a geometry.
///
/// Returns `Ok(None)` when no pixels of the composite intersect the
/// geometry.
#[async_trait::async_trait]
pub trait RasterService: Send + Sync {
    /// Reduces `query` over `geometry` to a single scalar.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError`] if the service is unreachable or rejects
    /// the query.
    async fn reduce(
        &self,
        geometry: &geojson::Geometry,
        query: &RasterQuery,
    ) -> Result<Option<f64>, RasterError>;
}

/// Tunables for raster calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSettings {
    /// Upper bound on a single reduction call.
    pub timeout: Duration,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RasterSettings {
    /// Reads `RASTER_TIMEOUT_SECS`, falling back to [`DEFAULT_TIMEOUT_SECS`].
    #[must_use]
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("RASTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
