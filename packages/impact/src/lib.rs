#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Environmental impact engine for park land-use changes.
//!
//! Given a park, the engine buffers its boundary into a service area,
//! measures NDVI, walkability, PM2.5 and population there, simulates the
//! "after" state for a [`LandUseScenario`], re-measures, and composes a
//! report with deltas, air-quality tiers and narrative text.
//!
//! All collaborators (park store, raster service, narrative provider)
//! are injected into [`engine::ImpactEngine`] at construction time.
//! Metric failures degrade to `None`; only geometry validation and park
//! lookup failures abort a request.
//!
//! [`LandUseScenario`]: parkpulse_impact_models::LandUseScenario

pub mod air_quality;
pub mod config;
pub mod engine;
pub mod narrative;
pub mod proposal;
pub mod scenario;

use parkpulse_geometry::GeometryError;
use parkpulse_parks::ParkStoreError;
use thiserror::Error;

/// Errors that abort an impact request.
#[derive(Debug, Error)]
pub enum ImpactError {
    /// Input or stored geometry is malformed.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// No park with this id exists.
    #[error("Park not found: {park_id}")]
    NotFound {
        /// The requested park id.
        park_id: String,
    },

    /// The park exists but has no stored geometry.
    #[error("Park {park_id} has no geometry")]
    NoGeometry {
        /// The requested park id.
        park_id: String,
    },

    /// The park store could not be queried.
    #[error("Park store error: {0}")]
    ParkStore(#[from] ParkStoreError),

    /// Policy configuration is missing or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

impl ImpactError {
    /// Whether the caller supplied unusable input (vs. a missing park or
    /// an upstream failure).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidGeometry(_) | Self::NoGeometry { .. })
    }

    /// Whether the requested park does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
