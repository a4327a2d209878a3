#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the park impact engine.
//!
//! ```text
//! parkpulse impact <park-id> [--scenario removed]
//! parkpulse pollution <park-id> [--scenario removed]
//! parkpulse analyze <geometry> [--scenario removed]
//! parkpulse metric <geometry> --kind ndvi
//! parkpulse air-quality <park-id>
//! parkpulse ndvi <park-id>
//! parkpulse info <park-id>
//! parkpulse proposal <park-id> [--scenario removed] [--deadline "March 5, 2026"]
//! ```
//!
//! `<geometry>` is inline `GeoJSON` or a path to a file containing it.
//! Collaborators are configured from the environment; see
//! [`parkpulse_parks::create_store_from_env`],
//! [`parkpulse_raster::http::HttpRasterService::from_env`] and
//! [`parkpulse_ai::providers::create_provider_from_env`].

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use parkpulse_impact::config::ImpactConfig;
use parkpulse_impact::engine::ImpactEngine;
use parkpulse_impact_models::LandUseScenario;
use parkpulse_raster::RasterSettings;
use parkpulse_raster::catalog::ProductCatalog;
use parkpulse_raster::http::HttpRasterService;
use parkpulse_raster::metrics::MetricProviders;
use parkpulse_raster_models::MetricKind;
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "parkpulse",
    about = "Estimate the environmental impact of park land-use changes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full before/after impact report for a park
    Impact {
        /// Park ID
        park_id: String,
        /// Land-use change (removed, replaced_by_building, or anything else)
        #[arg(long, default_value = "removed", value_parser = scenario)]
        scenario: LandUseScenario,
    },
    /// PM2.5-only impact assessment for a park
    Pollution {
        /// Park ID
        park_id: String,
        /// Land-use change
        #[arg(long, default_value = "removed", value_parser = scenario)]
        scenario: LandUseScenario,
    },
    /// Before/after metrics for an arbitrary geometry
    Analyze {
        /// Inline GeoJSON geometry or a path to one
        geometry: String,
        /// Land-use change
        #[arg(long, default_value = "removed", value_parser = scenario)]
        scenario: LandUseScenario,
    },
    /// A single metric over an arbitrary geometry
    Metric {
        /// Inline GeoJSON geometry or a path to one
        geometry: String,
        /// Metric to compute (ndvi, population, pm25, walkability)
        #[arg(long, value_parser = metric_kind)]
        kind: MetricKind,
    },
    /// Current air quality around a park
    AirQuality {
        /// Park ID
        park_id: String,
    },
    /// Mean NDVI over a park
    Ndvi {
        /// Park ID
        park_id: String,
    },
    /// Park facts and description
    Info {
        /// Park ID
        park_id: String,
    },
    /// Draft a community proposal from a fresh impact report
    Proposal {
        /// Park ID
        park_id: String,
        /// Land-use change
        #[arg(long, default_value = "removed", value_parser = scenario)]
        scenario: LandUseScenario,
        /// Voting deadline ("March 5, 2026", "Mar 5, 2026" or "2026-03-05")
        #[arg(long)]
        deadline: Option<String>,
    },
}

#[allow(clippy::unnecessary_wraps)]
fn scenario(label: &str) -> Result<LandUseScenario, String> {
    Ok(LandUseScenario::from_label(label))
}

fn metric_kind(label: &str) -> Result<MetricKind, String> {
    label
        .trim()
        .parse()
        .map_err(|_| {
            format!("unknown metric '{label}', expected ndvi, population, pm25 or walkability")
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let engine = build_engine()?;

    match cli.command {
        Commands::Impact { park_id, scenario } => {
            print_json(&engine.compute_impact(&park_id, scenario).await?)?;
        }
        Commands::Pollution { park_id, scenario } => {
            print_json(&engine.assess_pollution_only(&park_id, scenario).await?)?;
        }
        Commands::Analyze { geometry, scenario } => {
            let raw = read_geometry(&geometry)?;
            print_json(&engine.compute_impact_for_geometry(&raw, scenario).await?)?;
        }
        Commands::Metric { geometry, kind } => {
            let raw = read_geometry(&geometry)?;
            let value = engine.compute_single_metric(&raw, kind).await?;
            print_json(&serde_json::json!({ "metric": kind, "value": value }))?;
        }
        Commands::AirQuality { park_id } => {
            print_json(&engine.park_air_quality(&park_id).await?)?;
        }
        Commands::Ndvi { park_id } => {
            let ndvi = engine.park_ndvi(&park_id).await?;
            print_json(&serde_json::json!({ "parkId": park_id, "ndvi": ndvi }))?;
        }
        Commands::Info { park_id } => {
            print_json(&engine.park_information(&park_id).await?)?;
        }
        Commands::Proposal {
            park_id,
            scenario,
            deadline,
        } => {
            let report = engine.compute_impact(&park_id, scenario).await?;
            print_json(&engine.draft_proposal(&report, deadline.as_deref()).await)?;
        }
    }

    Ok(())
}

/// Wires the engine from environment configuration.
fn build_engine() -> Result<ImpactEngine, Box<dyn std::error::Error>> {
    let parks = parkpulse_parks::create_store_from_env()?;
    let raster = HttpRasterService::from_env()?;
    let metrics = MetricProviders::new(
        Arc::new(raster),
        ProductCatalog::embedded(),
        RasterSettings::from_env(),
    );
    let config = ImpactConfig::from_env()?;

    let engine = ImpactEngine::new(Arc::from(parks), metrics, config);

    Ok(match parkpulse_ai::providers::create_provider_from_env() {
        Ok(provider) => engine.with_narrator(Arc::from(provider)),
        Err(e) => {
            log::info!("Narrative provider not configured, using templates: {e}");
            engine
        }
    })
}

/// Accepts inline `GeoJSON` or a path to a file containing it.
fn read_geometry(arg: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let path = Path::new(arg);
    let text = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        arg.to_string()
    };
    Ok(serde_json::Value::String(text))
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
