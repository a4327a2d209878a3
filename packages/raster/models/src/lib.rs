#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raster product and query types.
//!
//! A [`RasterProduct`] describes one time-windowed composite of an
//! earth-observation collection and how to reduce it over a geometry.
//! A [`RasterQuery`] is what actually goes over the wire to the raster
//! service: a product plus an optional constant overlay used to
//! synthesize hypothetical land cover.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Spatial reducer applied over the query geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Reducer {
    /// Pixel mean over the geometry.
    Mean,
    /// Pixel sum over the geometry.
    Sum,
}

/// How the images of a collection are combined into one raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Composite {
    /// Pixel-wise median across the window.
    Median,
    /// Pixel-wise mean across the window.
    Mean,
    /// First image of the collection (static datasets).
    First,
}

/// Inclusive-start, exclusive-end calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day of the window.
    pub start: NaiveDate,
    /// Day after the last day of the window.
    pub end: NaiveDate,
}

/// Band math evaluated per pixel before compositing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandExpression {
    /// A single band, used as-is.
    Band {
        /// Band name in the source collection.
        name: String,
    },
    /// `(a - b) / (a + b)`.
    NormalizedDifference {
        /// Minuend band (near infrared for NDVI).
        a: String,
        /// Subtrahend band (red for NDVI).
        b: String,
    },
}

/// Linear scaling from stored digital numbers to reflectance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReflectanceScale {
    /// Multiplicative factor.
    pub multiply: f64,
    /// Additive offset applied after multiplication.
    pub add: f64,
}

/// One raster product and its reduction recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterProduct {
    /// Catalog identifier (e.g. `"ndvi"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Source collection identifier on the raster platform.
    pub collection: String,
    /// Calendar window filtered before compositing, if any.
    #[serde(default)]
    pub window: Option<DateWindow>,
    /// Per-pixel band math.
    pub expression: BandExpression,
    /// Reflectance scaling applied before band math, if any.
    #[serde(default)]
    pub reflectance: Option<ReflectanceScale>,
    /// Compositing strategy.
    pub composite: Composite,
    /// Sort images by cloud cover before compositing.
    #[serde(default)]
    pub sort_by_cloud_cover: bool,
    /// Name of the band holding the reduced value in the response.
    pub output_band: String,
    /// Sampling resolution in metres.
    pub scale_m: f64,
    /// Upper bound on pixels the service may touch.
    #[serde(default = "default_max_pixels")]
    pub max_pixels: f64,
    /// Spatial reducer.
    pub reducer: Reducer,
    /// Factor applied client-side to the reduced value.
    #[serde(default = "default_value_scale", skip_serializing)]
    pub value_scale: f64,
}

const fn default_max_pixels() -> f64 {
    1e9
}

const fn default_value_scale() -> f64 {
    1.0
}

/// A constant value blended over the composite inside a footprint.
///
/// Models hypothetical land cover, e.g. a park footprint turned into
/// built-up area with a low vegetation signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantOverlay {
    /// Value written into every pixel of the footprint.
    pub value: f64,
    /// Area the constant is clipped to.
    pub footprint: geojson::Geometry,
}

/// A reduction request sent to the raster service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterQuery {
    /// Product to composite and reduce.
    pub product: RasterProduct,
    /// Optional synthetic overlay blended before reduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<ConstantOverlay>,
}

impl RasterQuery {
    /// Queries the product as observed.
    #[must_use]
    pub const fn observed(product: RasterProduct) -> Self {
        Self {
            product,
            overlay: None,
        }
    }

    /// Queries the product with `value` blended into `footprint`.
    #[must_use]
    pub const fn with_overlay(
        product: RasterProduct,
        value: f64,
        footprint: geojson::Geometry,
    ) -> Self {
        Self {
            product,
            overlay: Some(ConstantOverlay { value, footprint }),
        }
    }
}

/// The scalar metrics the providers can compute for a geometry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MetricKind {
    /// Mean summer NDVI, in `[-1, 1]`.
    Ndvi,
    /// Total residents, from a gridded population raster.
    Population,
    /// Annual mean PM2.5 in micrograms per cubic metre.
    Pm25,
    /// Density-derived walkability score in `[0, 100]`.
    Walkability,
}
