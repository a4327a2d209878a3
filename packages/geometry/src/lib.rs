#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry adapter for park boundaries.
//!
//! Converts externally supplied `GeoJSON` (either an already-parsed JSON
//! object or a serialized string) into the engine's [`Geometry`] and
//! provides the handful of operations the impact engine needs: metric
//! buffering, set difference, and planar area in square kilometres.
//!
//! Validation is structural only. A geometry must be a JSON object with
//! a `type` and non-empty `coordinates`; coordinate ranges and topology
//! are not checked.

mod projection;

use geo::{Area, BooleanOps, Buffer, MapCoords, MultiPolygon};
use serde_json::Value;
use thiserror::Error;

use crate::projection::LocalProjection;

/// Errors produced while adapting input geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The input is not a usable `GeoJSON` geometry.
    #[error("Invalid GeoJSON geometry: {message}")]
    Invalid {
        /// Description of what was wrong with the input.
        message: String,
    },
}

impl GeometryError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// A validated geometry in geographic coordinates (EPSG:4326, lon/lat).
///
/// Owned per request and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    inner: geo::Geometry<f64>,
}

impl Geometry {
    /// Wraps an existing [`geo::Geometry`].
    #[must_use]
    pub const fn from_geo(inner: geo::Geometry<f64>) -> Self {
        Self { inner }
    }

    /// Returns the underlying [`geo::Geometry`].
    #[must_use]
    pub const fn as_geo(&self) -> &geo::Geometry<f64> {
        &self.inner
    }

    /// Serializes this geometry back into a `GeoJSON` geometry object.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.inner))
    }

    /// Expands the geometry outward by `distance_m` metres.
    ///
    /// The buffer is computed in a local equirectangular plane centred on
    /// the geometry, so distances are accurate at park/neighbourhood scale.
    #[must_use]
    pub fn buffer_meters(&self, distance_m: f64) -> Self {
        let Some(projection) = LocalProjection::centred_on(&self.inner) else {
            return self.clone();
        };

        let planar = self.inner.map_coords(|c| projection.forward(c));
        let buffered = planar.buffer(distance_m);
        let geographic = buffered.map_coords(|c| projection.inverse(c));

        Self::from_geo(geo::Geometry::MultiPolygon(geographic))
    }

    /// Returns `self` with the areal part of `other` removed.
    ///
    /// Non-areal parts (points, lines) of either side are ignored, so
    /// subtracting a point leaves the areal part of `self` unchanged.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let lhs = areal_part(&self.inner);
        let rhs = areal_part(&other.inner);
        Self::from_geo(geo::Geometry::MultiPolygon(lhs.difference(&rhs)))
    }

    /// Planar area of the areal part in square kilometres.
    ///
    /// Returns `0.0` for points, lines and empty geometries.
    #[must_use]
    pub fn area_km2(&self) -> f64 {
        let Some(projection) = LocalProjection::centred_on(&self.inner) else {
            return 0.0;
        };
        let planar = areal_part(&self.inner).map_coords(|c| projection.forward(c));
        planar.unsigned_area() / 1e6
    }

    /// Whether this geometry has any polygonal area.
    #[must_use]
    pub fn is_areal(&self) -> bool {
        !areal_part(&self.inner).0.is_empty()
    }
}

/// Parses raw input into a [`Geometry`].
///
/// `raw` may be a `GeoJSON` geometry object or a JSON string containing
/// one (as some stores return the column serialized). Strings are
/// deserialized first.
///
/// # Errors
///
/// Returns [`GeometryError::Invalid`] if the input is null or empty, is
/// not an object, lacks `type` or `coordinates`, or does not describe a
/// `GeoJSON` geometry.
pub fn parse(raw: &Value) -> Result<Geometry, GeometryError> {
    match raw {
        Value::Null => Err(GeometryError::invalid("GeoJSON is None or empty")),
        Value::String(text) => parse_str(text),
        Value::Object(object) => {
            if object.is_empty() {
                return Err(GeometryError::invalid("GeoJSON is None or empty"));
            }
            parse_object(raw)
        }
        _ => Err(GeometryError::invalid("GeoJSON must be a dictionary")),
    }
}

/// Parses a serialized `GeoJSON` geometry.
///
/// # Errors
///
/// Returns [`GeometryError::Invalid`] if the text is empty, is not JSON,
/// or fails any of the checks in [`parse`].
pub fn parse_str(text: &str) -> Result<Geometry, GeometryError> {
    if text.trim().is_empty() {
        return Err(GeometryError::invalid("GeoJSON is None or empty"));
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| GeometryError::invalid(format!("GeoJSON is not valid JSON: {e}")))?;
    if value.is_string() {
        return Err(GeometryError::invalid("GeoJSON must be a dictionary"));
    }
    parse(&value)
}

fn parse_object(raw: &Value) -> Result<Geometry, GeometryError> {
    if raw.get("type").is_none() {
        return Err(GeometryError::invalid("GeoJSON missing 'type' property"));
    }
    match raw.get("coordinates") {
        None => {
            return Err(GeometryError::invalid(
                "GeoJSON missing 'coordinates' property",
            ));
        }
        Some(Value::Array(coords)) if coords.is_empty() => {
            return Err(GeometryError::invalid("GeoJSON has empty 'coordinates'"));
        }
        Some(Value::Null) => {
            return Err(GeometryError::invalid("GeoJSON has null 'coordinates'"));
        }
        Some(_) => {}
    }

    let geometry: geojson::Geometry =
        serde_json::from_value(raw.clone()).map_err(|e| GeometryError::invalid(e.to_string()))?;

    if !positions_have_xy(&geometry.value) {
        return Err(GeometryError::invalid(
            "every position needs at least a longitude and a latitude",
        ));
    }

    let inner: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|e: geojson::Error| GeometryError::invalid(e.to_string()))?;

    log::debug!("Parsed GeoJSON geometry");

    Ok(Geometry::from_geo(inner))
}

/// Checks that every position carries an x and a y.
///
/// Conversion into `geo` types indexes the first two ordinates, so
/// shorter positions must be rejected here rather than panic later.
fn positions_have_xy(value: &geojson::Value) -> bool {
    use geojson::Value as V;

    let ok = |p: &Vec<f64>| p.len() >= 2;

    match value {
        V::Point(p) => ok(p),
        V::MultiPoint(ps) | V::LineString(ps) => ps.iter().all(ok),
        V::MultiLineString(lines) | V::Polygon(lines) => lines.iter().flatten().all(ok),
        V::MultiPolygon(polys) => polys.iter().flatten().flatten().all(ok),
        V::GeometryCollection(geoms) => geoms.iter().all(|g| positions_have_xy(&g.value)),
    }
}

/// Collects the polygonal components of a geometry.
fn areal_part(geometry: &geo::Geometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p.clone()]),
        geo::Geometry::MultiPolygon(mp) => mp.clone(),
        geo::Geometry::Rect(r) => MultiPolygon(vec![r.to_polygon()]),
        geo::Geometry::Triangle(t) => MultiPolygon(vec![t.to_polygon()]),
        geo::Geometry::GeometryCollection(gc) => {
            MultiPolygon(gc.iter().flat_map(|g| areal_part(g).0).collect())
        }
        geo::Geometry::Point(_)
        | geo::Geometry::Line(_)
        | geo::Geometry::LineString(_)
        | geo::Geometry::MultiPoint(_)
        | geo::Geometry::MultiLineString(_) => MultiPolygon(vec![]),
    }
}
