//! Local equirectangular projection between lon/lat degrees and metres.

use geo::{BoundingRect, Coord};

/// Metres per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Smallest cosine used for longitude scaling, keeps polar inputs finite.
const MIN_COS_LAT: f64 = 1e-6;

/// A projection centred on one geometry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalProjection {
    origin_lon: f64,
    origin_lat: f64,
    cos_lat: f64,
}

impl LocalProjection {
    /// Centres the projection on the bounding-box centre of `geometry`.
    ///
    /// Returns `None` for empty geometries.
    pub(crate) fn centred_on(geometry: &geo::Geometry<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        let centre = rect.center();
        Some(Self {
            origin_lon: centre.x,
            origin_lat: centre.y,
            cos_lat: centre.y.to_radians().cos().abs().max(MIN_COS_LAT),
        })
    }

    pub(crate) fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin_lon) * self.cos_lat * METERS_PER_DEGREE,
            y: (c.y - self.origin_lat) * METERS_PER_DEGREE,
        }
    }

    pub(crate) fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: c.x / (self.cos_lat * METERS_PER_DEGREE) + self.origin_lon,
            y: c.y / METERS_PER_DEGREE + self.origin_lat,
        }
    }
}
