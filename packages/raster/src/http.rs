//! HTTP implementation of [`RasterService`].
//!
//! Posts `{ geometry, query }` to `{base_url}/reduce` and expects
//! `{ "value": number | null }` back. The endpoint is typically a thin
//! proxy in front of the earth-observation platform that owns the
//! imagery.

use parkpulse_raster_models::RasterQuery;
use serde::{Deserialize, Serialize};

use crate::{RasterError, RasterService};

/// Raster service reached over HTTP.
pub struct HttpRasterService {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpRasterService {
    /// Creates a client for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a client from `RASTER_SERVICE_URL` and the optional
    /// `RASTER_SERVICE_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Config`] if `RASTER_SERVICE_URL` is not set.
    pub fn from_env() -> Result<Self, RasterError> {
        let base_url = std::env::var("RASTER_SERVICE_URL").map_err(|_| RasterError::Config {
            message: "RASTER_SERVICE_URL environment variable not set".to_string(),
        })?;
        let token = std::env::var("RASTER_SERVICE_TOKEN").ok();
        Ok(Self::new(base_url, token))
    }
}

#[derive(Serialize)]
struct ReduceRequest<'a> {
    geometry: &'a geojson::Geometry,
    query: &'a RasterQuery,
}

#[derive(Deserialize)]
struct ReduceResponse {
    value: Option<f64>,
}

#[derive(Deserialize)]
struct ReduceError {
    error: String,
}

#[async_trait::async_trait]
impl RasterService for HttpRasterService {
    async fn reduce(
        &self,
        geometry: &geojson::Geometry,
        query: &RasterQuery,
    ) -> Result<Option<f64>, RasterError> {
        let url = format!("{}/reduce", self.base_url);
        log::debug!(
            "Reducing '{}' ({}) over geometry via {url}",
            query.product.id,
            query.product.reducer
        );

        let mut request = self
            .client
            .post(&url)
            .json(&ReduceRequest { geometry, query });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_reduce_body(status.as_u16(), status.is_success(), &body)
    }
}

/// Decodes a `/reduce` response body.
fn parse_reduce_body(status: u16, success: bool, body: &str) -> Result<Option<f64>, RasterError> {
    if !success {
        let message = serde_json::from_str::<ReduceError>(body)
            .map_or_else(|_| body.to_string(), |e| e.error);
        return Err(RasterError::Service { status, message });
    }

    let parsed: ReduceResponse = serde_json::from_str(body)?;
    Ok(parsed.value.filter(|v| v.is_finite()))
}
