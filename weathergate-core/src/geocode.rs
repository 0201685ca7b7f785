//! Forward geocoding: resolving a city name to coordinates.
//!
//! Backed by the OpenCage geocoding API. The API key comes from
//! configuration; see [`crate::config::Config`].

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinates;
use crate::provider::truncate_body;
use crate::retry::{RetryConfig, with_retry};

const OPENCAGE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

/// Resolves a place name to latitude/longitude.
///
/// `Ok(None)` means the provider answered and found no match; `Err` means
/// the call itself failed. Callers treat the two very differently.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, city: &str) -> Result<Option<Coordinates>>;
}

/// OpenCage forward-geocoding client.
#[derive(Debug, Clone)]
pub struct OpenCageGeocoder {
    http: Client,
    api_key: String,
    base_url: String,
    retry: RetryConfig,
}

impl OpenCageGeocoder {
    pub fn new(http: Client, api_key: String, retry: RetryConfig) -> Self {
        Self {
            http,
            api_key,
            base_url: OPENCAGE_URL.to_string(),
            retry,
        }
    }

    /// Same as [`OpenCageGeocoder::new`], but against a custom endpoint.
    /// Used by tests to point at a local mock server.
    pub fn with_base_url(http: Client, api_key: String, retry: RetryConfig, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.to_string(),
            retry,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OcGeometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OcResult {
    geometry: OcGeometry,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    results: Vec<OcResult>,
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    async fn lookup(&self, city: &str) -> Result<Option<Coordinates>> {
        let res = with_retry(&self.retry, || {
            self.http
                .get(&self.base_url)
                .query(&[
                    ("q", city),
                    ("key", self.api_key.as_str()),
                    ("limit", "1"),
                    ("no_annotations", "1"),
                ])
                .send()
        })
        .await
        .context("Failed to send request to OpenCage")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenCage response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenCage request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OcResponse =
            serde_json::from_str(&body).context("Failed to parse OpenCage JSON")?;

        Ok(parsed.results.into_iter().next().map(|result| Coordinates {
            latitude: result.geometry.lat,
            longitude: result.geometry.lng,
        }))
    }
}
