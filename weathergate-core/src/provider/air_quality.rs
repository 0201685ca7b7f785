use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{AirQualitySample, Coordinates};
use crate::retry::{RetryConfig, with_retry};

use super::{AirQualityProvider, truncate_body};

const OPEN_METEO_AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Open-Meteo air-quality client. Keyless; quota is per IP.
#[derive(Debug, Clone)]
pub struct OpenMeteoAirQuality {
    http: Client,
    base_url: String,
    retry: RetryConfig,
}

impl OpenMeteoAirQuality {
    pub fn new(http: Client, retry: RetryConfig) -> Self {
        Self {
            http,
            base_url: OPEN_METEO_AIR_QUALITY_URL.to_string(),
            retry,
        }
    }

    /// Same as [`OpenMeteoAirQuality::new`], but against a custom endpoint.
    /// Used by tests to point at a local mock server.
    pub fn with_base_url(http: Client, retry: RetryConfig, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            retry,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AqCurrent {
    european_aqi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AqResponse {
    current: Option<AqCurrent>,
}

#[async_trait]
impl AirQualityProvider for OpenMeteoAirQuality {
    async fn current_air_quality(&self, coords: &Coordinates) -> Result<AirQualitySample> {
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();

        let res = with_retry(&self.retry, || {
            self.http
                .get(&self.base_url)
                .query(&[
                    ("latitude", latitude.as_str()),
                    ("longitude", longitude.as_str()),
                    ("current", "european_aqi"),
                    ("timezone", "auto"),
                ])
                .send()
        })
        .await
        .context("Failed to send request to Open-Meteo (air quality)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo air-quality response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo air-quality request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: AqResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo air-quality JSON")?;

        let current = parsed.current.unwrap_or_default();

        Ok(AirQualitySample {
            european_aqi: current.european_aqi,
        })
    }
}
