use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Coordinates, CurrentConditions};
use crate::retry::{RetryConfig, with_retry};

use super::{ForecastProvider, truncate_body};

const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo forecast client. Keyless; quota is per IP.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    http: Client,
    base_url: String,
    retry: RetryConfig,
}

impl OpenMeteoForecast {
    pub fn new(http: Client, retry: RetryConfig) -> Self {
        Self {
            http,
            base_url: OPEN_METEO_FORECAST_URL.to_string(),
            retry,
        }
    }

    /// Same as [`OpenMeteoForecast::new`], but against a custom endpoint.
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
struct OmCurrent {
    temperature_2m: Option<f64>,
    precipitation: Option<f64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    uv_index_clear_sky_max: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: Option<OmCurrent>,
    daily: Option<OmDaily>,
}

#[async_trait]
impl ForecastProvider for OpenMeteoForecast {
    async fn current_conditions(&self, coords: &Coordinates) -> Result<CurrentConditions> {
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();

        let res = with_retry(&self.retry, || {
            self.http
                .get(&self.base_url)
                .query(&[
                    ("latitude", latitude.as_str()),
                    ("longitude", longitude.as_str()),
                    ("current", "temperature_2m,precipitation,wind_speed_10m"),
                    ("daily", "uv_index_clear_sky_max"),
                    ("timezone", "auto"),
                ])
                .send()
        })
        .await
        .context("Failed to send request to Open-Meteo (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        // The daily block carries one value per forecast day; today is first.
        let uv_index = parsed
            .daily
            .and_then(|daily| daily.uv_index_clear_sky_max)
            .and_then(|values| values.into_iter().next())
            .flatten();

        let current = parsed.current.unwrap_or_default();

        Ok(CurrentConditions {
            temperature: current.temperature_2m,
            precipitation: current.precipitation,
            wind_speed: current.wind_speed_10m,
            uv_index,
        })
    }
}
