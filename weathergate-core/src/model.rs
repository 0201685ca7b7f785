use serde::{Deserialize, Serialize};

/// Latitude/longitude pair produced by geocoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions as reported by the forecast provider.
///
/// Individual fields may be absent even on a successful call; the provider
/// contract only guarantees that the response parsed.
#[derive(Debug, Clone, Default)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
    pub uv_index: Option<f64>,
}

/// Current air quality as reported by the air-quality provider.
#[derive(Debug, Clone, Default)]
pub struct AirQualitySample {
    pub european_aqi: Option<f64>,
}

/// Weather section of the merged response.
///
/// Unavailable values serialize as explicit JSON nulls; the payload shape
/// never omits a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Merged response for a single city query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub weather: WeatherReport,
    pub uv_index: Option<f64>,
    pub aqi: Option<f64>,
}
