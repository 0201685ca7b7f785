//! Request orchestration: coordinates via cache-or-geocode, then a
//! concurrent two-source fan-out with per-source failure isolation.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CoordinateCache;
use crate::error::AggregateError;
use crate::geocode::Geocoder;
use crate::model::{
    AirQualitySample, Coordinates, CurrentConditions, ResponsePayload, WeatherReport,
};
use crate::provider::{AirQualityProvider, ForecastProvider};

/// How much of the merged payload is backed by live upstream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// Both upstream sources answered.
    Full,
    /// Exactly one upstream source answered.
    Partial,
}

/// A merged payload plus how complete it is.
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub payload: ResponsePayload,
    pub completeness: Completeness,
}

/// Turns a city name into a merged weather and air-quality payload.
///
/// Collaborators are trait objects so callers can swap real HTTP clients
/// for stubs in tests.
pub struct WeatherAggregator {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastProvider>,
    air_quality: Arc<dyn AirQualityProvider>,
    cache: Arc<dyn CoordinateCache>,
    coordinate_ttl: Duration,
}

impl WeatherAggregator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastProvider>,
        air_quality: Arc<dyn AirQualityProvider>,
        cache: Arc<dyn CoordinateCache>,
        coordinate_ttl: Duration,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            air_quality,
            cache,
            coordinate_ttl,
        }
    }

    /// Resolve `city` and merge both upstream sources into one payload.
    ///
    /// A single failing source degrades the result to [`Completeness::Partial`]
    /// with the affected fields null; only both sources failing is an error.
    pub async fn assemble(&self, city: &str) -> Result<AggregateOutcome, AggregateError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AggregateError::EmptyCity);
        }

        let coords = self.resolve_coordinates(city).await?;

        let (conditions, air_quality) = tokio::join!(
            self.forecast.current_conditions(&coords),
            self.air_quality.current_air_quality(&coords),
        );

        let conditions = match conditions {
            Ok(conditions) => Some(conditions),
            Err(error) => {
                tracing::warn!(city, error = %error, "forecast source failed");
                None
            }
        };
        let air_quality = match air_quality {
            Ok(sample) => Some(sample),
            Err(error) => {
                tracing::warn!(city, error = %error, "air-quality source failed");
                None
            }
        };

        let completeness = match (&conditions, &air_quality) {
            (Some(_), Some(_)) => Completeness::Full,
            (None, None) => return Err(AggregateError::Unavailable),
            _ => Completeness::Partial,
        };

        Ok(AggregateOutcome {
            payload: merge(city, conditions, air_quality),
            completeness,
        })
    }

    /// Coordinates from the cache when fresh, otherwise from the geocoder
    /// (and into the cache for the next request).
    async fn resolve_coordinates(&self, city: &str) -> Result<Coordinates, AggregateError> {
        let key = cache_key(city);
        if let Some(coords) = self.cache.get(&key).await {
            tracing::debug!(city, "coordinate cache hit");
            return Ok(coords);
        }

        let coords = self
            .geocoder
            .lookup(city)
            .await
            .map_err(AggregateError::LocationService)?
            .ok_or_else(|| AggregateError::LocationNotFound(city.to_string()))?;

        self.cache.set(&key, coords, self.coordinate_ttl).await;
        Ok(coords)
    }
}

/// Cache key for a trimmed city name: case differences share one entry.
fn cache_key(city: &str) -> String {
    city.to_lowercase()
}

fn merge(
    city: &str,
    conditions: Option<CurrentConditions>,
    air_quality: Option<AirQualitySample>,
) -> ResponsePayload {
    let conditions = conditions.unwrap_or_default();
    let air_quality = air_quality.unwrap_or_default();

    ResponsePayload {
        weather: WeatherReport {
            city: city.to_string(),
            temperature: conditions.temperature,
            precipitation: conditions.precipitation,
            wind_speed: conditions.wind_speed,
        },
        uv_index: conditions.uv_index,
        aqi: air_quality.european_aqi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BERLIN: Coordinates = Coordinates {
        latitude: 52.52,
        longitude: 13.405,
    };

    struct FixedGeocoder {
        coords: Option<Coordinates>,
        calls: AtomicUsize,
    }

    impl FixedGeocoder {
        fn returning(coords: Option<Coordinates>) -> Arc<Self> {
            Arc::new(Self {
                coords,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn lookup(&self, _city: &str) -> anyhow::Result<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.coords)
        }
    }

    struct BrokenGeocoder;

    #[async_trait]
    impl Geocoder for BrokenGeocoder {
        async fn lookup(&self, _city: &str) -> anyhow::Result<Option<Coordinates>> {
            Err(anyhow!("connection refused"))
        }
    }

    struct FixedForecast(CurrentConditions);

    #[async_trait]
    impl ForecastProvider for FixedForecast {
        async fn current_conditions(
            &self,
            _coords: &Coordinates,
        ) -> anyhow::Result<CurrentConditions> {
            Ok(self.0.clone())
        }
    }

    struct BrokenForecast;

    #[async_trait]
    impl ForecastProvider for BrokenForecast {
        async fn current_conditions(
            &self,
            _coords: &Coordinates,
        ) -> anyhow::Result<CurrentConditions> {
            Err(anyhow!("forecast timed out"))
        }
    }

    struct FixedAirQuality(f64);

    #[async_trait]
    impl AirQualityProvider for FixedAirQuality {
        async fn current_air_quality(
            &self,
            _coords: &Coordinates,
        ) -> anyhow::Result<AirQualitySample> {
            Ok(AirQualitySample {
                european_aqi: Some(self.0),
            })
        }
    }

    struct BrokenAirQuality;

    #[async_trait]
    impl AirQualityProvider for BrokenAirQuality {
        async fn current_air_quality(
            &self,
            _coords: &Coordinates,
        ) -> anyhow::Result<AirQualitySample> {
            Err(anyhow!("air quality timed out"))
        }
    }

    fn sample_conditions() -> CurrentConditions {
        CurrentConditions {
            temperature: Some(18.3),
            precipitation: Some(0.2),
            wind_speed: Some(11.5),
            uv_index: Some(5.8),
        }
    }

    fn aggregator(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastProvider>,
        air_quality: Arc<dyn AirQualityProvider>,
    ) -> WeatherAggregator {
        WeatherAggregator::new(
            geocoder,
            forecast,
            air_quality,
            Arc::new(InMemoryCache::new()),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn blank_city_is_rejected_before_geocoding() {
        let geocoder = FixedGeocoder::returning(Some(BERLIN));
        let agg = aggregator(
            geocoder.clone(),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
        );

        for city in ["", "   ", "\t\n"] {
            let err = agg.assemble(city).await.unwrap_err();
            assert!(matches!(err, AggregateError::EmptyCity));
        }
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn merges_both_sources_into_a_full_payload() {
        let agg = aggregator(
            FixedGeocoder::returning(Some(BERLIN)),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
        );

        let outcome = agg.assemble(" Berlin ").await.expect("must succeed");

        assert_eq!(outcome.completeness, Completeness::Full);
        assert_eq!(outcome.payload.weather.city, "Berlin");
        assert_eq!(outcome.payload.weather.temperature, Some(18.3));
        assert_eq!(outcome.payload.weather.precipitation, Some(0.2));
        assert_eq!(outcome.payload.weather.wind_speed, Some(11.5));
        assert_eq!(outcome.payload.uv_index, Some(5.8));
        assert_eq!(outcome.payload.aqi, Some(31.0));
    }

    #[tokio::test]
    async fn failing_forecast_degrades_to_partial() {
        let agg = aggregator(
            FixedGeocoder::returning(Some(BERLIN)),
            Arc::new(BrokenForecast),
            Arc::new(FixedAirQuality(31.0)),
        );

        let outcome = agg.assemble("Berlin").await.expect("must succeed");

        assert_eq!(outcome.completeness, Completeness::Partial);
        assert_eq!(outcome.payload.weather.temperature, None);
        assert_eq!(outcome.payload.uv_index, None);
        assert_eq!(outcome.payload.aqi, Some(31.0));
    }

    #[tokio::test]
    async fn failing_air_quality_degrades_to_partial() {
        let agg = aggregator(
            FixedGeocoder::returning(Some(BERLIN)),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(BrokenAirQuality),
        );

        let outcome = agg.assemble("Berlin").await.expect("must succeed");

        assert_eq!(outcome.completeness, Completeness::Partial);
        assert_eq!(outcome.payload.weather.temperature, Some(18.3));
        assert_eq!(outcome.payload.aqi, None);
    }

    #[tokio::test]
    async fn both_sources_failing_is_unavailable() {
        let agg = aggregator(
            FixedGeocoder::returning(Some(BERLIN)),
            Arc::new(BrokenForecast),
            Arc::new(BrokenAirQuality),
        );

        let err = agg.assemble("Berlin").await.unwrap_err();
        assert!(matches!(err, AggregateError::Unavailable));
    }

    #[tokio::test]
    async fn unknown_city_is_not_found() {
        let agg = aggregator(
            FixedGeocoder::returning(None),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
        );

        let err = agg.assemble("Atlantis").await.unwrap_err();
        assert!(matches!(err, AggregateError::LocationNotFound(city) if city == "Atlantis"));
    }

    #[tokio::test]
    async fn geocoder_failure_is_a_service_error() {
        let agg = aggregator(
            Arc::new(BrokenGeocoder),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
        );

        let err = agg.assemble("Berlin").await.unwrap_err();
        assert!(matches!(err, AggregateError::LocationService(_)));
    }

    #[tokio::test]
    async fn repeat_queries_hit_the_cache_not_the_geocoder() {
        let geocoder = FixedGeocoder::returning(Some(BERLIN));
        let agg = aggregator(
            geocoder.clone(),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
        );

        agg.assemble("Berlin").await.expect("first query");
        agg.assemble("  berlin ").await.expect("second query");
        agg.assemble("BERLIN").await.expect("third query");

        assert_eq!(geocoder.calls(), 1);
    }

    #[tokio::test]
    async fn expired_cache_entries_trigger_a_fresh_lookup() {
        let geocoder = FixedGeocoder::returning(Some(BERLIN));
        let agg = WeatherAggregator::new(
            geocoder.clone(),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
            Arc::new(InMemoryCache::new()),
            Duration::ZERO,
        );

        agg.assemble("Berlin").await.expect("first query");
        agg.assemble("Berlin").await.expect("second query");

        assert_eq!(geocoder.calls(), 2);
    }

    #[tokio::test]
    async fn failed_lookups_are_not_cached() {
        let geocoder = FixedGeocoder::returning(None);
        let agg = aggregator(
            geocoder.clone(),
            Arc::new(FixedForecast(sample_conditions())),
            Arc::new(FixedAirQuality(31.0)),
        );

        let _ = agg.assemble("Atlantis").await;
        let _ = agg.assemble("Atlantis").await;

        assert_eq!(geocoder.calls(), 2);
    }
}
