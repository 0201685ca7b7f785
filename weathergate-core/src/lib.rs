//! Core library for the `weathergate` service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding with a TTL'd coordinate cache
//! - Clients for the forecast and air-quality providers
//! - The aggregator that merges both sources into one payload
//!
//! It is used by `weathergate-server`, but can also be reused by other binaries or services.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod geocode;
pub mod model;
pub mod provider;
pub mod retry;

pub use aggregator::{AggregateOutcome, Completeness, WeatherAggregator};
pub use cache::{CoordinateCache, InMemoryCache};
pub use config::Config;
pub use error::AggregateError;
pub use geocode::{Geocoder, OpenCageGeocoder};
pub use model::{Coordinates, ResponsePayload, WeatherReport};
pub use provider::{AirQualityProvider, ForecastProvider};
pub use retry::RetryConfig;
