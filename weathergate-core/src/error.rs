use thiserror::Error;

/// Failure modes of a weather aggregation request.
///
/// Geocoding failures abort the request. Upstream data failures do not;
/// they degrade the payload instead and only surface here when neither
/// source produced anything.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The city was missing, or blank after trimming.
    #[error("city must be a non-empty string")]
    EmptyCity,

    /// The geocoder answered but found no match for the city.
    #[error("could not geocode city '{0}'")]
    LocationNotFound(String),

    /// The geocoding call itself failed.
    #[error("geocoding error: {0}")]
    LocationService(#[source] anyhow::Error),

    /// Both the forecast and the air-quality calls failed.
    #[error("failed to retrieve any weather data")]
    Unavailable,

    /// Anything not covered by the variants above. The aggregator itself
    /// classifies every failure into the specific variants; this is the
    /// catch-all that keeps the 500 mapping total for callers that wrap
    /// other fallible work around [`assemble`](crate::WeatherAggregator::assemble).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
