use async_trait::async_trait;

use crate::model::{AirQualitySample, Coordinates, CurrentConditions};

pub mod air_quality;
pub mod forecast;

/// Supplies current weather conditions for a coordinate pair.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn current_conditions(&self, coords: &Coordinates) -> anyhow::Result<CurrentConditions>;
}

/// Supplies the current air-quality reading for a coordinate pair.
#[async_trait]
pub trait AirQualityProvider: Send + Sync {
    async fn current_air_quality(&self, coords: &Coordinates) -> anyhow::Result<AirQualitySample>;
}

/// Trims upstream error bodies so a failing provider can't flood the logs.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_cuts_long_bodies() {
        let long = "x".repeat(500);
        let cut = truncate_body(&long);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "ä".repeat(150);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().all(|c| c == 'ä' || c == '.'));
    }
}
