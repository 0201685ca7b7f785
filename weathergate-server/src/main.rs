//! Binary crate for the `weathergate` HTTP service.
//!
//! This crate focuses on:
//! - Wiring configuration, upstream clients, and the cache
//! - Serving the HTTP API with graceful shutdown

mod api;
mod app;
mod config;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use app::{AppState, build_router};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use weathergate_core::aggregator::WeatherAggregator;
use weathergate_core::cache::InMemoryCache;
use weathergate_core::config::Config;
use weathergate_core::geocode::OpenCageGeocoder;
use weathergate_core::provider::air_quality::OpenMeteoAirQuality;
use weathergate_core::provider::forecast::OpenMeteoForecast;

#[derive(Debug, Parser)]
#[command(name = "weathergate-server", version, about = "Weather aggregation HTTP service")]
struct Cli {
    /// Address to listen on, e.g. 127.0.0.1:8080. Overrides WEATHERGATE_BIND.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Path to a TOML config file. Defaults to the platform config location.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let server_config = config::ServerConfig::from_env()?;
    let bind_addr = cli.bind.unwrap_or(server_config.bind_addr);

    let core_config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    run_with_shutdown(&core_config, bind_addr, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_with_shutdown<F>(
    config: &Config,
    addr: SocketAddr,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "weathergate listening");

    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let api_key = config.geocoder_api_key()?.to_string();

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("Failed to build the upstream HTTP client")?;
    let retry = config.retry_config();

    let aggregator = WeatherAggregator::new(
        Arc::new(OpenCageGeocoder::new(http.clone(), api_key, retry.clone())),
        Arc::new(OpenMeteoForecast::new(http.clone(), retry.clone())),
        Arc::new(OpenMeteoAirQuality::new(http, retry)),
        Arc::new(InMemoryCache::new()),
        config.coordinate_ttl(),
    );

    Ok(AppState {
        aggregator: Arc::new(aggregator),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weathergate_core::config::GeocoderConfig;

    fn config_with_key() -> Config {
        Config {
            geocoder: Some(GeocoderConfig {
                api_key: "TEST_KEY".to_string(),
            }),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn build_state_requires_a_geocoder_key() {
        let err = build_state(&Config::default()).err().expect("missing key");
        assert!(err.to_string().contains("No API key configured"));
    }

    #[tokio::test]
    async fn build_state_wires_the_aggregator() {
        let state = build_state(&config_with_key()).expect("state");
        assert_eq!(Arc::strong_count(&state.aggregator), 1);
    }

    #[tokio::test]
    async fn run_with_shutdown_stops_on_signal() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        run_with_shutdown(&config_with_key(), addr, async {})
            .await
            .expect("clean shutdown");
    }
}
