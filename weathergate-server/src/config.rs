//! Server process configuration.

use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Listener settings sourced from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Reads `WEATHERGATE_BIND`, falling back to `0.0.0.0:8080`.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("WEATHERGATE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind_addr = raw
            .parse()
            .with_context(|| format!("Failed to parse WEATHERGATE_BIND: {raw}"))?;

        Ok(Self { bind_addr })
    }
}
