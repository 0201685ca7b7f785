//! Coordinate caching.
//!
//! Geocoding results are stable for a given city, so they are cached with a
//! long TTL (one week by default) to keep repeat queries off the geocoding
//! provider's quota.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::Coordinates;

/// Key-value store for geocoded coordinates.
///
/// Implementations must tolerate concurrent reads and writes from in-flight
/// requests. A lost update is harmless because every write for a key stores
/// the same lookup result.
#[async_trait]
pub trait CoordinateCache: Send + Sync {
    /// Returns the coordinates stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Option<Coordinates>;

    /// Stores `coords` under `key` for `ttl`.
    async fn set(&self, key: &str, coords: Coordinates, ttl: Duration);
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    coords: Coordinates,
    expires_at: Instant,
}

/// Process-local cache with per-entry expiry.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoordinateCache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Coordinates> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.coords)
    }

    async fn set(&self, key: &str, coords: Coordinates, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        // Expired entries are swept on write rather than on a timer; the key
        // space (distinct city names) stays small.
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                coords,
                expires_at: now + ttl,
            },
        );
    }
}
