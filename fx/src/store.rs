//! Key/value store boundary for sharing rate snapshots.
//!
//! The store is a dumb backend. Its TTL only bounds how long a value lingers;
//! freshness is always decided by the cache from the snapshot's own
//! `fetched_at`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::FxResult;

/// Key the USD/BRL snapshot is stored under by default.
pub const DEFAULT_RATE_KEY: &str = "USD_BRL_RATE";

/// External key/value store with per-key TTL.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get(&self, key: &str) -> FxResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> FxResult<()>;

    async fn delete(&self, key: &str) -> FxResult<()>;
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Instant,
}

/// In-process store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRateStore {
    entries: DashMap<String, StoredValue>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `key` only if it had already expired at `now`, so a value
    /// written after the expiry check survives.
    fn evict_expired(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, stored| stored.expires_at <= now);
    }
}

#[async_trait]
impl RateStore for InMemoryRateStore {
    async fn get(&self, key: &str) -> FxResult<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.evict_expired(key, now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> FxResult<()> {
        self.entries.insert(
            key.to_string(),
            StoredValue {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> FxResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
