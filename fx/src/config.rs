//! Rate subsystem configuration.

use std::sync::Arc;
use std::time::Duration;

use fleetrate_common::{constants, DurationExt};

use crate::cache::RateCacheConfig;
use crate::error::FxResult;
use crate::provider::{FallbackRateSource, RateProvider};
use crate::sources::{awesome_api, frankfurter, AwesomeApiProvider, FrankfurterProvider};
use crate::store::DEFAULT_RATE_KEY;

/// Configuration for providers and the rate cache.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Base URL of the primary provider.
    pub primary_url: String,
    /// Base URL of the secondary provider.
    pub secondary_url: String,
    /// Time budget for each provider call.
    pub provider_timeout: Duration,
    /// How long a fetched rate is served without refreshing.
    pub cache_ttl: chrono::Duration,
    /// Key for the shared rate store.
    pub store_key: String,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            primary_url: awesome_api::DEFAULT_BASE_URL.to_string(),
            secondary_url: frankfurter::DEFAULT_BASE_URL.to_string(),
            provider_timeout: constants::provider_timeout().as_std(),
            cache_ttl: constants::rate_ttl(),
            store_key: DEFAULT_RATE_KEY.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults.
    ///
    /// Unparseable or out-of-range numbers are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("FX_PRIMARY_URL") {
            config.primary_url = url;
        }

        if let Some(url) = lookup("FX_SECONDARY_URL") {
            config.secondary_url = url;
        }

        if let Some(ms) = lookup("FX_PROVIDER_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.provider_timeout = Duration::from_millis(ms);
            }
        }

        if let Some(secs) = lookup("FX_CACHE_TTL_SECS") {
            if let Some(ttl) = secs.parse().ok().and_then(chrono::Duration::try_seconds) {
                config.cache_ttl = ttl;
            }
        }

        if let Some(key) = lookup("FX_STORE_KEY") {
            config.store_key = key;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.primary_url.is_empty() || self.secondary_url.is_empty() {
            return Err("Provider URLs cannot be empty".to_string());
        }

        if self.provider_timeout.is_zero() {
            return Err("Provider timeout cannot be 0".to_string());
        }

        if self.cache_ttl <= chrono::Duration::zero() {
            return Err("Cache TTL must be positive".to_string());
        }

        if self.store_key.is_empty() {
            return Err("Store key cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn cache_config(&self) -> RateCacheConfig {
        RateCacheConfig {
            ttl: self.cache_ttl,
            store_key: self.store_key.clone(),
        }
    }

    /// Build the primary-then-secondary provider chain.
    pub fn build_source(&self) -> FxResult<FallbackRateSource> {
        let primary: Arc<dyn RateProvider> = Arc::new(AwesomeApiProvider::new(
            self.primary_url.clone(),
            self.provider_timeout,
        )?);
        let secondary: Arc<dyn RateProvider> = Arc::new(FrankfurterProvider::new(
            self.secondary_url.clone(),
            self.provider_timeout,
        )?);

        Ok(FallbackRateSource::new(
            vec![primary, secondary],
            self.provider_timeout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = FxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl, chrono::Duration::minutes(10));
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
        assert_eq!(config.store_key, "USD_BRL_RATE");
    }

    #[test]
    fn test_overrides() {
        let config = FxConfig::from_lookup(lookup(&[
            ("FX_PRIMARY_URL", "http://localhost:9001"),
            ("FX_PROVIDER_TIMEOUT_MS", "750"),
            ("FX_CACHE_TTL_SECS", "30"),
            ("LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.primary_url, "http://localhost:9001");
        assert_eq!(config.secondary_url, frankfurter::DEFAULT_BASE_URL);
        assert_eq!(config.provider_timeout, Duration::from_millis(750));
        assert_eq!(config.cache_config().ttl, chrono::Duration::seconds(30));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unparseable_numbers_keep_defaults() {
        let config = FxConfig::from_lookup(lookup(&[("FX_PROVIDER_TIMEOUT_MS", "soon")]));
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_out_of_range_ttl_keeps_default() {
        let config = FxConfig::from_lookup(lookup(&[("FX_CACHE_TTL_SECS", "9223372036854775807")]));
        assert_eq!(config.cache_ttl, chrono::Duration::minutes(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = FxConfig::default();
        config.provider_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let config = FxConfig::from_lookup(lookup(&[("FX_CACHE_TTL_SECS", "0")]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_source_orders_primary_first() {
        let source = FxConfig::default().build_source().unwrap();
        assert_eq!(source.provider_names(), vec!["awesomeapi", "frankfurter"]);
    }
}
