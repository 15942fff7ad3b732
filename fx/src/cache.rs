//! Exchange-rate cache with single-flight refresh.
//!
//! The cache holds at most one [`RateSnapshot`]. A fresh snapshot is served
//! from an in-process slot without suspending. When it is missing or older
//! than the TTL, exactly one refresh runs at a time: callers that arrive while
//! it is in flight attach to the same shared future and all observe its
//! outcome.
//!
//! Refresh failure policy: if a previous snapshot exists it is served even
//! though it is past its TTL (availability over freshness). Only a cold cache
//! with failing providers yields [`FxError::RateUnavailable`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use fleetrate_common::{constants, Clock, DurationExt, SystemClock, Timestamp};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::store::{RateStore, DEFAULT_RATE_KEY};

/// An immutable BRL-per-USD rate and the time it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// BRL per 1 USD, always positive.
    pub rate: Decimal,
    /// When the rate was fetched from a provider.
    pub fetched_at: Timestamp,
}

impl RateSnapshot {
    pub fn new(rate: Decimal, fetched_at: Timestamp) -> Self {
        Self { rate, fetched_at }
    }

    /// Time elapsed since the rate was fetched.
    pub fn age(&self, now: Timestamp) -> Duration {
        now.signed_duration_since(self.fetched_at)
    }

    /// Check whether the snapshot may still be served as fresh.
    pub fn is_valid_at(&self, now: Timestamp, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Configuration for the rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a snapshot is served without refreshing.
    pub ttl: Duration,
    /// Key used in the external store, if one is attached.
    pub store_key: String,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::rate_ttl(),
            store_key: DEFAULT_RATE_KEY.to_string(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from a fresh snapshot.
    pub hits: u64,
    /// Calls that found no fresh snapshot.
    pub misses: u64,
    /// Refreshes started.
    pub refreshes: u64,
    /// Calls that attached to a refresh already in flight.
    pub joined: u64,
    /// Refreshes that ended in error.
    pub refresh_failures: u64,
    /// Calls answered with an expired snapshot after a failed refresh.
    pub stale_served: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    joined: AtomicU64,
    refresh_failures: AtomicU64,
    stale_served: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
        }
    }
}

type RefreshFuture = Shared<BoxFuture<'static, FxResult<Arc<RateSnapshot>>>>;

struct InFlight {
    generation: u64,
    future: RefreshFuture,
}

enum Lookup {
    Fresh(Arc<RateSnapshot>),
    Pending(RefreshFuture),
}

struct Inner {
    source: Arc<dyn RateProvider>,
    store: Option<Arc<dyn RateStore>>,
    clock: Arc<dyn Clock>,
    config: RateCacheConfig,
    current: RwLock<Option<Arc<RateSnapshot>>>,
    in_flight: Mutex<Option<InFlight>>,
    generation: AtomicU64,
    counters: Counters,
}

/// Clears the in-flight cell when a refresh task ends, panics included.
struct RefreshGuard {
    inner: Arc<Inner>,
    generation: u64,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        let mut in_flight = self.inner.in_flight.lock();
        if in_flight
            .as_ref()
            .is_some_and(|pending| pending.generation == self.generation)
        {
            *in_flight = None;
        }
    }
}

impl Inner {
    fn fresh_snapshot(&self) -> Option<Arc<RateSnapshot>> {
        let now = self.clock.now();
        self.current
            .read()
            .as_ref()
            .filter(|snapshot| snapshot.is_valid_at(now, self.config.ttl))
            .cloned()
    }

    fn publish(&self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(Arc::clone(&snapshot));
        snapshot
    }

    #[instrument(skip(self), fields(source = self.source.name()))]
    async fn refresh(&self) -> FxResult<Arc<RateSnapshot>> {
        if let Some(snapshot) = self.load_from_store().await {
            info!(rate = %snapshot.rate, fetched_at = %snapshot.fetched_at, "Adopted rate from store");
            return Ok(self.publish(snapshot));
        }

        let rate = match self.source.fetch_rate().await {
            Ok(rate) if rate > Decimal::ZERO => rate,
            Ok(rate) => {
                Counters::bump(&self.counters.refresh_failures);
                let err = FxError::parse(self.source.name(), format!("non-positive rate {rate}"));
                warn!(error = %err, "Rejected rate from source");
                return Err(err);
            }
            Err(err) => {
                Counters::bump(&self.counters.refresh_failures);
                warn!(error = %err, "Rate refresh failed");
                return Err(err);
            }
        };

        let snapshot = RateSnapshot::new(rate, self.clock.now());
        self.save_to_store(&snapshot).await;
        info!(rate = %rate, "Exchange rate refreshed");

        Ok(self.publish(snapshot))
    }

    async fn load_from_store(&self) -> Option<RateSnapshot> {
        let store = self.store.as_ref()?;

        let raw = match store.get(&self.config.store_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Rate store read failed");
                return None;
            }
        };

        let snapshot: RateSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored rate");
                return None;
            }
        };

        if snapshot.rate <= Decimal::ZERO {
            warn!(rate = %snapshot.rate, "Ignoring non-positive stored rate");
            return None;
        }

        if !snapshot.is_valid_at(self.clock.now(), self.config.ttl) {
            debug!(fetched_at = %snapshot.fetched_at, "Stored rate expired");
            return None;
        }

        Some(snapshot)
    }

    async fn save_to_store(&self, snapshot: &RateSnapshot) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let encoded = match serde_json::to_string(snapshot) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Cannot encode rate for store");
                return;
            }
        };

        if let Err(e) = store
            .set(&self.config.store_key, encoded, self.config.ttl.as_std())
            .await
        {
            warn!(error = %e, "Rate store write failed");
        }
    }

    fn stale_or_unavailable(&self, err: FxError) -> FxResult<Arc<RateSnapshot>> {
        let stale = self.current.read().clone();
        match stale {
            Some(snapshot) => {
                Counters::bump(&self.counters.stale_served);
                warn!(
                    rate = %snapshot.rate,
                    age_secs = snapshot.age(self.clock.now()).num_seconds(),
                    error = %err,
                    "Serving stale rate after failed refresh"
                );
                Ok(snapshot)
            }
            None => Err(FxError::RateUnavailable(Box::new(err))),
        }
    }
}

/// Thread-safe USD/BRL rate cache.
///
/// Cheap to clone; clones share the same slot and in-flight refresh.
#[derive(Clone)]
pub struct RateCache {
    inner: Arc<Inner>,
}

impl RateCache {
    /// Create a cache over `source` with no external store.
    pub fn new(source: Arc<dyn RateProvider>, config: RateCacheConfig) -> Self {
        Self::builder(source).config(config).build()
    }

    pub fn builder(source: Arc<dyn RateProvider>) -> RateCacheBuilder {
        RateCacheBuilder::new(source)
    }

    /// Get a rate that is fresh, or stale after a failed refresh.
    pub async fn get_rate(&self) -> FxResult<Decimal> {
        self.get_snapshot().await.map(|snapshot| snapshot.rate)
    }

    /// Like [`RateCache::get_rate`] but returns the whole snapshot.
    pub async fn get_snapshot(&self) -> FxResult<Arc<RateSnapshot>> {
        if let Some(snapshot) = self.inner.fresh_snapshot() {
            Counters::bump(&self.inner.counters.hits);
            debug!(rate = %snapshot.rate, "Cache hit");
            return Ok(snapshot);
        }

        Counters::bump(&self.inner.counters.misses);
        debug!("Cache miss");

        let refresh = match self.join_or_start_refresh() {
            Lookup::Fresh(snapshot) => return Ok(snapshot),
            Lookup::Pending(refresh) => refresh,
        };

        match refresh.await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => self.inner.stale_or_unavailable(err),
        }
    }

    /// Attach to the refresh in flight, or start one.
    ///
    /// The slot is checked again under the in-flight lock: a refresh publishes
    /// its snapshot before it clears the in-flight cell, so a caller that lost
    /// the race sees the new snapshot instead of starting a second fetch.
    fn join_or_start_refresh(&self) -> Lookup {
        let mut in_flight = self.inner.in_flight.lock();

        if let Some(snapshot) = self.inner.fresh_snapshot() {
            return Lookup::Fresh(snapshot);
        }

        if let Some(pending) = in_flight.as_ref() {
            Counters::bump(&self.inner.counters.joined);
            debug!(generation = pending.generation, "Joining in-flight refresh");
            return Lookup::Pending(pending.future.clone());
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Counters::bump(&self.inner.counters.refreshes);
        debug!(generation, "Starting refresh");

        // Runs on its own task so a cancelled caller cannot cancel it.
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _guard = RefreshGuard {
                inner: Arc::clone(&inner),
                generation,
            };
            // Bound first: a tail `.await` would outlive `inner`.
            let result = inner.refresh().await;
            result
        });

        let future = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(FxError::Internal(format!("rate refresh task failed: {e}"))),
            }
        }
        .boxed()
        .shared();

        *in_flight = Some(InFlight {
            generation,
            future: future.clone(),
        });

        Lookup::Pending(future)
    }

    /// Drop the cached snapshot so the next call refreshes from providers.
    ///
    /// A refresh already in flight still publishes its result.
    pub async fn invalidate(&self) {
        *self.inner.current.write() = None;

        if let Some(store) = self.inner.store.as_ref() {
            if let Err(e) = store.delete(&self.inner.config.store_key).await {
                warn!(error = %e, "Rate store delete failed");
            }
        }

        info!("Rate cache invalidated");
    }

    /// Current snapshot regardless of age.
    pub fn peek(&self) -> Option<Arc<RateSnapshot>> {
        self.inner.current.read().clone()
    }

    /// Check whether a refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    pub fn config(&self) -> &RateCacheConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.counters.snapshot()
    }
}

/// Builder for [`RateCache`].
pub struct RateCacheBuilder {
    source: Arc<dyn RateProvider>,
    store: Option<Arc<dyn RateStore>>,
    clock: Arc<dyn Clock>,
    config: RateCacheConfig,
}

impl RateCacheBuilder {
    pub fn new(source: Arc<dyn RateProvider>) -> Self {
        Self {
            source,
            store: None,
            clock: Arc::new(SystemClock),
            config: RateCacheConfig::default(),
        }
    }

    /// Share snapshots through an external store.
    pub fn store(mut self, store: Arc<dyn RateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: RateCacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> RateCache {
        RateCache {
            inner: Arc::new(Inner {
                source: self.source,
                store: self.store,
                clock: self.clock,
                config: self.config,
                current: RwLock::new(None),
                in_flight: Mutex::new(None),
                generation: AtomicU64::new(0),
                counters: Counters::default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FallbackRateSource, MockRateProvider};
    use crate::store::InMemoryRateStore;
    use fleetrate_common::ManualClock;
    use rust_decimal_macros::dec;
    use std::time::Duration as StdDuration;
    use tokio_test::assert_ready_ok;

    fn cache_over(provider: Arc<MockRateProvider>, clock: Arc<ManualClock>) -> RateCache {
        RateCache::builder(provider).clock(clock).build()
    }

    #[tokio::test]
    async fn test_fresh_snapshot_served_without_fetch() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.10)));
        let clock = Arc::new(ManualClock::new());
        let cache = cache_over(provider.clone(), clock.clone());

        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));
        for _ in 0..5 {
            clock.advance(Duration::minutes(1));
            assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));
        }

        assert_eq!(provider.calls(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 5);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.refreshes, 1);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_refreshed() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.10)));
        let clock = Arc::new(ManualClock::new());
        let cache = cache_over(provider.clone(), clock.clone());

        cache.get_rate().await.unwrap();
        provider.set_outcome(Ok(dec!(5.25)));

        clock.advance(Duration::minutes(9) + Duration::seconds(59));
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));
        assert_eq!(provider.calls(), 1);

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.25));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_completes_on_first_poll() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.10)));
        let cache = cache_over(provider, Arc::new(ManualClock::new()));
        cache.get_rate().await.unwrap();

        let mut hit = tokio_test::task::spawn(cache.get_rate());
        let rate = assert_ready_ok!(hit.poll());
        assert_eq!(rate, dec!(5.10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fetch() {
        let provider = Arc::new(
            MockRateProvider::returning("mock", dec!(5.30)).with_latency(StdDuration::from_millis(100)),
        );
        let cache = cache_over(provider.clone(), Arc::new(ManualClock::new()));

        let callers: Vec<_> = (0..64)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_rate().await })
            })
            .collect();

        for caller in futures::future::join_all(callers).await {
            assert_eq!(caller.unwrap().unwrap(), dec!(5.30));
        }

        assert_eq!(provider.calls(), 1);
        let stats = cache.stats();
        assert_eq!(stats.refreshes, 1);
        assert!(stats.joined > 0);
        assert!(!cache.is_refreshing());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fallback() {
        let primary = Arc::new(MockRateProvider::failing("primary"));
        let secondary = Arc::new(
            MockRateProvider::returning("secondary", dec!(5.40)).with_latency(StdDuration::from_millis(50)),
        );
        let providers: Vec<Arc<dyn RateProvider>> = vec![primary.clone(), secondary.clone()];
        let source = Arc::new(FallbackRateSource::new(providers, StdDuration::from_secs(1)));
        let cache = RateCache::builder(source).build();

        let rates = futures::future::join_all((0..32).map(|_| cache.get_rate())).await;

        assert!(rates.iter().all(|r| matches!(r, Ok(rate) if *rate == dec!(5.40))));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_rate_served_when_refresh_fails() {
        let provider = Arc::new(MockRateProvider::failing("mock"));
        provider.push_outcome(Ok(dec!(5.10)));
        let clock = Arc::new(ManualClock::new());
        let cache = cache_over(provider.clone(), clock.clone());

        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));

        clock.advance(Duration::minutes(11));
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));

        assert_eq!(provider.calls(), 2);
        let stats = cache.stats();
        assert_eq!(stats.refresh_failures, 1);
        assert_eq!(stats.stale_served, 1);
        let snapshot = cache.peek().unwrap();
        assert!(!snapshot.is_valid_at(clock.now(), cache.config().ttl));
    }

    #[tokio::test]
    async fn test_stale_snapshot_replaced_once_providers_recover() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.10)));
        let clock = Arc::new(ManualClock::new());
        let cache = cache_over(provider.clone(), clock.clone());
        cache.get_rate().await.unwrap();

        clock.advance(Duration::minutes(11));
        provider.push_outcome(Err(FxError::unreachable("mock", "blip")));
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));

        provider.set_outcome(Ok(dec!(5.20)));
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.20));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cold_start_failure_reaches_every_waiter() {
        let provider = Arc::new(
            MockRateProvider::failing("mock").with_latency(StdDuration::from_millis(50)),
        );
        let cache = cache_over(provider.clone(), Arc::new(ManualClock::new()));

        let results = futures::future::join_all((0..16).map(|_| cache.get_rate())).await;

        for result in results {
            let err = result.unwrap_err();
            assert!(matches!(err, FxError::RateUnavailable(_)), "{err}");
            assert_eq!(err.error_code(), "RATE_UNAVAILABLE");
        }
        assert_eq!(provider.calls(), 1);
        assert!(cache.peek().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_block_next_attempt() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.10)));
        provider.push_outcome(Err(FxError::unreachable("mock", "down")));
        let cache = cache_over(provider.clone(), Arc::new(ManualClock::new()));

        assert!(cache.get_rate().await.is_err());
        assert!(!cache.is_refreshing());
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.10));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_non_positive_rate_never_cached() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(0)));
        let cache = cache_over(provider, Arc::new(ManualClock::new()));

        let err = cache.get_rate().await.unwrap_err();
        match err {
            FxError::RateUnavailable(cause) => assert!(matches!(*cause, FxError::Parse { .. })),
            other => panic!("unexpected error: {other}"),
        }
        assert!(cache.peek().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_caller_does_not_cancel_shared_refresh() {
        let provider = Arc::new(
            MockRateProvider::returning("mock", dec!(5.30)).with_latency(StdDuration::from_millis(200)),
        );
        let cache = cache_over(provider.clone(), Arc::new(ManualClock::new()));

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_rate().await })
        };
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert!(cache.is_refreshing());
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.30));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.10)));
        let cache = cache_over(provider.clone(), Arc::new(ManualClock::new()));

        cache.get_rate().await.unwrap();
        cache.invalidate().await;
        assert!(cache.peek().is_none());

        cache.get_rate().await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_is_written_to_store() {
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.30)));
        let store = Arc::new(InMemoryRateStore::new());
        let cache = RateCache::builder(provider)
            .store(store.clone())
            .clock(Arc::new(ManualClock::new()))
            .build();

        cache.get_rate().await.unwrap();

        let raw = store.get(DEFAULT_RATE_KEY).await.unwrap().unwrap();
        let stored: RateSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.rate, dec!(5.30));
        assert_eq!(&stored, cache.peek().unwrap().as_ref());
    }

    #[tokio::test]
    async fn test_fresh_stored_snapshot_adopted_without_fetch() {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(InMemoryRateStore::new());
        let shared = RateSnapshot::new(dec!(5.15), clock.now() - Duration::minutes(4));
        store
            .set(
                DEFAULT_RATE_KEY,
                serde_json::to_string(&shared).unwrap(),
                StdDuration::from_secs(600),
            )
            .await
            .unwrap();

        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.30)));
        let cache = RateCache::builder(provider.clone())
            .store(store)
            .clock(clock.clone())
            .build();

        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.15));
        assert_eq!(provider.calls(), 0);

        // Adopted snapshot keeps its original fetch time.
        clock.advance(Duration::minutes(6));
        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.30));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_stored_snapshot_ignored_despite_store_ttl() {
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(InMemoryRateStore::new());
        let old = RateSnapshot::new(dec!(5.15), clock.now() - Duration::minutes(30));
        store
            .set(
                DEFAULT_RATE_KEY,
                serde_json::to_string(&old).unwrap(),
                StdDuration::from_secs(3600),
            )
            .await
            .unwrap();

        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.30)));
        let cache = RateCache::builder(provider.clone())
            .store(store)
            .clock(clock)
            .build();

        assert_eq!(cache.get_rate().await.unwrap(), dec!(5.30));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_clears_store() {
        let store = Arc::new(InMemoryRateStore::new());
        let provider = Arc::new(MockRateProvider::returning("mock", dec!(5.30)));
        let cache = RateCache::builder(provider.clone()).store(store.clone()).build();

        cache.get_rate().await.unwrap();
        cache.invalidate().await;

        assert_eq!(store.get(DEFAULT_RATE_KEY).await.unwrap(), None);
        cache.get_rate().await.unwrap();
        assert_eq!(provider.calls(), 2);
    }
}
