//! Rate provider trait and the ordered fallback chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::error::{FxError, FxResult};

/// A source of the BRL-per-USD rate.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the current rate, already normalized to BRL per 1 USD.
    async fn fetch_rate(&self) -> FxResult<Decimal>;
}

/// Tries providers in priority order and returns the first usable rate.
///
/// Each call is bounded by `timeout`. A provider that answers with a
/// non-positive rate is treated as a parse failure and the next one is tried.
pub struct FallbackRateSource {
    providers: Vec<Arc<dyn RateProvider>>,
    timeout: Duration,
}

impl FallbackRateSource {
    /// Create a chain from providers listed primary first.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Names of the providers in the order they are tried.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    async fn try_provider(&self, provider: &dyn RateProvider) -> FxResult<Decimal> {
        let rate = match tokio::time::timeout(self.timeout, provider.fetch_rate()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(FxError::ProviderTimeout {
                    provider: provider.name().to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        if rate <= Decimal::ZERO {
            return Err(FxError::parse(
                provider.name(),
                format!("non-positive rate {rate}"),
            ));
        }

        Ok(rate)
    }
}

#[async_trait]
impl RateProvider for FallbackRateSource {
    fn name(&self) -> &str {
        "FALLBACK"
    }

    #[instrument(skip(self), fields(providers = self.providers.len()))]
    async fn fetch_rate(&self) -> FxResult<Decimal> {
        let mut causes = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match self.try_provider(provider.as_ref()).await {
                Ok(rate) => {
                    debug!(provider = provider.name(), rate = %rate, "Got rate from provider");
                    return Ok(rate);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed to return rate");
                    causes.push(e);
                }
            }
        }

        Err(FxError::RateSourceUnavailable { causes })
    }
}

/// Scripted rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    script: parking_lot::Mutex<std::collections::VecDeque<FxResult<Decimal>>>,
    fallback: parking_lot::Mutex<FxResult<Decimal>>,
    latency: parking_lot::Mutex<Duration>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a provider that always answers `rate`.
    pub fn returning(name: impl Into<String>, rate: Decimal) -> Self {
        Self::with_outcome(name, Ok(rate))
    }

    /// Create a provider that always fails as unreachable.
    pub fn failing(name: impl Into<String>) -> Self {
        let name = name.into();
        let err = FxError::unreachable(name.clone(), "mock provider down");
        Self::with_outcome(name, Err(err))
    }

    fn with_outcome(name: impl Into<String>, outcome: FxResult<Decimal>) -> Self {
        Self {
            name: name.into(),
            script: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            fallback: parking_lot::Mutex::new(outcome),
            latency: parking_lot::Mutex::new(Duration::ZERO),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    /// Queue a one-shot outcome, consumed before the standing outcome.
    pub fn push_outcome(&self, outcome: FxResult<Decimal>) {
        self.script.lock().push_back(outcome);
    }

    /// Replace the standing outcome.
    pub fn set_outcome(&self, outcome: FxResult<Decimal>) {
        *self.fallback.lock() = outcome;
    }

    /// Number of `fetch_rate` calls started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rate(&self) -> FxResult<Decimal> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => self.fallback.lock().clone(),
        }
    }
}
