//! Concurrent lookups against a cold cache.

use std::time::Instant;

use fleetrate_fx::{CacheStats, PriceConverter};
use tracing::{info, warn};

/// Outcome of a burst of concurrent rate lookups.
#[derive(Debug, Clone)]
pub struct BurstReport {
    pub callers: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Per-caller latency samples (ms).
    latencies_ms: Vec<u64>,
    /// Cache counters after the burst.
    pub stats: CacheStats,
}

impl BurstReport {
    pub fn average_latency_ms(&self) -> u64 {
        if self.latencies_ms.is_empty() {
            return 0;
        }
        self.latencies_ms.iter().sum::<u64>() / self.latencies_ms.len() as u64
    }

    pub fn p50_latency_ms(&self) -> u64 {
        self.percentile(50)
    }

    pub fn max_latency_ms(&self) -> u64 {
        self.latencies_ms.iter().copied().max().unwrap_or(0)
    }

    fn percentile(&self, p: usize) -> u64 {
        if self.latencies_ms.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies_ms.clone();
        sorted.sort_unstable();
        let idx = (sorted.len() * p / 100).min(sorted.len() - 1);
        sorted[idx]
    }

    pub fn print(&self) {
        println!("Callers:          {}", self.callers);
        println!("Succeeded:        {}", self.succeeded);
        println!("Failed:           {}", self.failed);
        println!("Provider fetches: {}", self.stats.refreshes);
        println!("Joined in-flight: {}", self.stats.joined);
        println!("Stale served:     {}", self.stats.stale_served);
        println!(
            "Latency ms:       avg {} / p50 {} / max {}",
            self.average_latency_ms(),
            self.p50_latency_ms(),
            self.max_latency_ms()
        );
    }
}

/// Invalidate the cache, then issue `callers` concurrent lookups.
pub async fn run(converter: &PriceConverter, callers: usize) -> BurstReport {
    converter.invalidate().await;
    info!(callers, "Starting burst");

    let tasks: Vec<_> = (0..callers)
        .map(|_| {
            let converter = converter.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let ok = converter.current_rate().await.is_ok();
                (ok, started.elapsed().as_millis() as u64)
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut failed = 0;
    let mut latencies_ms = Vec::with_capacity(callers);

    for joined in futures::future::join_all(tasks).await {
        match joined {
            Ok((true, latency)) => {
                succeeded += 1;
                latencies_ms.push(latency);
            }
            Ok((false, _)) => failed += 1,
            Err(e) => {
                warn!(error = %e, "Burst caller aborted");
                failed += 1;
            }
        }
    }

    BurstReport {
        callers,
        succeeded,
        failed,
        latencies_ms,
        stats: converter.stats(),
    }
}
