//! FleetRate FX
//!
//! USD/BRL exchange rates for vehicle prices.
//!
//! # Features
//!
//! - Ordered provider fallback (AwesomeAPI, then Frankfurter) with per-call timeouts
//! - Rate cache with a 10 minute TTL, single-flight refresh and stale-if-error
//! - Optional external key/value store shared between instances
//! - Half-up conversion: 4 digits for stored USD, 2 digits for displayed BRL
//!
//! # Example
//!
//! ```rust,ignore
//! use fleetrate_fx::{FxConfig, PriceConverter};
//!
//! let converter = PriceConverter::from_config(&FxConfig::from_env(), None)?;
//!
//! // Price typed by a user, as stored
//! let usd = converter.to_storage("53000.00".parse()?).await?;
//!
//! // Stored price, as shown
//! let brl = converter.to_display(usd).await?;
//! ```

pub mod cache;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;
pub mod sources;
pub mod store;

pub use cache::{CacheStats, RateCache, RateCacheConfig, RateSnapshot};
pub use config::FxConfig;
pub use conversion::{convert_to_brl, convert_to_usd, Conversion, ConversionDirection, ConversionRequest};
pub use engine::PriceConverter;
pub use error::{FxError, FxResult};
pub use provider::{FallbackRateSource, RateProvider};
pub use store::{InMemoryRateStore, RateStore};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
