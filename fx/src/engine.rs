//! Price conversion facade used by the vehicle service.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::cache::{CacheStats, RateCache, RateSnapshot};
use crate::config::FxConfig;
use crate::conversion::{
    convert_to_brl, convert_to_usd, Conversion, ConversionDirection, ConversionRequest,
};
use crate::error::FxResult;
use crate::store::RateStore;

/// Converts vehicle prices between the BRL shown to users and the USD kept
/// in storage.
///
/// Every method obtains its rate from the shared [`RateCache`]; methods that
/// convert several amounts look the rate up once so all of them use the same
/// rate. A returned [`crate::FxError::RateUnavailable`] means conversion is
/// temporarily impossible and only the current request should fail.
#[derive(Clone)]
pub struct PriceConverter {
    cache: RateCache,
}

impl PriceConverter {
    pub fn new(cache: RateCache) -> Self {
        Self { cache }
    }

    /// Wire providers and cache from configuration.
    pub fn from_config(config: &FxConfig, store: Option<Arc<dyn RateStore>>) -> FxResult<Self> {
        let source = Arc::new(config.build_source()?);
        let mut builder = RateCache::builder(source).config(config.cache_config());
        if let Some(store) = store {
            builder = builder.store(store);
        }
        Ok(Self::new(builder.build()))
    }

    /// Convert `amount` in the given direction at the current rate.
    #[instrument(skip(self))]
    pub async fn get_converted_rate(
        &self,
        direction: ConversionDirection,
        amount: Decimal,
    ) -> FxResult<Decimal> {
        let rate = self.cache.get_rate().await?;
        let converted = direction.convert(amount, rate)?;
        debug!(rate = %rate, converted = %converted, "Converted amount");
        Ok(converted)
    }

    /// Convert and keep a full record of the rate used.
    #[instrument(skip(self), fields(direction = %request.direction, amount = %request.amount))]
    pub async fn convert(&self, request: ConversionRequest) -> FxResult<Conversion> {
        let snapshot = self.cache.get_snapshot().await?;
        let conversion = Conversion::execute(request, &snapshot)?;

        info!(
            conversion_id = %conversion.id,
            output = %conversion.output,
            rate = %conversion.rate,
            "Conversion completed"
        );

        Ok(conversion)
    }

    /// User-entered BRL price to its stored USD value.
    pub async fn to_storage(&self, brl: Decimal) -> FxResult<Decimal> {
        self.get_converted_rate(ConversionDirection::BrlToUsd, brl).await
    }

    /// Stored USD price to the BRL value shown to users.
    pub async fn to_display(&self, usd: Decimal) -> FxResult<Decimal> {
        self.get_converted_rate(ConversionDirection::UsdToBrl, usd).await
    }

    /// Convert optional BRL search bounds to USD for a storage query.
    ///
    /// No rate lookup happens when both bounds are absent.
    pub async fn price_range_to_storage(
        &self,
        min_brl: Option<Decimal>,
        max_brl: Option<Decimal>,
    ) -> FxResult<(Option<Decimal>, Option<Decimal>)> {
        if min_brl.is_none() && max_brl.is_none() {
            return Ok((None, None));
        }

        let rate = self.cache.get_rate().await?;
        Ok((
            min_brl.map(|min| convert_to_usd(min, rate)).transpose()?,
            max_brl.map(|max| convert_to_usd(max, rate)).transpose()?,
        ))
    }

    /// Convert a page of stored USD prices for display.
    pub async fn prices_to_display(&self, usd_prices: &[Decimal]) -> FxResult<Vec<Decimal>> {
        if usd_prices.is_empty() {
            return Ok(Vec::new());
        }

        let rate = self.cache.get_rate().await?;
        usd_prices
            .iter()
            .map(|usd| convert_to_brl(*usd, rate))
            .collect()
    }

    /// Current rate, fetching it if needed.
    pub async fn current_rate(&self) -> FxResult<Arc<RateSnapshot>> {
        self.cache.get_snapshot().await
    }

    /// Force the next lookup to go to the providers.
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
