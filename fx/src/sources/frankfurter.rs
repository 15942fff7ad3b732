//! Secondary provider: Frankfurter (ECB reference rates).
//!
//! `GET {base}/latest?from=USD&to=BRL` answers
//! `{"amount": 1.0, "base": "USD", "date": "...", "rates": {"BRL": 5.4}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use fleetrate_common::CurrencyPair;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{get_body, http_client, validate_rate};
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;

pub const NAME: &str = "frankfurter";

/// Default production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, Value>,
}

pub struct FrankfurterProvider {
    client: reqwest::Client,
    base_url: String,
    pair: CurrencyPair,
    timeout: Duration,
}

impl FrankfurterProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pair: CurrencyPair::usd_brl(),
            timeout,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/latest?from={}&to={}",
            self.base_url, self.pair.base, self.pair.quote
        )
    }
}

/// Extract the quote-currency rate from a Frankfurter body.
///
/// The JSON number is read back through its textual form so no binary
/// float rounding reaches the `Decimal`.
pub fn parse_payload(body: &str, pair: &CurrencyPair) -> FxResult<Decimal> {
    let latest: LatestRates = serde_json::from_str(body)
        .map_err(|e| FxError::parse(NAME, format!("malformed payload: {e}")))?;

    let code = pair.quote.code();
    match latest.rates.get(code) {
        Some(Value::Number(n)) => validate_rate(NAME, &n.to_string()),
        Some(other) => Err(FxError::parse(NAME, format!("{code} rate is not a number: {other}"))),
        None => Err(FxError::parse(NAME, format!("missing {code} rate"))),
    }
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_rate(&self) -> FxResult<Decimal> {
        let body = get_body(&self.client, NAME, &self.url(), self.timeout).await?;
        parse_payload(&body, &self.pair)
    }
}
