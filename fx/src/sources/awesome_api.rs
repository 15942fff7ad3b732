//! Primary provider: AwesomeAPI quotes.
//!
//! `GET {base}/json/last/USD-BRL` answers
//! `{"USDBRL": {"bid": "5.3012", "ask": "...", ...}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use fleetrate_common::CurrencyPair;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{get_body, http_client, validate_rate};
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;

pub const NAME: &str = "awesomeapi";

/// Default production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://economia.awesomeapi.com.br";

#[derive(Debug, Deserialize)]
struct Quote {
    bid: String,
}

pub struct AwesomeApiProvider {
    client: reqwest::Client,
    base_url: String,
    pair: CurrencyPair,
    timeout: Duration,
}

impl AwesomeApiProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pair: CurrencyPair::usd_brl(),
            timeout,
        })
    }

    fn url(&self) -> String {
        format!("{}/json/last/{}", self.base_url, self.pair.dashed())
    }
}

/// Extract the bid for `pair` from an AwesomeAPI body.
pub fn parse_payload(body: &str, pair: &CurrencyPair) -> FxResult<Decimal> {
    let mut quotes: HashMap<String, Quote> = serde_json::from_str(body)
        .map_err(|e| FxError::parse(NAME, format!("malformed payload: {e}")))?;

    let key = pair.compact();
    let quote = quotes
        .remove(&key)
        .ok_or_else(|| FxError::parse(NAME, format!("missing {key} quote")))?;

    validate_rate(NAME, &quote.bid)
}

#[async_trait]
impl RateProvider for AwesomeApiProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_rate(&self) -> FxResult<Decimal> {
        let body = get_body(&self.client, NAME, &self.url(), self.timeout).await?;
        parse_payload(&body, &self.pair)
    }
}
