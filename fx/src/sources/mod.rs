//! HTTP rate providers.
//!
//! Each provider owns its response shape and normalizes it to a single
//! positive `Decimal` (BRL per 1 USD) before anything leaves the module.

pub mod awesome_api;
pub mod frankfurter;

pub use awesome_api::AwesomeApiProvider;
pub use frankfurter::FrankfurterProvider;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::error::{FxError, FxResult};

/// Parse a provider's textual rate and reject anything that is not a
/// strictly positive number.
pub fn validate_rate(provider: &str, raw: &str) -> FxResult<Decimal> {
    let rate = Decimal::from_str(raw.trim())
        .map_err(|e| FxError::parse(provider, format!("rate {raw:?} is not numeric: {e}")))?;

    if rate <= Decimal::ZERO {
        return Err(FxError::parse(provider, format!("non-positive rate {rate}")));
    }

    Ok(rate)
}

/// Build the HTTP client shared by a provider's calls.
pub(crate) fn http_client(timeout: Duration) -> FxResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FxError::Internal(format!("cannot build HTTP client: {e}")))
}

/// GET `url` and return the body of a successful response.
pub(crate) async fn get_body(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    timeout: Duration,
) -> FxResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify(provider, e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FxError::unreachable(provider, format!("HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| classify(provider, e, timeout))
}

fn classify(provider: &str, err: reqwest::Error, timeout: Duration) -> FxError {
    if err.is_timeout() {
        FxError::ProviderTimeout {
            provider: provider.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        FxError::unreachable(provider, err.to_string())
    }
}
