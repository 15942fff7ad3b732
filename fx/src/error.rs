//! FX error types.

use thiserror::Error;

/// Errors that can occur while obtaining or applying an exchange rate.
///
/// `Clone` because a single refresh outcome is handed to every caller
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum FxError {
    /// Provider payload was malformed or carried a non-positive rate.
    #[error("{provider}: unusable rate payload: {reason}")]
    Parse { provider: String, reason: String },

    /// Provider did not answer within its time budget.
    #[error("{provider}: no response within {timeout_ms}ms")]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    /// Provider could not be reached or answered with an error status.
    #[error("{provider}: unreachable: {reason}")]
    ProviderUnreachable { provider: String, reason: String },

    /// Every configured provider failed.
    #[error("rate source unavailable ({})", join_causes(.causes))]
    RateSourceUnavailable { causes: Vec<FxError> },

    /// No rate could be obtained and none was cached.
    #[error("exchange rate unavailable: {0}")]
    RateUnavailable(Box<FxError>),

    /// Converted amount does not fit in a decimal.
    #[error("converting {amount} at rate {rate} overflows")]
    Overflow { amount: String, rate: String },

    /// External rate store failed.
    #[error("rate store error: {0}")]
    Store(String),

    /// The refresh task ended without producing a result.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FxError {
    pub fn parse(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        FxError::Parse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn overflow(amount: impl ToString, rate: impl ToString) -> Self {
        FxError::Overflow {
            amount: amount.to_string(),
            rate: rate.to_string(),
        }
    }

    pub fn unreachable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        FxError::ProviderUnreachable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Check if trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::ProviderTimeout { .. }
                | FxError::ProviderUnreachable { .. }
                | FxError::RateSourceUnavailable { .. }
                | FxError::RateUnavailable(_)
                | FxError::Store(_)
        )
    }

    /// Stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Parse { .. } => "RATE_PARSE_ERROR",
            FxError::ProviderTimeout { .. } => "PROVIDER_TIMEOUT",
            FxError::ProviderUnreachable { .. } => "PROVIDER_UNREACHABLE",
            FxError::RateSourceUnavailable { .. } => "RATE_SOURCE_UNAVAILABLE",
            FxError::RateUnavailable(_) => "RATE_UNAVAILABLE",
            FxError::Overflow { .. } => "CONVERSION_OVERFLOW",
            FxError::Store(_) => "RATE_STORE_ERROR",
            FxError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

fn join_causes(causes: &[FxError]) -> String {
    causes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
