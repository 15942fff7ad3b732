//! Currency conversion arithmetic and records.
//!
//! USD values are the storage representation and keep 4 fractional digits so
//! they survive a trip through the rate; BRL values are user-facing and keep
//! cents. Both round half-up. A BRL -> USD -> BRL round trip is therefore not
//! exact and may move the amount by up to one cent.

use std::fmt;

use chrono::{DateTime, Utc};
use fleetrate_common::{Currency, Money};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::RateSnapshot;
use crate::error::{FxError, FxResult};

/// Fractional digits kept for USD amounts.
pub const USD_SCALE: u32 = 4;

/// Fractional digits kept for BRL amounts.
pub const BRL_SCALE: u32 = 2;

/// Convert reais to dollars: `brl / rate`, 4 digits, half-up.
///
/// Fails with [`FxError::Overflow`] when the quotient does not fit.
///
/// # Panics
///
/// If `rate` is not positive. The cache never hands out such a rate, so this
/// is a caller bug.
pub fn convert_to_usd(brl: Decimal, rate: Decimal) -> FxResult<Decimal> {
    assert_positive_rate(rate);
    let usd = brl
        .checked_div(rate)
        .ok_or_else(|| FxError::overflow(brl, rate))?;
    Ok(round_half_up(usd, USD_SCALE))
}

/// Convert dollars to reais: `usd * rate`, 2 digits, half-up.
///
/// Fails with [`FxError::Overflow`] when the product does not fit.
///
/// # Panics
///
/// If `rate` is not positive.
pub fn convert_to_brl(usd: Decimal, rate: Decimal) -> FxResult<Decimal> {
    assert_positive_rate(rate);
    let brl = usd
        .checked_mul(rate)
        .ok_or_else(|| FxError::overflow(usd, rate))?;
    Ok(round_half_up(brl, BRL_SCALE))
}

fn assert_positive_rate(rate: Decimal) {
    assert!(
        rate > Decimal::ZERO,
        "exchange rate must be positive, got {rate}"
    );
}

fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

/// Which way an amount is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionDirection {
    /// User-facing price to storage.
    BrlToUsd,
    /// Storage to user-facing price.
    UsdToBrl,
}

impl ConversionDirection {
    pub fn source(&self) -> Currency {
        match self {
            ConversionDirection::BrlToUsd => Currency::brl(),
            ConversionDirection::UsdToBrl => Currency::usd(),
        }
    }

    pub fn target(&self) -> Currency {
        match self {
            ConversionDirection::BrlToUsd => Currency::usd(),
            ConversionDirection::UsdToBrl => Currency::brl(),
        }
    }

    /// Apply the direction's arithmetic.
    pub fn convert(&self, amount: Decimal, rate: Decimal) -> FxResult<Decimal> {
        match self {
            ConversionDirection::BrlToUsd => convert_to_usd(amount, rate),
            ConversionDirection::UsdToBrl => convert_to_brl(amount, rate),
        }
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source(), self.target())
    }
}

/// Request to convert an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub direction: ConversionDirection,
}

impl ConversionRequest {
    pub fn new(amount: Decimal, direction: ConversionDirection) -> Self {
        Self { amount, direction }
    }

    pub fn brl_to_usd(amount: Decimal) -> Self {
        Self::new(amount, ConversionDirection::BrlToUsd)
    }

    pub fn usd_to_brl(amount: Decimal) -> Self {
        Self::new(amount, ConversionDirection::UsdToBrl)
    }

    /// Converted amount at `rate`.
    pub fn apply(&self, rate: Decimal) -> FxResult<Decimal> {
        self.direction.convert(self.amount, rate)
    }
}

/// Represents a completed conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    pub direction: ConversionDirection,
    pub input: Money,
    pub output: Money,
    /// BRL per 1 USD used for this conversion.
    pub rate: Decimal,
    /// When the rate used was fetched.
    pub rate_fetched_at: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Execute `request` against a cached snapshot.
    pub fn execute(request: ConversionRequest, snapshot: &RateSnapshot) -> FxResult<Self> {
        let output = request.apply(snapshot.rate)?;
        Ok(Self {
            id: Uuid::now_v7(),
            direction: request.direction,
            input: Money::new(request.amount, request.direction.source()),
            output: Money::new(output, request.direction.target()),
            rate: snapshot.rate,
            rate_fetched_at: snapshot.fetched_at,
            executed_at: Utc::now(),
        })
    }
}
