//! Pricing

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use thiserror::Error;

/// Errors that can occur while converting between decimal amounts and money.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount does not fit in the minor units of the currency.
    #[error("amount {0} cannot be represented in minor units")]
    AmountOutOfRange(Decimal),

    /// Money amounts cannot be negative.
    #[error("amount {0} is negative")]
    NegativeAmount(Decimal),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Resolve an ISO currency code supported by the canteen.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, PricingError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(PricingError::UnknownCurrency(other.to_string())),
    }
}

/// Exact decimal amount (in major units) of a money value.
pub fn money_to_decimal(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Round a decimal amount to the minor unit of the currency.
///
/// Midpoints round away from zero. This is only ever applied when presenting
/// or transmitting an amount, never while accumulating one.
pub fn round_to_minor(amount: Decimal, currency: &Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a decimal amount in major units into money, rounding to the minor unit.
///
/// # Errors
///
/// - [`PricingError::NegativeAmount`]: the amount is below zero.
/// - [`PricingError::AmountOutOfRange`]: the amount overflows `i64` minor units.
pub fn decimal_to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::NegativeAmount(amount));
    }

    let minor_units = minor_scale(currency)
        .and_then(|scale| amount.checked_mul(scale))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or(PricingError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}

fn minor_scale(currency: &Currency) -> Option<Decimal> {
    10_u64
        .checked_pow(currency.exponent)
        .and_then(Decimal::from_u64)
}
