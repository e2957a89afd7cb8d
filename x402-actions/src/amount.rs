//! Conversion between atomic token units and human-readable decimals.
//!
//! Amounts are carried as atomic integers (`u128`) everywhere they are
//! compared. Decimal strings only appear at the edges: when an agent supplies
//! a USDC ceiling such as `"0.50"`, and when an amount is rendered back into a
//! message.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Number of decimals used by every USDC deployment we know of.
pub const USDC_DECIMALS: u32 = 6;

/// Errors produced while parsing an amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The input was empty or whitespace.
    #[error("Amount is empty")]
    Empty,
    /// The input is not a plain non-negative decimal number.
    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),
    /// Negative values are not allowed.
    #[error("Negative amount is not allowed")]
    Negative,
    /// The input has more significant decimal places than the token supports.
    #[error("Too much precision: {money} decimal places vs {token} on token")]
    WrongPrecision {
        /// Significant decimal places in the input.
        money: u32,
        /// Decimal places supported by the token.
        token: u32,
    },
    /// The value does not fit into `u128` atomic units.
    #[error("Amount out of range")]
    OutOfRange,
}

/// Renders an atomic amount as a decimal string with trailing zeros removed.
///
/// `format_units(1_500_000, 6)` is `"1.5"`, `format_units(2_000_000, 6)` is `"2"`.
#[must_use]
pub fn format_units(amount: u128, decimals: u32) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{digits}", "0".repeat(decimals - digits.len() + 1))
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parses a decimal string into atomic units.
///
/// Trailing zeros beyond the token precision are accepted; any other excess
/// precision is an error rather than a silent truncation.
///
/// # Errors
///
/// Returns [`AmountError`] when the string is not a plain non-negative decimal,
/// carries more precision than `decimals`, or overflows `u128`.
pub fn parse_units(input: &str, decimals: u32) -> Result<u128, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::Negative);
    }
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::InvalidFormat(input.to_owned()));
    }

    let fraction = fraction.trim_end_matches('0');
    let scale = u32::try_from(fraction.len()).map_err(|_| AmountError::OutOfRange)?;
    if scale > decimals {
        return Err(AmountError::WrongPrecision {
            money: scale,
            token: decimals,
        });
    }

    let padding = "0".repeat((decimals - scale) as usize);
    let combined = format!("{whole}{fraction}{padding}");
    let combined = combined.trim_start_matches('0');
    if combined.is_empty() {
        return Ok(0);
    }
    combined.parse().map_err(|_| AmountError::OutOfRange)
}

/// Parses an atomic amount carried as a decimal integer string.
///
/// # Errors
///
/// Returns [`AmountError`] when the string is not a non-negative integer.
pub fn parse_atomic(input: &str) -> Result<u128, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::Negative);
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidFormat(input.to_owned()));
    }
    input.parse().map_err(|_| AmountError::OutOfRange)
}

/// Converts a whole-token decimal into atomic units, flooring any excess
/// precision.
///
/// This is the conversion used for spending ceilings: a ceiling of
/// `0.0000019` USDC allows at most `1` atomic unit. Negative ceilings floor
/// to zero.
///
/// # Errors
///
/// Returns [`AmountError::OutOfRange`] on overflow.
pub fn to_atomic_floor(value: Decimal, decimals: u32) -> Result<u128, AmountError> {
    if value.is_sign_negative() {
        return Ok(0);
    }
    let mut scaled = value;
    for _ in 0..decimals {
        scaled = scaled
            .checked_mul(Decimal::TEN)
            .ok_or(AmountError::OutOfRange)?;
    }
    scaled.floor().to_u128().ok_or(AmountError::OutOfRange)
}

/// Parses a whole-token decimal string such as `"1.25"`.
///
/// # Errors
///
/// Returns [`AmountError::InvalidFormat`] when the input is not a decimal number.
pub fn parse_decimal(input: &str) -> Result<Decimal, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    Decimal::from_str(trimmed).map_err(|_| AmountError::InvalidFormat(trimmed.to_owned()))
}
