//! Spending ceiling for a single payment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{self, USDC_DECIMALS};
use crate::error::ActionError;

/// Result of checking an amount against the ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitCheck {
    /// Whether the amount is at or below the ceiling.
    pub is_valid: bool,
    /// The requested amount in USDC, for messages.
    pub requested_amount: String,
    /// The ceiling in USDC, for messages.
    pub max_amount: String,
}

impl LimitCheck {
    /// Converts a failed check into [`ActionError::PaymentExceedsLimit`].
    ///
    /// # Errors
    ///
    /// Returns the error when `is_valid` is false.
    pub fn into_result(self) -> Result<(), ActionError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(ActionError::PaymentExceedsLimit {
                requested: self.requested_amount,
                max: self.max_amount,
            })
        }
    }
}

/// Checks an atomic USDC amount against a ceiling in whole USDC.
///
/// The ceiling is floored to atomic units; the amount is never clamped. An
/// amount that is not an integer string is reported as invalid and echoed
/// verbatim.
#[must_use]
pub fn validate_payment_limit(amount_atomic: &str, max_usdc: Decimal) -> LimitCheck {
    let max_amount = max_usdc.normalize().to_string();
    let ceiling = amount::to_atomic_floor(max_usdc, USDC_DECIMALS).unwrap_or(u128::MAX);
    match amount::parse_atomic(amount_atomic) {
        Ok(requested) => LimitCheck {
            is_valid: requested <= ceiling,
            requested_amount: amount::format_units(requested, USDC_DECIMALS),
            max_amount,
        },
        Err(_) => LimitCheck {
            is_valid: false,
            requested_amount: amount_atomic.to_owned(),
            max_amount,
        },
    }
}

/// The configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLimit {
    /// Maximum payment per request in whole USDC.
    pub max_payment_usdc: Decimal,
}

impl PaymentLimit {
    /// Creates a ceiling of `max_payment_usdc` whole USDC.
    #[must_use]
    pub const fn new(max_payment_usdc: Decimal) -> Self {
        Self { max_payment_usdc }
    }

    /// Checks an atomic amount against this ceiling.
    #[must_use]
    pub fn check(&self, amount_atomic: &str) -> LimitCheck {
        validate_payment_limit(amount_atomic, self.max_payment_usdc)
    }

    /// The ceiling in atomic units.
    #[must_use]
    pub fn max_atomic(&self) -> u128 {
        amount::to_atomic_floor(self.max_payment_usdc, USDC_DECIMALS).unwrap_or(u128::MAX)
    }
}

impl Default for PaymentLimit {
    fn default() -> Self {
        Self::new(Decimal::ONE)
    }
}
