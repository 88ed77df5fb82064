//! Money value object.
//!
//! Amounts are held in minor units (cents) as the payment provider reports
//! them; major units are derived only for display and JSON output.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Currency used when the provider does not report one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Non-negative amount in minor units plus an uppercase currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount_minor: i64,
    currency: String,
}

impl Money {
    /// Creates a money value, uppercasing the currency code.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` when the amount is negative
    /// - `InvalidFormat` when the currency is not three ASCII letters
    pub fn from_minor(amount_minor: i64, currency: &str) -> Result<Self, ValidationError> {
        if amount_minor < 0 {
            return Err(ValidationError::out_of_range(
                "amount",
                0,
                i64::MAX,
                amount_minor,
            ));
        }
        let currency = currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter code",
            ));
        }
        Ok(Self {
            amount_minor,
            currency,
        })
    }

    /// Euro amount in cents.
    pub fn eur(amount_minor: i64) -> Result<Self, ValidationError> {
        Self::from_minor(amount_minor, DEFAULT_CURRENCY)
    }

    /// Amount in minor units.
    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    /// Uppercase currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Amount in major units, for JSON consumers.
    pub fn as_major(&self) -> f64 {
        self.amount_minor as f64 / 100.0
    }

    /// Major-unit amount with exactly two decimals, e.g. `49.99`.
    pub fn major_string(&self) -> String {
        format!("{}.{:02}", self.amount_minor / 100, self.amount_minor % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.major_string(), self.currency)
    }
}
