//! Human-readable order numbers: `BA-YYYYMMDD-XXXX`.
//!
//! The suffix is random, so two orders on the same day can collide. The
//! store's unique index on the number is what actually guarantees uniqueness.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

pub const ORDER_NUMBER_PREFIX: &str = "BA";

/// Exclusive upper bound of the random suffix.
const SUFFIX_RANGE: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generates a number dated at `at` (UTC) with a random suffix.
    pub fn generate(at: &Timestamp) -> Self {
        let suffix = rand::thread_rng().gen_range(0..SUFFIX_RANGE);
        Self::with_suffix(at, suffix)
    }

    fn with_suffix(at: &Timestamp, suffix: u32) -> Self {
        Self(format!(
            "{}-{}-{:04}",
            ORDER_NUMBER_PREFIX,
            at.compact_date(),
            suffix % SUFFIX_RANGE
        ))
    }

    /// Parses a stored order number, checking its shape.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::invalid_format("order_number", "expected BA-YYYYMMDD-XXXX");
        let mut parts = value.split('-');
        let (Some(prefix), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if prefix != ORDER_NUMBER_PREFIX
            || date.len() != 8
            || !all_digits(date)
            || suffix.len() != 4
            || !all_digits(suffix)
        {
            return Err(invalid());
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
