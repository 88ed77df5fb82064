//! Name splitting and temporary credentials for provisioned accounts.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// Length of generated temporary passwords.
pub const TEMPORARY_PASSWORD_LEN: usize = 16;

/// Name used when the payer did not supply one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Zákazník";

/// Splits a display name on whitespace: first token, then the rest.
///
/// Missing parts come back as empty strings.
pub fn split_display_name(display_name: &str) -> (String, String) {
    let mut tokens = display_name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let rest = tokens.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Randomly generated password handed to a new customer exactly once.
///
/// Debug output is redacted so the value cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryPassword(String);

impl TemporaryPassword {
    pub fn generate() -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TEMPORARY_PASSWORD_LEN)
            .map(char::from)
            .collect();
        Self(value)
    }

    /// The plain-text value, for hashing and the welcome email only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TemporaryPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TemporaryPassword([REDACTED])")
    }
}
