//! Password hashing port.

use crate::domain::foundation::DomainError;

/// One-way hashing for account passwords.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plain-text password into a storable string.
    fn hash(&self, plain: &str) -> Result<String, DomainError>;

    /// Check a plain-text password against a stored hash.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}
