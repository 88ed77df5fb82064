//! Session validation port for token validation.
//!
//! HTTP middleware hands the raw token to this port and receives the viewer
//! identity back. The port is scheme-agnostic; the shipped adapter checks
//! HS256 JWTs.
//!
//! # Contract
//!
//! Implementations must:
//! - Validate the token signature
//! - Validate the expiry claim
//! - Return `AuthError::InvalidToken` for malformed/bad signature tokens
//! - Return `AuthError::TokenExpired` for expired tokens

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a token (without any scheme prefix) and return the viewer.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
