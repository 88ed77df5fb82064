//! Authentication types for the domain layer.
//!
//! These types represent a viewer extracted from a session token. They have
//! no external dependencies; any token scheme can populate them through the
//! `SessionValidator` port.
//!
//! # Design Decisions
//!
//! - `AuthenticatedUser` carries only the claims handlers actually use
//! - The role in the token is a hint; authorization decisions reload the
//!   user record so ownership and role changes apply on the next request

use super::UserId;
use crate::domain::account::UserRole;
use thiserror::Error;

/// Authenticated viewer extracted from a validated token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The account identifier (token subject).
    pub id: UserId,

    /// Email address from the token claims.
    pub email: String,

    /// Role claimed by the token.
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Returns true when the token claims the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but the user no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// The authentication backend is unavailable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }
}
