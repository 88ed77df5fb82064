//! HTTP middleware for axum.
//!
//! - `auth` - Session token validation and the `OptionalAuth` extractor

pub mod auth;

pub use auth::{auth_middleware, extract_token, AuthState, OptionalAuth, DEFAULT_SESSION_COOKIE};
