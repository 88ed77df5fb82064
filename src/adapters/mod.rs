//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - HS256 session tokens and Argon2 password hashing
//! - `email` - Resend delivery and local notifiers
//! - `http` - Axum routes, middleware and error mapping
//! - `memory` - In-memory entity store
//! - `postgres` - sqlx repositories
//! - `stripe` - Stripe checkout, billing portal and webhook verification

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
