//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` and `CredentialHasher` ports:
//!
//! - `jwt` - HS256 session tokens shared with the storefront login flow
//! - `argon2_hasher` - Argon2id hashing for provisioned account passwords

mod argon2_hasher;
mod jwt;

pub use argon2_hasher::Argon2CredentialHasher;
pub use jwt::{JwtSessionValidator, SessionClaims};
