//! User repository port.
//!
//! Accounts are looked up by id or exact email, created during guest
//! checkout, and updated when a course is granted.
//!
//! # Contract
//!
//! - `update` must never remove owned courses that are already stored. Two
//!   concurrent grants for different courses both survive.
//! - `create` reports a duplicate email as `ErrorCode::AlreadyExists` so a
//!   racing provisioning attempt can fall back to the existing account.

use crate::domain::account::User;
use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find a user by exact email as stored. First match wins.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the email is taken
    /// - `DatabaseError` on persistence failure
    async fn create(&self, user: &User) -> Result<(), DomainError>;

    /// Persist changes to an existing user.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, user: &User) -> Result<(), DomainError>;
}
