//! Order repository port.
//!
//! Orders carry a unique checkout session id, so one session can never
//! produce two receipts even when webhook deliveries race.

use crate::domain::foundation::DomainError;
use crate::domain::ordering::Order;
use async_trait::async_trait;

/// Outcome of inserting an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// The order was stored.
    Inserted,
    /// An order for the same checkout session already exists.
    AlreadyExists,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order.
    ///
    /// Returns `SaveResult::AlreadyExists` instead of an error when the
    /// checkout session already has an order.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the order number collides
    /// - `DatabaseError` on persistence failure
    async fn create(&self, order: &Order) -> Result<SaveResult, DomainError>;

    /// Find the order recorded for a checkout session.
    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError>;
}
