//! RecordOrderHandler - Writes the receipt for a completed checkout.
//!
//! One order per checkout session. Redelivery of the same session returns
//! the order number of the receipt written the first time.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::ordering::{Order, OrderNumber, PaidOrder};
use crate::ports::{OrderRepository, SaveResult};

/// Attempts before giving up on order-number collisions.
const MAX_NUMBER_ATTEMPTS: usize = 3;

/// Command to record a paid order.
#[derive(Debug, Clone)]
pub struct RecordOrderCommand {
    pub order: PaidOrder,
}

/// Result of recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOrderResult {
    pub order_number: OrderNumber,
    /// False when the session already had an order.
    pub created: bool,
}

/// Handler for recording orders.
pub struct RecordOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl RecordOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub async fn handle(&self, cmd: RecordOrderCommand) -> Result<RecordOrderResult, DomainError> {
        let session_id = cmd.order.stripe_checkout_session_id.clone();

        if let Some(existing) = self.orders.find_by_checkout_session(&session_id).await? {
            info!(session_id = %session_id, order_number = %existing.order_number, "Order already recorded");
            return Ok(RecordOrderResult {
                order_number: existing.order_number,
                created: false,
            });
        }

        let mut attempt = 1;
        loop {
            let order = Order::paid(cmd.order.clone());

            match self.orders.create(&order).await {
                Ok(SaveResult::Inserted) => {
                    info!(
                        session_id = %session_id,
                        order_number = %order.order_number,
                        total = %order.total,
                        "Order recorded"
                    );
                    return Ok(RecordOrderResult {
                        order_number: order.order_number,
                        created: true,
                    });
                }
                Ok(SaveResult::AlreadyExists) => return self.existing(&session_id).await,
                Err(e) if e.code == ErrorCode::AlreadyExists && attempt < MAX_NUMBER_ATTEMPTS => {
                    warn!(order_number = %order.order_number, attempt, "Order number collision, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads back the order a concurrent delivery wrote for the session.
    async fn existing(&self, session_id: &str) -> Result<RecordOrderResult, DomainError> {
        let order = self
            .orders
            .find_by_checkout_session(session_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OrderNotFound,
                    format!("Order for session {} vanished after conflict", session_id),
                )
            })?;

        Ok(RecordOrderResult {
            order_number: order.order_number,
            created: false,
        })
    }
}
