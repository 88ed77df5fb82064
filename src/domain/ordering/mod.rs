//! Ordering module - purchase receipts.

mod order;
mod order_number;

pub use order::{BillingDetails, Order, OrderStatus, PaidOrder, DEFAULT_BILLING_COUNTRY};
pub use order_number::{OrderNumber, ORDER_NUMBER_PREFIX};
