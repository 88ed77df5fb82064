//! Order aggregate: the receipt for one completed checkout.
//!
//! Orders are created once by the fulfillment pipeline with status `paid`
//! and are not mutated afterwards by it.

use serde::{Deserialize, Serialize};

use super::OrderNumber;
use crate::domain::foundation::{CourseId, Money, OrderId, Timestamp, UserId};

/// Country used when the payer's address has none.
pub const DEFAULT_BILLING_COUNTRY: &str = "SK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "cancelled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }
}

/// Billing address snapshot taken at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingDetails {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// Company registration number.
    #[serde(default)]
    pub ico: Option<String>,
    /// Tax id.
    #[serde(default)]
    pub dic: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer: UserId,
    /// Email at purchase time; may later differ from the account's.
    pub customer_email: String,
    pub course: CourseId,
    pub total: Money,
    pub discount_minor: i64,
    pub status: OrderStatus,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_checkout_session_id: String,
    pub billing_details: Option<BillingDetails>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// Inputs for a paid order.
#[derive(Debug, Clone)]
pub struct PaidOrder {
    pub customer: UserId,
    pub customer_email: String,
    pub course: CourseId,
    pub total: Money,
    pub stripe_checkout_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub billing_details: Option<BillingDetails>,
}

impl Order {
    /// Creates a paid order with a freshly generated number.
    pub fn paid(input: PaidOrder) -> Self {
        let now = Timestamp::now();
        Self {
            id: OrderId::new(),
            order_number: OrderNumber::generate(&now),
            customer: input.customer,
            customer_email: input.customer_email,
            course: input.course,
            total: input.total,
            discount_minor: 0,
            status: OrderStatus::Paid,
            stripe_payment_intent_id: input.stripe_payment_intent_id,
            stripe_checkout_session_id: input.stripe_checkout_session_id,
            billing_details: input.billing_details,
            notes: None,
            created_at: now,
        }
    }
}
