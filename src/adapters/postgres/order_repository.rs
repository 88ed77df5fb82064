//! PostgreSQL implementation of OrderRepository.
//!
//! A unique constraint on `stripe_checkout_session_id` makes the insert
//! idempotent per checkout session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, Money, OrderId, Timestamp, UserId};
use crate::domain::ordering::{BillingDetails, Order, OrderNumber, OrderStatus};
use crate::ports::{OrderRepository, SaveResult};

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    customer_email: String,
    course_id: Uuid,
    total_cents: i64,
    currency: String,
    discount_cents: i64,
    status: String,
    stripe_payment_intent_id: Option<String>,
    stripe_checkout_session_id: String,
    billing_name: Option<String>,
    billing_address: Option<String>,
    billing_city: Option<String>,
    billing_postal_code: Option<String>,
    billing_country: Option<String>,
    billing_ico: Option<String>,
    billing_dic: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let invalid = |e: String| DomainError::new(ErrorCode::DatabaseError, e);

        let order_number = OrderNumber::parse(&row.order_number)
            .map_err(|e| invalid(format!("Invalid order number: {}", e)))?;
        let total = Money::from_minor(row.total_cents, row.currency.trim())
            .map_err(|e| invalid(format!("Invalid order total: {}", e)))?;
        let status = OrderStatus::parse(&row.status)
            .ok_or_else(|| invalid(format!("Invalid order status value: {}", row.status)))?;

        let billing_details = row.billing_name.map(|name| BillingDetails {
            name,
            address: row.billing_address.unwrap_or_default(),
            city: row.billing_city.unwrap_or_default(),
            postal_code: row.billing_postal_code.unwrap_or_default(),
            country: row.billing_country.unwrap_or_default(),
            ico: row.billing_ico,
            dic: row.billing_dic,
        });

        Ok(Order {
            id: OrderId::from_uuid(row.id),
            order_number,
            customer: UserId::from_uuid(row.customer_id),
            customer_email: row.customer_email,
            course: CourseId::from_uuid(row.course_id),
            total,
            discount_minor: row.discount_cents,
            status,
            stripe_payment_intent_id: row.stripe_payment_intent_id,
            stripe_checkout_session_id: row.stripe_checkout_session_id,
            billing_details,
            notes: row.notes,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> Result<SaveResult, DomainError> {
        let billing = order.billing_details.as_ref();

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_id, customer_email, course_id, total_cents,
                currency, discount_cents, status, stripe_payment_intent_id,
                stripe_checkout_session_id, billing_name, billing_address, billing_city,
                billing_postal_code, billing_country, billing_ico, billing_dic, notes, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            ON CONFLICT (stripe_checkout_session_id) DO NOTHING
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.order_number.as_str())
        .bind(order.customer.as_uuid())
        .bind(&order.customer_email)
        .bind(order.course.as_uuid())
        .bind(order.total.amount_minor())
        .bind(order.total.currency())
        .bind(order.discount_minor)
        .bind(order.status.as_str())
        .bind(&order.stripe_payment_intent_id)
        .bind(&order.stripe_checkout_session_id)
        .bind(billing.map(|b| b.name.as_str()))
        .bind(billing.map(|b| b.address.as_str()))
        .bind(billing.map(|b| b.city.as_str()))
        .bind(billing.map(|b| b.postal_code.as_str()))
        .bind(billing.map(|b| b.country.as_str()))
        .bind(billing.and_then(|b| b.ico.as_deref()))
        .bind(billing.and_then(|b| b.dic.as_deref()))
        .bind(&order.notes)
        .bind(order.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("orders_order_number_key") {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        format!("Order number {} already exists", order.order_number),
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save order: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Ok(SaveResult::AlreadyExists);
        }
        Ok(SaveResult::Inserted)
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, order_number, customer_id, customer_email, course_id, total_cents,
                   currency, discount_cents, status, stripe_payment_intent_id,
                   stripe_checkout_session_id, billing_name, billing_address, billing_city,
                   billing_postal_code, billing_country, billing_ico, billing_dic, notes,
                   created_at
            FROM orders
            WHERE stripe_checkout_session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }
}
