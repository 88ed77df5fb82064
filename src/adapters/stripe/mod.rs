//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration, including:
//! - Hosted checkout sessions for single-course purchases
//! - Billing portal sessions
//! - Webhook signature verification
//!
//! # Configuration
//!
//! Required environment variables:
//! - `COURSE_ACADEMY__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `COURSE_ACADEMY__PAYMENT__STRIPE_WEBHOOK_SECRET`: Webhook signing secret (whsec_...)

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider, MOCK_WEBHOOK_SECRET};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter, DEFAULT_STRIPE_API_BASE};
