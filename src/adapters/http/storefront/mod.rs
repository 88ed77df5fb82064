//! HTTP adapter for storefront endpoints.
//!
//! Exposes purchase fulfillment and course content via REST API:
//! - `POST /api/stripe/checkout` - Start a hosted checkout for one course
//! - `POST /api/stripe/portal` - Get the billing portal URL
//! - `POST /api/stripe/webhook` - Handle Stripe webhooks
//! - `GET /api/courses/:slug/lessons/:module/:lesson` - Lesson content or redirect
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{ApiError, StorefrontAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::{course_routes, storefront_router, stripe_routes};
