//! Axum router configuration for storefront endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, create_portal, get_lesson, handle_stripe_webhook, health, StorefrontAppState,
};

/// Payment routes, mounted under `/api/stripe`.
///
/// - `POST /checkout` - Start a hosted checkout (requires a viewer)
/// - `POST /portal` - Open the billing portal (requires a viewer)
/// - `POST /webhook` - Stripe deliveries, authenticated by signature only
pub fn stripe_routes() -> Router<StorefrontAppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/portal", post(create_portal))
        .route("/webhook", post(handle_stripe_webhook))
}

/// Course content routes, mounted under `/api/courses`.
pub fn course_routes() -> Router<StorefrontAppState> {
    Router::new().route("/:slug/lessons/:module/:lesson", get(get_lesson))
}

/// Complete storefront router.
///
/// ```ignore
/// let app = storefront_router()
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
///     .with_state(app_state);
/// ```
pub fn storefront_router() -> Router<StorefrontAppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/stripe", stripe_routes())
        .nest("/api/courses", course_routes())
}
