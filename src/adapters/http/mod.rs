//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the storefront routes behind the session middleware.

pub mod middleware;
pub mod storefront;

use axum::Router;

pub use middleware::{auth_middleware, AuthState, OptionalAuth};
pub use storefront::{storefront_router, StorefrontAppState};

/// Storefront router with session resolution applied to every route.
///
/// The webhook route passes through the middleware too; it carries no
/// session token, so it is always handled anonymously.
pub fn app_router(state: StorefrontAppState, auth: AuthState) -> Router {
    storefront_router()
        .layer(axum::middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state)
}
