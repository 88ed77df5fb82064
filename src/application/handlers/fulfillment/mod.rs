//! Fulfillment handlers - purchase to access.
//!
//! `HandleCheckoutWebhookHandler` orchestrates the webhook pipeline from the
//! step handlers below. The checkout, portal and lesson-access handlers serve
//! the signed-in storefront.

mod check_lesson_access;
mod create_checkout_session;
mod create_portal_session;
mod dispatch_notifications;
mod errors;
mod grant_entitlement;
mod handle_checkout_webhook;
mod record_order;
mod resolve_identity;

#[cfg(test)]
pub(crate) mod test_support;

pub use check_lesson_access::{
    CheckLessonAccessHandler, CheckLessonAccessQuery, LessonAccessOutcome,
};
pub use create_checkout_session::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
};
pub use create_portal_session::{
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreatePortalSessionResult,
};
pub use dispatch_notifications::{
    DispatchNotificationsCommand, DispatchNotificationsHandler, DispatchReport,
    MISSING_ORDER_NUMBER,
};
pub use errors::{CheckoutSessionError, LessonAccessError, PortalSessionError};
pub use grant_entitlement::{GrantEntitlementCommand, GrantEntitlementHandler, GrantOutcome};
pub use handle_checkout_webhook::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
};
pub use record_order::{RecordOrderCommand, RecordOrderHandler, RecordOrderResult};
pub use resolve_identity::{ResolveIdentityCommand, ResolveIdentityHandler, ResolvedIdentity};
