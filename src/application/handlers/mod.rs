//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod fulfillment;

pub use fulfillment::{
    // Webhook pipeline
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
    ResolveIdentityCommand, ResolveIdentityHandler, ResolvedIdentity,
    GrantEntitlementCommand, GrantEntitlementHandler, GrantOutcome,
    RecordOrderCommand, RecordOrderHandler, RecordOrderResult,
    DispatchNotificationsCommand, DispatchNotificationsHandler, DispatchReport,
    // Storefront
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreatePortalSessionResult,
    CheckLessonAccessHandler, CheckLessonAccessQuery, LessonAccessOutcome,
    // Errors
    CheckoutSessionError, LessonAccessError, PortalSessionError,
};
