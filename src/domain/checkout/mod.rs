//! Checkout module - Stripe webhook verification and the typed checkout context.
//!
//! # Module Organization
//!
//! - `stripe_event` - Event envelope and checkout session payload
//! - `webhook_verifier` - HMAC-SHA256 signature verification
//! - `webhook_errors` - Error taxonomy with HTTP status mapping
//! - `checkout_context` - Validation step producing `ResolvedCheckoutContext`

mod checkout_context;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use checkout_context::{metadata_keys, ResolvedCheckoutContext};
pub use stripe_event::{
    CheckoutSessionObject, CustomerDetails, Expandable, StripeAddress, StripeEvent,
    StripeEventData, StripeEventType,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
