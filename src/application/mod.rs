//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Webhook fulfillment is write-side; lesson access is a read-side query.

pub mod handlers;

pub use handlers::{
    CheckLessonAccessHandler, CreateCheckoutSessionHandler, CreatePortalSessionHandler,
    HandleCheckoutWebhookHandler,
};
