//! Email notification adapters.
//!
//! - `ResendNotifier` - delivery through the Resend API
//! - `LoggingNotifier` - used when no API key is configured
//! - `RecordingNotifier` - in-memory capture for tests

mod logging;
mod message;
mod resend;

pub use logging::{LoggingNotifier, RecordingNotifier};
pub use message::{compose, ComposedEmail, BRAND_NAME};
pub use resend::{ResendConfig, ResendNotifier, DEFAULT_RESEND_API_BASE};
