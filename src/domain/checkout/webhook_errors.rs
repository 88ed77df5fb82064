//! Webhook error types for Stripe webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping. Stripe retries any delivery answered with
//! a 5xx, so only transient failures may map there.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata key missing from the checkout session.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// Metadata key present but unusable.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(&'static str),

    /// Required field missing from the checkout session.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Event object present but not shaped as expected.
    #[error("Invalid event object: {0}")]
    InvalidObject(String),

    /// Store or other downstream failure while fulfilling the purchase.
    #[error("Fulfillment failed: {0}")]
    Fulfillment(String),
}

impl WebhookError {
    /// True when the delivery could not be authenticated.
    pub fn is_authenticity_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// True for events that are authentic but permanently unusable.
    ///
    /// These are acknowledged so Stripe stops redelivering them.
    pub fn is_malformed_event(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingMetadata(_)
                | WebhookError::InvalidMetadata(_)
                | WebhookError::MissingField(_)
                | WebhookError::InvalidObject(_)
        )
    }

    /// Returns true if Stripe should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Fulfillment(_))
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Rejected, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::MissingMetadata(_)
            | WebhookError::InvalidMetadata(_)
            | WebhookError::MissingField(_)
            | WebhookError::InvalidObject(_) => StatusCode::OK,

            WebhookError::Fulfillment(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Fulfillment(err.to_string())
    }
}
