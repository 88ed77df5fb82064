//! Best-effort notification port.
//!
//! Callers log a `NotifyError` and carry on. A failed email never undoes an
//! entitlement or an order.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{CourseId, Money, UserId};

/// Kind of notification, used for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    PurchaseConfirmation,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Welcome => "welcome",
            NotificationKind::PurchaseConfirmation => "purchase_confirmation",
        };
        write!(f, "{}", s)
    }
}

/// A notification with its payload.
#[derive(Clone, PartialEq)]
pub enum Notification {
    /// Credentials for an account provisioned during checkout.
    Welcome {
        email: String,
        name: String,
        temporary_password: String,
        login_url: String,
    },
    /// Receipt for a completed purchase.
    PurchaseConfirmation {
        email: String,
        name: String,
        course_id: CourseId,
        course_title: String,
        course_url: String,
        user_id: UserId,
        order_number: String,
        amount: Money,
    },
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Welcome { .. } => NotificationKind::Welcome,
            Notification::PurchaseConfirmation { .. } => NotificationKind::PurchaseConfirmation,
        }
    }

    /// Recipient address.
    pub fn recipient(&self) -> &str {
        match self {
            Notification::Welcome { email, .. } | Notification::PurchaseConfirmation { email, .. } => {
                email
            }
        }
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("kind", &self.kind())
            .field("recipient", &self.recipient())
            .finish_non_exhaustive()
    }
}

/// Errors from notification delivery.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Notification rejected by provider ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
