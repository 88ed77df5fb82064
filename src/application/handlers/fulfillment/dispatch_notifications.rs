//! DispatchNotificationsHandler - Sends the emails that follow a purchase.
//!
//! Both sends are best-effort and independent of each other. Failures are
//! logged and never returned, so a mail outage cannot undo a grant.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::account::{TemporaryPassword, User};
use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, Money};
use crate::domain::ordering::OrderNumber;
use crate::ports::{Notification, NotificationKind, Notifier};

/// Shown in the confirmation when the order could not be recorded.
pub const MISSING_ORDER_NUMBER: &str = "N/A";

/// Command to send post-purchase emails.
#[derive(Debug, Clone)]
pub struct DispatchNotificationsCommand {
    pub user: User,
    pub temporary_password: Option<TemporaryPassword>,
    /// Payer email from the checkout; recipient of both messages.
    pub email: String,
    /// Payer name from the checkout, used when the account has no first name.
    pub payer_name: String,
    pub course_id: CourseId,
    /// None when the course record could not be loaded.
    pub course: Option<Course>,
    pub order_number: Option<OrderNumber>,
    pub amount: Money,
}

/// Which notifications went out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: Vec<NotificationKind>,
    pub failed: Vec<NotificationKind>,
}

/// Handler for post-purchase notifications.
pub struct DispatchNotificationsHandler {
    notifier: Arc<dyn Notifier>,
    public_url: String,
}

impl DispatchNotificationsHandler {
    /// `public_url` is the storefront origin without a trailing slash.
    pub fn new(notifier: Arc<dyn Notifier>, public_url: impl Into<String>) -> Self {
        Self {
            notifier,
            public_url: public_url.into(),
        }
    }

    pub async fn handle(&self, cmd: DispatchNotificationsCommand) -> DispatchReport {
        let mut report = DispatchReport::default();
        let name = cmd.user.greeting_name(&cmd.payer_name).to_string();

        if let Some(password) = &cmd.temporary_password {
            let welcome = Notification::Welcome {
                email: cmd.email.clone(),
                name: name.clone(),
                temporary_password: password.expose().to_string(),
                login_url: format!("{}/prihlasenie", self.public_url),
            };
            self.send(&welcome, &mut report).await;
        }

        let (course_title, course_url) = match &cmd.course {
            Some(course) => (
                course.title.clone(),
                format!("{}/kurzy/{}", self.public_url, course.slug),
            ),
            None => (cmd.course_id.to_string(), format!("{}/kurzy", self.public_url)),
        };

        let confirmation = Notification::PurchaseConfirmation {
            email: cmd.email,
            name,
            course_id: cmd.course_id,
            course_title,
            course_url,
            user_id: cmd.user.id,
            order_number: cmd
                .order_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| MISSING_ORDER_NUMBER.to_string()),
            amount: cmd.amount,
        };
        self.send(&confirmation, &mut report).await;

        report
    }

    async fn send(&self, notification: &Notification, report: &mut DispatchReport) {
        let kind = notification.kind();
        match self.notifier.send(notification).await {
            Ok(()) => {
                info!(kind = %kind, to = %notification.recipient(), "Notification sent");
                report.sent.push(kind);
            }
            Err(e) => {
                warn!(kind = %kind, to = %notification.recipient(), error = %e, "Notification failed");
                report.failed.push(kind);
            }
        }
    }
}
