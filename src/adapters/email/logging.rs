//! Notifiers that do not talk to an email provider.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::{Notification, NotificationKind, Notifier, NotifyError};

/// Logs each notification and reports success.
///
/// Wired in when no Resend key is configured. Credentials are never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            kind = %notification.kind(),
            recipient = %notification.recipient(),
            "Email delivery not configured, skipping"
        );
        Ok(())
    }
}

/// Records notifications in memory, optionally failing some kinds.
///
/// Used by tests to assert what would have been sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: Arc<Mutex<Vec<NotificationKind>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send of `kind` fail with a delivery error.
    pub fn fail_kind(&self, kind: NotificationKind) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(kind);
    }

    /// Notifications that were delivered successfully.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent_kinds(&self) -> Vec<NotificationKind> {
        self.sent().iter().map(Notification::kind).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let failing = self.failing.lock().map_err(poisoned)?;
        if failing.contains(&notification.kind()) {
            return Err(NotifyError::Delivery("simulated failure".to_string()));
        }
        drop(failing);

        self.sent.lock().map_err(poisoned)?.push(notification.clone());
        Ok(())
    }
}

fn poisoned<T>(_: PoisonError<T>) -> NotifyError {
    NotifyError::Delivery("recorder lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn welcome() -> Notification {
        Notification::Welcome {
            email: "jana@example.com".to_string(),
            name: "Jana".to_string(),
            temporary_password: "pw".to_string(),
            login_url: "https://example.com/prihlasenie".to_string(),
        }
    }

    #[tokio::test]
    async fn logging_notifier_always_succeeds() {
        assert!(LoggingNotifier::new().send(&welcome()).await.is_ok());
    }

    #[tokio::test]
    async fn recording_notifier_fails_selected_kind() {
        let notifier = RecordingNotifier::new();
        notifier.fail_kind(NotificationKind::Welcome);

        assert!(notifier.send(&welcome()).await.is_err());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn recording_notifier_reports_poisoned_lock_as_delivery_error() {
        let notifier = RecordingNotifier::new();
        let sent = notifier.sent.clone();
        let _ = std::thread::spawn(move || {
            let _guard = sent.lock().unwrap();
            panic!("poison the recorder");
        })
        .join();

        let err = notifier.send(&welcome()).await.unwrap_err();

        assert!(matches!(err, NotifyError::Delivery(_)));
        assert!(notifier.sent().is_empty());
    }
}
