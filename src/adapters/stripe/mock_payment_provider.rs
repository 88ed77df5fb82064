//! Mock payment provider for testing.
//!
//! Provides a configurable `PaymentProvider` for handler and HTTP tests:
//! - Canned checkout and portal sessions
//! - Error injection per method
//! - Call tracking, including the last checkout request
//! - Real webhook signature verification against a test secret

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::checkout::{StripeEvent, StripeWebhookVerifier, WebhookError};
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider, PortalSession,
};

/// Webhook secret used when none is supplied.
pub const MOCK_WEBHOOK_SECRET: &str = "whsec_mock_secret";

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_method_error("create_checkout_session", PaymentError::network("down"));
///
/// let result = mock.create_checkout_session(request).await;
/// assert!(result.is_err());
/// ```
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
    verifier: Arc<StripeWebhookVerifier>,
}

#[derive(Default)]
struct MockState {
    next_checkout: Option<CheckoutSession>,
    next_portal: Option<PortalSession>,
    method_errors: HashMap<String, PaymentError>,
    call_log: Vec<MethodCall>,
    checkout_requests: Vec<CreateCheckoutRequest>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::with_webhook_secret(MOCK_WEBHOOK_SECRET)
    }
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that verifies webhooks against the given secret.
    pub fn with_webhook_secret(secret: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState::default())),
            verifier: Arc::new(StripeWebhookVerifier::new(secret)),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the checkout session to return.
    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.inner.lock().unwrap().next_checkout = Some(session);
    }

    /// Set the portal session to return.
    pub fn set_portal_session(&self, session: PortalSession) {
        self.inner.lock().unwrap().next_portal = Some(session);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// The most recent checkout request, if any.
    pub fn last_checkout_request(&self) -> Option<CreateCheckoutRequest> {
        self.inner.lock().unwrap().checkout_requests.last().cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        match self.inner.lock().unwrap().method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Clone for MockPaymentProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![request.price_id.clone(), request.course_slug.clone()],
        );
        self.check_error("create_checkout_session")?;

        let mut state = self.inner.lock().unwrap();
        state.checkout_requests.push(request.clone());

        Ok(state.next_checkout.clone().unwrap_or_else(|| CheckoutSession {
            id: "cs_test_mock".to_string(),
            url: format!("https://checkout.stripe.com/c/pay/cs_test_mock#{}", request.course_slug),
        }))
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        self.record_call(
            "create_portal_session",
            vec![customer_id.to_string(), return_url.to_string()],
        );
        self.check_error("create_portal_session")?;

        let state = self.inner.lock().unwrap();
        Ok(state.next_portal.clone().unwrap_or_else(|| PortalSession {
            id: "bps_test_mock".to_string(),
            url: "https://billing.stripe.com/p/session/test_mock".to_string(),
        }))
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<StripeEvent, WebhookError> {
        self.record_call("verify_webhook", vec![signature.to_string()]);
        self.verifier.verify_and_parse(payload, signature)
    }
}
