//! HandleCheckoutWebhookHandler - Turns a verified Stripe delivery into access.
//!
//! Pipeline for `checkout.session.completed`:
//! verify -> resolve context -> resolve identity -> grant -> record order -> notify.
//!
//! Only the grant is load-bearing. If it fails the delivery is answered with
//! a 5xx so Stripe retries; the order and emails are best-effort and every
//! step is safe to repeat.

use std::sync::Arc;

use tracing::{info, warn};

use super::dispatch_notifications::{DispatchNotificationsCommand, DispatchNotificationsHandler};
use super::grant_entitlement::{GrantEntitlementCommand, GrantEntitlementHandler};
use super::record_order::{RecordOrderCommand, RecordOrderHandler};
use super::resolve_identity::{ResolveIdentityCommand, ResolveIdentityHandler};
use crate::domain::catalog::Course;
use crate::domain::checkout::{ResolvedCheckoutContext, StripeEvent, StripeEventType, WebhookError};
use crate::domain::foundation::{CourseId, UserId};
use crate::domain::ordering::{OrderNumber, PaidOrder};
use crate::ports::{
    CourseRepository, CredentialHasher, Notifier, OrderRepository, PaymentProvider,
    UserRepository,
};

/// Command to handle a webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// Result of webhook processing. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleCheckoutWebhookResult {
    /// Checkout completed and the buyer has access.
    Fulfilled {
        user_id: UserId,
        course_id: CourseId,
        /// None when the order could not be recorded.
        order_number: Option<OrderNumber>,
        new_account: bool,
        /// False when the course was already owned before this delivery.
        granted: bool,
    },
    /// Authentic but unusable checkout event; acknowledged so it is not redelivered.
    Skipped { reason: String },
    /// Known event type with no fulfillment action.
    Acknowledged,
    /// Event type the storefront does not handle.
    Ignored,
}

/// Handler for Stripe webhook deliveries.
pub struct HandleCheckoutWebhookHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    courses: Arc<dyn CourseRepository>,
    resolve_identity: ResolveIdentityHandler,
    grant_entitlement: GrantEntitlementHandler,
    record_order: RecordOrderHandler,
    dispatch_notifications: DispatchNotificationsHandler,
}

impl HandleCheckoutWebhookHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        orders: Arc<dyn OrderRepository>,
        hasher: Arc<dyn CredentialHasher>,
        notifier: Arc<dyn Notifier>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            payment_provider,
            courses,
            resolve_identity: ResolveIdentityHandler::new(users.clone(), hasher),
            grant_entitlement: GrantEntitlementHandler::new(users),
            record_order: RecordOrderHandler::new(orders),
            dispatch_notifications: DispatchNotificationsHandler::new(notifier, public_url),
        }
    }

    /// Processes one delivery.
    ///
    /// # Errors
    ///
    /// - Authenticity and parse failures (400); nothing is written
    /// - `Fulfillment` when identity resolution or the grant fails (500)
    pub async fn handle(
        &self,
        cmd: HandleCheckoutWebhookCommand,
    ) -> Result<HandleCheckoutWebhookResult, WebhookError> {
        // 1. Verify webhook signature and parse event
        let event = self
            .payment_provider
            .verify_webhook(&cmd.payload, &cmd.signature)?;

        info!(event_id = %event.id, event_type = %event.event_type, livemode = event.livemode, "Webhook verified");

        // 2. Process based on event type
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => self.handle_checkout_completed(&event).await,
            // Fulfillment is driven by the checkout session only
            StripeEventType::PaymentIntentSucceeded => {
                info!(event_id = %event.id, "Payment intent succeeded");
                Ok(HandleCheckoutWebhookResult::Acknowledged)
            }
            StripeEventType::PaymentIntentFailed => {
                warn!(event_id = %event.id, "Payment intent failed");
                Ok(HandleCheckoutWebhookResult::Acknowledged)
            }
            StripeEventType::Unknown => {
                info!(event_id = %event.id, event_type = %event.event_type, "Unhandled event type");
                Ok(HandleCheckoutWebhookResult::Ignored)
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<HandleCheckoutWebhookResult, WebhookError> {
        let ctx = match ResolvedCheckoutContext::from_event(event) {
            Ok(ctx) => ctx,
            Err(e) if e.is_malformed_event() => {
                warn!(event_id = %event.id, error = %e, "Skipping unusable checkout event");
                return Ok(HandleCheckoutWebhookResult::Skipped {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        // 3. Resolve the purchasing account
        let identity = self
            .resolve_identity
            .handle(ResolveIdentityCommand {
                course_id: ctx.course_id,
                user_id: ctx.user_id,
                customer_email: ctx.customer_email.clone(),
                customer_name: ctx.customer_name.clone(),
                stripe_customer_id: ctx.stripe_customer_id.clone(),
            })
            .await?;

        // 4. Grant the course; failure here must be retried by Stripe
        let outcome = self
            .grant_entitlement
            .handle(GrantEntitlementCommand {
                user: identity.user.clone(),
                is_new: identity.is_new,
                course_id: ctx.course_id,
                stripe_customer_id: ctx.stripe_customer_id.clone(),
            })
            .await?;

        // 5. Record the receipt
        let recorded = match self
            .record_order
            .handle(RecordOrderCommand {
                order: PaidOrder {
                    customer: identity.user.id,
                    customer_email: ctx.customer_email.clone(),
                    course: ctx.course_id,
                    total: ctx.amount.clone(),
                    stripe_checkout_session_id: ctx.session_id.clone(),
                    stripe_payment_intent_id: ctx.payment_intent_id.clone(),
                    billing_details: ctx.billing_details.clone(),
                },
            })
            .await
        {
            Ok(recorded) => Some(recorded),
            Err(e) => {
                warn!(session_id = %ctx.session_id, error = %e, "Order could not be recorded; access already granted");
                None
            }
        };
        let redelivered = recorded.as_ref().is_some_and(|r| !r.created);
        let order_number = recorded.map(|r| r.order_number);

        // 6. Notify once per checkout session
        if redelivered {
            info!(session_id = %ctx.session_id, "Order already recorded for session, skipping emails");
        } else {
            let course = self.load_course(&ctx.course_id).await;
            self.dispatch_notifications
                .handle(DispatchNotificationsCommand {
                    user: identity.user.clone(),
                    temporary_password: identity.temporary_password,
                    email: ctx.customer_email.clone(),
                    payer_name: ctx.customer_name.clone(),
                    course_id: ctx.course_id,
                    course,
                    order_number: order_number.clone(),
                    amount: ctx.amount.clone(),
                })
                .await;
        }

        info!(
            session_id = %ctx.session_id,
            user_id = %identity.user.id,
            course_id = %ctx.course_id,
            new_account = identity.is_new,
            "Checkout fulfilled"
        );

        Ok(HandleCheckoutWebhookResult::Fulfilled {
            user_id: identity.user.id,
            course_id: ctx.course_id,
            order_number,
            new_account: identity.is_new,
            granted: outcome.newly_granted(),
        })
    }

    async fn load_course(&self, course_id: &CourseId) -> Option<Course> {
        match self.courses.find_by_id(course_id).await {
            Ok(Some(course)) => Some(course),
            Ok(None) => {
                warn!(course_id = %course_id, "Purchased course not found for notification");
                None
            }
            Err(e) => {
                warn!(course_id = %course_id, error = %e, "Failed to load course for notification");
                None
            }
        }
    }
}
