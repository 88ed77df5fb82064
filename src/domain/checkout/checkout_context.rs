//! Typed view of a completed checkout session.
//!
//! Built once, right after signature verification. Downstream components
//! receive a `ResolvedCheckoutContext` and never look at the raw metadata
//! bag again.

use tracing::warn;

use super::stripe_event::{CheckoutSessionObject, Expandable, StripeEvent};
use super::webhook_errors::WebhookError;
use crate::domain::account::DEFAULT_CUSTOMER_NAME;
use crate::domain::foundation::{CourseId, Money, UserId, DEFAULT_CURRENCY};
use crate::domain::ordering::{BillingDetails, DEFAULT_BILLING_COUNTRY};

/// Metadata keys written by checkout session creation.
pub mod metadata_keys {
    pub const COURSE_ID: &str = "courseId";
    pub const COURSE_SLUG: &str = "courseSlug";
    pub const USER_ID: &str = "userId";
}

/// Everything the fulfillment pipeline needs from a completed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCheckoutContext {
    pub session_id: String,
    pub course_id: CourseId,
    pub course_slug: Option<String>,
    /// Account that started checkout, when it was signed in.
    pub user_id: Option<UserId>,
    pub customer_email: String,
    pub customer_name: String,
    /// Captured amount.
    pub amount: Money,
    pub payment_intent_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub billing_details: Option<BillingDetails>,
}

impl ResolvedCheckoutContext {
    /// Validates the data object of a `checkout.session.completed` event.
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let session: CheckoutSessionObject = event
            .deserialize_object()
            .map_err(|e| WebhookError::InvalidObject(e.to_string()))?;
        Self::from_session(session)
    }

    /// Validates a checkout session object.
    ///
    /// # Errors
    ///
    /// - `MissingMetadata("courseId")` when no course id was attached
    /// - `InvalidMetadata("courseId")` when it is not a valid id
    /// - `MissingField("customer_email")` when no payer email is present
    /// - `InvalidObject` when amount or currency are unusable
    pub fn from_session(session: CheckoutSessionObject) -> Result<Self, WebhookError> {
        let course_id = non_blank(session.metadata.get(metadata_keys::COURSE_ID))
            .ok_or(WebhookError::MissingMetadata(metadata_keys::COURSE_ID))?
            .parse::<CourseId>()
            .map_err(|_| WebhookError::InvalidMetadata(metadata_keys::COURSE_ID))?;

        let course_slug = non_blank(session.metadata.get(metadata_keys::COURSE_SLUG));

        let user_id = non_blank(session.metadata.get(metadata_keys::USER_ID)).and_then(|raw| {
            match raw.parse::<UserId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(session_id = %session.id, user_id = %raw, "Ignoring unparseable userId metadata");
                    None
                }
            }
        });

        let details = session.customer_details.clone().unwrap_or_default();

        let customer_email = non_blank(session.customer_email.as_ref())
            .or_else(|| non_blank(details.email.as_ref()))
            .ok_or(WebhookError::MissingField("customer_email"))?;

        let customer_name = non_blank(details.name.as_ref())
            .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());

        let currency = non_blank(session.currency.as_ref())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let amount = Money::from_minor(session.amount_total.unwrap_or(0), &currency)
            .map_err(|e| WebhookError::InvalidObject(e.to_string()))?;

        let billing_details = session.customer_details.as_ref().map(|details| {
            let address = details.address.clone().unwrap_or_default();
            BillingDetails {
                name: details.name.clone().unwrap_or_default(),
                address: address.line1.unwrap_or_default(),
                city: address.city.unwrap_or_default(),
                postal_code: address.postal_code.unwrap_or_default(),
                country: non_blank(address.country.as_ref())
                    .unwrap_or_else(|| DEFAULT_BILLING_COUNTRY.to_string()),
                ico: None,
                dic: None,
            }
        });

        Ok(Self {
            course_id,
            course_slug,
            user_id,
            customer_email,
            customer_name,
            amount,
            payment_intent_id: session.payment_intent.as_ref().map(|p| p.id().to_string()),
            stripe_customer_id: session.customer.as_ref().map(Expandable::id).map(str::to_string),
            billing_details,
            session_id: session.id,
        })
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
