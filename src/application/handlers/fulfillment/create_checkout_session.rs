//! CreateCheckoutSessionHandler - Starts a hosted checkout for one course.

use std::sync::Arc;

use tracing::info;

use super::errors::CheckoutSessionError;
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::{CourseRepository, CreateCheckoutRequest, PaymentProvider, UserRepository};

/// Placeholder Stripe substitutes with the real session id on redirect.
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Command to start a checkout.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub viewer: AuthenticatedUser,
    pub course_slug: String,
}

/// Result of starting a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    /// Hosted checkout page the customer is sent to.
    pub url: String,
}

/// Handler for starting checkouts.
pub struct CreateCheckoutSessionHandler {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    public_url: String,
    locale: String,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        public_url: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            users,
            courses,
            payment_provider,
            public_url: public_url.into(),
            locale: locale.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, CheckoutSessionError> {
        let slug = cmd.course_slug.trim();
        if slug.is_empty() {
            return Err(CheckoutSessionError::MissingCourseSlug);
        }

        let course = self
            .courses
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| CheckoutSessionError::CourseNotFound(slug.to_string()))?;

        let price_id = course
            .payment_price_id()
            .ok_or_else(|| CheckoutSessionError::PriceNotConfigured(course.slug.clone()))?
            .to_string();

        // Ownership comes from the stored record, not the token
        let user = self
            .users
            .find_by_id(&cmd.viewer.id)
            .await?
            .ok_or(CheckoutSessionError::UserNotFound)?;

        if user.owns_course(&course.id) {
            return Err(CheckoutSessionError::AlreadyOwned(course.slug));
        }

        let course_page = format!("{}/kurzy/{}", self.public_url, course.slug);
        let session = self
            .payment_provider
            .create_checkout_session(CreateCheckoutRequest {
                price_id,
                customer_email: user.email.clone(),
                course_id: course.id,
                course_slug: course.slug.clone(),
                user_id: user.id,
                success_url: format!(
                    "{}?success=true&session_id={}",
                    course_page, SESSION_ID_PLACEHOLDER
                ),
                cancel_url: format!("{}?canceled=true", course_page),
                locale: self.locale.clone(),
                allow_promotion_codes: true,
            })
            .await?;

        info!(user_id = %user.id, course_id = %course.id, session_id = %session.id, "Checkout session created");

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            url: session.url,
        })
    }
}
