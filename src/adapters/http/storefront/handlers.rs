//! HTTP handlers for storefront endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{error, warn};

use crate::adapters::http::middleware::OptionalAuth;
use crate::application::handlers::{
    CheckLessonAccessHandler, CheckLessonAccessQuery, CheckoutSessionError,
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreatePortalSessionCommand,
    CreatePortalSessionHandler, HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler,
    LessonAccessError, LessonAccessOutcome, PortalSessionError,
};
use crate::domain::catalog::LessonCoordinate;
use crate::domain::checkout::WebhookError;
use crate::ports::{
    CourseRepository, CredentialHasher, Notifier, OrderRepository, PaymentProvider,
    UserRepository,
};

use super::dto::{
    CheckoutRequest, ErrorResponse, LessonAccessResponse, RedirectUrlResponse, WebhookAckResponse,
};

/// Header carrying the webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct StorefrontAppState {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub notifier: Arc<dyn Notifier>,
    /// Storefront origin without trailing slash.
    pub public_url: String,
    pub checkout_locale: String,
}

impl StorefrontAppState {
    pub fn webhook_handler(&self) -> HandleCheckoutWebhookHandler {
        HandleCheckoutWebhookHandler::new(
            self.payment_provider.clone(),
            self.users.clone(),
            self.courses.clone(),
            self.orders.clone(),
            self.hasher.clone(),
            self.notifier.clone(),
            self.public_url.clone(),
        )
    }

    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.users.clone(),
            self.courses.clone(),
            self.payment_provider.clone(),
            self.public_url.clone(),
            self.checkout_locale.clone(),
        )
    }

    pub fn portal_handler(&self) -> CreatePortalSessionHandler {
        CreatePortalSessionHandler::new(
            self.users.clone(),
            self.payment_provider.clone(),
            self.public_url.clone(),
        )
    }

    pub fn lesson_access_handler(&self) -> CheckLessonAccessHandler {
        CheckLessonAccessHandler::new(self.users.clone(), self.courses.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/stripe/webhook - Fulfil a completed checkout
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<StorefrontAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook delivery without signature header");
            ApiError::bad_request("Chýba Stripe signature")
        })?;

    let cmd = HandleCheckoutWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(_) => {}
        Err(e) if e.is_malformed_event() => {
            warn!(error = %e, "Acknowledging unusable webhook event");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(WebhookAckResponse::received()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout and billing portal
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/stripe/checkout - Start a hosted checkout for one course
pub async fn create_checkout(
    State(state): State<StorefrontAppState>,
    OptionalAuth(viewer): OptionalAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = viewer.ok_or_else(|| ApiError::unauthorized("Pre nákup sa musíte prihlásiť"))?;

    let cmd = CreateCheckoutSessionCommand {
        viewer,
        course_slug: request.course_slug.unwrap_or_default(),
    };

    let result = state.checkout_handler().handle(cmd).await?;

    Ok(Json(RedirectUrlResponse { url: result.url }))
}

/// POST /api/stripe/portal - Open the billing portal
pub async fn create_portal(
    State(state): State<StorefrontAppState>,
    OptionalAuth(viewer): OptionalAuth,
) -> Result<impl IntoResponse, ApiError> {
    let viewer = viewer.ok_or_else(|| ApiError::unauthorized("Pre prístup sa musíte prihlásiť"))?;

    let result = state
        .portal_handler()
        .handle(CreatePortalSessionCommand { user_id: viewer.id })
        .await?;

    Ok(Json(RedirectUrlResponse { url: result.url }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Lesson access
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/courses/:slug/lessons/:module/:lesson - Lesson content or purchase redirect
pub async fn get_lesson(
    State(state): State<StorefrontAppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path((slug, module_index, lesson_index)): Path<(String, usize, usize)>,
) -> Result<Response, ApiError> {
    let query = CheckLessonAccessQuery {
        viewer: viewer.map(|v| v.id),
        course_slug: slug.clone(),
        coordinate: LessonCoordinate::new(module_index, lesson_index),
    };

    let outcome = state.lesson_access_handler().handle(query).await?;

    match outcome {
        LessonAccessOutcome::Denied { redirect_to, .. } => {
            Ok(Redirect::to(&redirect_to).into_response())
        }
        allowed => Ok(Json(LessonAccessResponse::from_outcome(&slug, allowed)).into_response()),
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error carrying the status and the JSON body to send.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorResponse) -> Self {
        Self { status, body }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorResponse::new(message))
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorResponse::new(message))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            error!(error = %err, "Webhook processing failed");
            return Self::new(
                status,
                ErrorResponse::with_details("Webhook handler failed", err.to_string()),
            );
        }
        warn!(error = %err, "Webhook rejected");
        Self::new(status, ErrorResponse::new("Neplatná signature"))
    }
}

impl From<CheckoutSessionError> for ApiError {
    fn from(err: CheckoutSessionError) -> Self {
        let status = match &err {
            CheckoutSessionError::MissingCourseSlug
            | CheckoutSessionError::PriceNotConfigured(_)
            | CheckoutSessionError::AlreadyOwned(_) => StatusCode::BAD_REQUEST,
            CheckoutSessionError::CourseNotFound(_) => StatusCode::NOT_FOUND,
            CheckoutSessionError::UserNotFound => StatusCode::UNAUTHORIZED,
            CheckoutSessionError::Provider(_) | CheckoutSessionError::Store(_) => {
                error!(error = %err, "Checkout session creation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, ErrorResponse::new(err.user_message()))
    }
}

impl From<PortalSessionError> for ApiError {
    fn from(err: PortalSessionError) -> Self {
        let status = match &err {
            PortalSessionError::UserNotFound => StatusCode::NOT_FOUND,
            PortalSessionError::NoPaymentCustomer => StatusCode::BAD_REQUEST,
            PortalSessionError::Provider(_) | PortalSessionError::Store(_) => {
                error!(error = %err, "Billing portal session creation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, ErrorResponse::new(err.user_message()))
    }
}

impl From<LessonAccessError> for ApiError {
    fn from(err: LessonAccessError) -> Self {
        let status = match &err {
            LessonAccessError::CourseNotFound(_) | LessonAccessError::LessonNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            LessonAccessError::Store(_) => {
                error!(error = %err, "Lesson access check failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, ErrorResponse::new(err.user_message()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
