//! Errors for the storefront-facing handlers.
//!
//! The webhook pipeline uses `WebhookError`; these cover the endpoints a
//! signed-in customer calls directly.

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::PaymentError;

/// Errors starting a hosted checkout.
#[derive(Debug, Error)]
pub enum CheckoutSessionError {
    #[error("Course slug is required")]
    MissingCourseSlug,

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Course {0} has no payment price configured")]
    PriceNotConfigured(String),

    #[error("User already owns course {0}")]
    AlreadyOwned(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Payment provider error: {0}")]
    Provider(#[from] PaymentError),

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl CheckoutSessionError {
    /// Message shown to the customer.
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckoutSessionError::MissingCourseSlug => "Chýba ID kurzu",
            CheckoutSessionError::CourseNotFound(_) => "Kurz neexistuje",
            CheckoutSessionError::PriceNotConfigured(_) => "Kurz nemá nastavenú cenu v Stripe",
            CheckoutSessionError::AlreadyOwned(_) => "Tento kurz už vlastníte",
            CheckoutSessionError::UserNotFound => "Pre nákup sa musíte prihlásiť",
            CheckoutSessionError::Provider(_) | CheckoutSessionError::Store(_) => {
                "Nastala chyba pri vytváraní platby"
            }
        }
    }
}

/// Errors opening the billing portal.
#[derive(Debug, Error)]
pub enum PortalSessionError {
    #[error("User not found")]
    UserNotFound,

    #[error("User has no payment customer reference")]
    NoPaymentCustomer,

    #[error("Payment provider error: {0}")]
    Provider(#[from] PaymentError),

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl PortalSessionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PortalSessionError::UserNotFound => "Používateľ neexistuje",
            PortalSessionError::NoPaymentCustomer => "Nemáte žiadne predchádzajúce platby",
            PortalSessionError::Provider(_) | PortalSessionError::Store(_) => {
                "Nastala chyba pri vytváraní platobného portálu"
            }
        }
    }
}

/// Errors checking lesson access. A denial is not an error.
#[derive(Debug, Error)]
pub enum LessonAccessError {
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Lesson {module}-{lesson} not found")]
    LessonNotFound { module: usize, lesson: usize },

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl LessonAccessError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LessonAccessError::CourseNotFound(_) => "Kurz neexistuje",
            LessonAccessError::LessonNotFound { .. } => "Lekcia neexistuje",
            LessonAccessError::Store(_) => "Nastala chyba pri načítaní lekcie",
        }
    }
}
