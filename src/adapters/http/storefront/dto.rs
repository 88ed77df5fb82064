//! HTTP DTOs for storefront endpoints.
//!
//! JSON field names follow the storefront frontend (camelCase).

use serde::{Deserialize, Serialize};

use crate::application::handlers::LessonAccessOutcome;
use crate::domain::access::AccessGrant;
use crate::domain::catalog::{Lesson, LessonCoordinate};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a checkout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Missing and blank are reported the same way.
    #[serde(default)]
    pub course_slug: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Hosted page the browser is sent to (checkout or billing portal).
#[derive(Debug, Clone, Serialize)]
pub struct RedirectUrlResponse {
    pub url: String,
}

/// Acknowledgement for a processed webhook delivery.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

impl WebhookAckResponse {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Lesson content returned to a viewer with access.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonView {
    pub title: String,
    pub description: Option<String>,
    pub video_id: Option<String>,
    pub duration: Option<String>,
    pub is_free: bool,
}

impl From<Lesson> for LessonView {
    fn from(lesson: Lesson) -> Self {
        Self {
            title: lesson.title,
            description: lesson.description,
            video_id: lesson.video_id,
            duration: lesson.duration,
            is_free: lesson.is_free,
        }
    }
}

/// Response for an allowed lesson request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonAccessResponse {
    pub course_slug: String,
    pub module_index: usize,
    pub lesson_index: usize,
    /// Why access was granted.
    pub access: AccessGrant,
    pub lesson: LessonView,
}

impl LessonAccessResponse {
    /// Builds the body for an allowed outcome; denials are redirects instead.
    pub fn from_outcome(course_slug: &str, outcome: LessonAccessOutcome) -> Option<Self> {
        match outcome {
            LessonAccessOutcome::Allowed {
                grant,
                lesson,
                coordinate: LessonCoordinate {
                    module_index,
                    lesson_index,
                },
            } => Some(Self {
                course_slug: course_slug.to_string(),
                module_index,
                lesson_index,
                access: grant,
                lesson: LessonView::from(lesson),
            }),
            LessonAccessOutcome::Denied { .. } => None,
        }
    }
}

/// Error body: `{"error": "..."}` with optional details.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
