//! Lesson access rule.
//!
//! Evaluated on every content request against the freshly loaded user
//! record; nothing here is cached, so a purchase that just completed is
//! visible on the very next request.
//!
//! Rule, in order:
//! 1. Admins see everything.
//! 2. Owners of the course see every lesson in it.
//! 3. Anyone, signed in or not, sees a lesson flagged free. The flag is per
//!    lesson and never unlocks siblings.

use serde::{Deserialize, Serialize};

use crate::domain::account::User;
use crate::domain::catalog::{Course, Lesson};

/// Why a viewer was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessGrant {
    Admin,
    Owner,
    FreeLesson,
}

/// Why a viewer was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessDeniedReason {
    /// Not signed in and the lesson is gated.
    SignInRequired,
    /// Signed in but the course has not been purchased.
    CourseNotOwned,
}

impl AccessDeniedReason {
    /// Returns a user-friendly message for this denial reason.
    pub fn user_message(&self) -> &'static str {
        match self {
            AccessDeniedReason::SignInRequired => {
                "Pre zobrazenie tejto lekcie sa prihláste a zakúpte si kurz"
            }
            AccessDeniedReason::CourseNotOwned => "Pre zobrazenie tejto lekcie si zakúpte kurz",
        }
    }
}

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Allowed(AccessGrant),
    Denied(AccessDeniedReason),
}

impl AccessResult {
    /// Returns true if access is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessResult::Allowed(_))
    }

    /// Converts the result to a Result type, with denied becoming an error.
    pub fn into_result(self) -> Result<AccessGrant, AccessDeniedReason> {
        match self {
            AccessResult::Allowed(grant) => Ok(grant),
            AccessResult::Denied(reason) => Err(reason),
        }
    }
}

/// Decides whether `viewer` may watch `lesson` of `course`.
pub fn evaluate_lesson_access(viewer: Option<&User>, course: &Course, lesson: &Lesson) -> AccessResult {
    match viewer {
        Some(user) if user.is_admin() => AccessResult::Allowed(AccessGrant::Admin),
        Some(user) if user.owns_course(&course.id) => AccessResult::Allowed(AccessGrant::Owner),
        _ if lesson.is_free => AccessResult::Allowed(AccessGrant::FreeLesson),
        Some(_) => AccessResult::Denied(AccessDeniedReason::CourseNotOwned),
        None => AccessResult::Denied(AccessDeniedReason::SignInRequired),
    }
}

/// Purchase page a denied viewer is sent to.
pub fn purchase_redirect_path(course_slug: &str) -> String {
    format!("/kurzy/{}?access_denied=true", course_slug)
}
