//! CheckLessonAccessHandler - Decides whether a viewer may watch a lesson.
//!
//! The viewer's record is reloaded on every call so a purchase fulfilled a
//! moment ago is visible immediately; the token only says who is asking.

use std::sync::Arc;

use tracing::debug;

use super::errors::LessonAccessError;
use crate::domain::access::{
    evaluate_lesson_access, purchase_redirect_path, AccessDeniedReason, AccessGrant, AccessResult,
};
use crate::domain::catalog::{Lesson, LessonCoordinate};
use crate::domain::foundation::UserId;
use crate::ports::{CourseRepository, UserRepository};

/// Query for one lesson.
#[derive(Debug, Clone)]
pub struct CheckLessonAccessQuery {
    /// None for anonymous viewers.
    pub viewer: Option<UserId>,
    pub course_slug: String,
    pub coordinate: LessonCoordinate,
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq)]
pub enum LessonAccessOutcome {
    Allowed {
        grant: AccessGrant,
        lesson: Lesson,
        coordinate: LessonCoordinate,
    },
    Denied {
        reason: AccessDeniedReason,
        /// Purchase page for the course.
        redirect_to: String,
    },
}

pub struct CheckLessonAccessHandler {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl CheckLessonAccessHandler {
    pub fn new(users: Arc<dyn UserRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { users, courses }
    }

    pub async fn handle(
        &self,
        query: CheckLessonAccessQuery,
    ) -> Result<LessonAccessOutcome, LessonAccessError> {
        let viewer = match &query.viewer {
            Some(id) => self.users.find_by_id(id).await?,
            None => None,
        };
        let is_admin = viewer.as_ref().is_some_and(|u| u.is_admin());

        let course = self
            .courses
            .find_by_slug(&query.course_slug)
            .await?
            .filter(|c| c.is_published() || is_admin)
            .ok_or_else(|| LessonAccessError::CourseNotFound(query.course_slug.clone()))?;

        let lesson = course
            .lesson(query.coordinate)
            .ok_or(LessonAccessError::LessonNotFound {
                module: query.coordinate.module_index,
                lesson: query.coordinate.lesson_index,
            })?;

        let outcome = match evaluate_lesson_access(viewer.as_ref(), &course, lesson) {
            AccessResult::Allowed(grant) => LessonAccessOutcome::Allowed {
                grant,
                lesson: lesson.clone(),
                coordinate: query.coordinate,
            },
            AccessResult::Denied(reason) => LessonAccessOutcome::Denied {
                reason,
                redirect_to: purchase_redirect_path(&course.slug),
            },
        };

        debug!(
            course = %course.slug,
            lesson = %query.coordinate.key(),
            viewer = ?query.viewer,
            allowed = matches!(outcome, LessonAccessOutcome::Allowed { .. }),
            "Lesson access evaluated"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fulfillment::test_support::{
        MockCourseRepository, MockUserRepository,
    };
    use crate::domain::account::test_support::{admin, customer};
    use crate::domain::account::User;
    use crate::domain::catalog::test_support::sample_course;
    use crate::domain::catalog::{Course, CourseStatus};

    const FREE: LessonCoordinate = LessonCoordinate { module_index: 0, lesson_index: 0 };
    const GATED: LessonCoordinate = LessonCoordinate { module_index: 0, lesson_index: 1 };

    fn handler(users: MockUserRepository, course: Course) -> CheckLessonAccessHandler {
        CheckLessonAccessHandler::new(
            Arc::new(users),
            Arc::new(MockCourseRepository::with_course(course)),
        )
    }

    fn query(viewer: Option<&User>, coordinate: LessonCoordinate) -> CheckLessonAccessQuery {
        CheckLessonAccessQuery {
            viewer: viewer.map(|u| u.id),
            course_slug: "zaklady-liceni".to_string(),
            coordinate,
        }
    }

    async fn check(users: MockUserRepository, viewer: Option<&User>, at: LessonCoordinate) -> LessonAccessOutcome {
        handler(users, sample_course()).handle(query(viewer, at)).await.unwrap()
    }

    fn grant_of(outcome: &LessonAccessOutcome) -> Option<AccessGrant> {
        match outcome {
            LessonAccessOutcome::Allowed { grant, .. } => Some(*grant),
            LessonAccessOutcome::Denied { .. } => None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Access matrix
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn anonymous_sees_free_lesson_only() {
        let free = check(MockUserRepository::new(), None, FREE).await;
        let gated = check(MockUserRepository::new(), None, GATED).await;

        assert_eq!(grant_of(&free), Some(AccessGrant::FreeLesson));
        assert_eq!(
            gated,
            LessonAccessOutcome::Denied {
                reason: AccessDeniedReason::SignInRequired,
                redirect_to: "/kurzy/zaklady-liceni?access_denied=true".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn signed_in_non_owner_is_denied_gated_lesson() {
        let eva = customer("eva@example.com");

        let outcome = check(MockUserRepository::with_user(eva.clone()), Some(&eva), GATED).await;

        assert!(matches!(
            outcome,
            LessonAccessOutcome::Denied { reason: AccessDeniedReason::CourseNotOwned, .. }
        ));
    }

    #[tokio::test]
    async fn owner_sees_every_lesson() {
        let course = sample_course();
        let mut eva = customer("eva@example.com");
        eva.purchased_courses = vec![course.id];
        let handler = handler(MockUserRepository::with_user(eva.clone()), course);

        let outcome = handler
            .handle(query(Some(&eva), LessonCoordinate::new(1, 0)))
            .await
            .unwrap();

        assert_eq!(grant_of(&outcome), Some(AccessGrant::Owner));
    }

    #[tokio::test]
    async fn admin_sees_everything() {
        let boss = admin("admin@example.com");

        let outcome = check(MockUserRepository::with_user(boss.clone()), Some(&boss), GATED).await;

        assert_eq!(grant_of(&outcome), Some(AccessGrant::Admin));
    }

    #[tokio::test]
    async fn ownership_is_read_from_store_not_token() {
        let course = sample_course();
        let stale = customer("eva@example.com");
        let mut fresh = stale.clone();
        fresh.purchased_courses = vec![course.id];
        let handler = handler(MockUserRepository::with_user(fresh), course);

        let outcome = handler.handle(query(Some(&stale), GATED)).await.unwrap();

        assert_eq!(grant_of(&outcome), Some(AccessGrant::Owner));
    }

    #[tokio::test]
    async fn deleted_viewer_is_treated_as_anonymous() {
        let ghost = customer("ghost@example.com");

        let outcome = check(MockUserRepository::new(), Some(&ghost), GATED).await;

        assert!(matches!(
            outcome,
            LessonAccessOutcome::Denied { reason: AccessDeniedReason::SignInRequired, .. }
        ));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Not found
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn lesson_outside_course_is_not_found() {
        let err = handler(MockUserRepository::new(), sample_course())
            .handle(query(None, LessonCoordinate::new(0, 9)))
            .await
            .unwrap_err();

        assert!(matches!(err, LessonAccessError::LessonNotFound { module: 0, lesson: 9 }));
    }

    #[tokio::test]
    async fn unpublished_course_is_hidden_from_customers() {
        let mut course = sample_course();
        course.status = CourseStatus::Draft;

        let err = handler(MockUserRepository::new(), course)
            .handle(query(None, FREE))
            .await
            .unwrap_err();

        assert!(matches!(err, LessonAccessError::CourseNotFound(_)));
    }

    #[tokio::test]
    async fn unpublished_course_is_visible_to_admin() {
        let mut course = sample_course();
        course.status = CourseStatus::Draft;
        let boss = admin("admin@example.com");

        let outcome = handler(MockUserRepository::with_user(boss.clone()), course)
            .handle(query(Some(&boss), GATED))
            .await
            .unwrap();

        assert_eq!(grant_of(&outcome), Some(AccessGrant::Admin));
    }

    #[tokio::test]
    async fn store_failure_is_surfaced() {
        let err = CheckLessonAccessHandler::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockCourseRepository::new().failing()),
        )
        .handle(query(None, FREE))
        .await
        .unwrap_err();

        assert!(matches!(err, LessonAccessError::Store(_)));
    }
}
