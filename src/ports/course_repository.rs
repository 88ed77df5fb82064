//! Course repository port (read-only).
//!
//! Courses are authored elsewhere; this service only reads them.

use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, DomainError};
use async_trait::async_trait;

#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Find a course by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Find a course by its URL slug. Returns `None` if not found.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CourseRepository) {}
    }
}
