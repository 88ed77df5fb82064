//! Catalog module - courses and their lesson tree.

mod course;

pub use course::{is_valid_slug, Course, CourseModule, CourseStatus, Lesson, LessonCoordinate};

#[cfg(test)]
pub(crate) use course::test_support;
