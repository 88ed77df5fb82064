//! Account module - users, roles, owned courses and provisioning helpers.

mod credentials;
mod owned_course;
mod user;

pub use credentials::{
    split_display_name, TemporaryPassword, DEFAULT_CUSTOMER_NAME, TEMPORARY_PASSWORD_LEN,
};
pub use owned_course::{normalize_owned_courses, OwnedCourseRef};
pub use user::{normalize_email, CourseProgress, NewCustomer, User, UserRole};

#[cfg(test)]
pub(crate) use user::test_support;
