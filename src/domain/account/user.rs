//! User account aggregate.
//!
//! The owned-course list has set semantics: it never contains duplicates and
//! nothing in the fulfillment pipeline removes entries from it.

use serde::{Deserialize, Serialize};

use super::owned_course::deserialize_owned_courses;
use crate::domain::foundation::{CourseId, Timestamp, UserId, ValidationError};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
        }
    }

    /// Parses a role name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "customer" => Some(UserRole::Customer),
            _ => None,
        }
    }
}

/// Viewing progress for one owned course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course: CourseId,
    /// Lesson keys in `module-lesson` form.
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub last_watched_lesson: Option<String>,
    #[serde(default)]
    pub percent_complete: u8,
}

impl CourseProgress {
    /// Creates a progress record, rejecting percentages above 100.
    pub fn new(course: CourseId, percent_complete: u8) -> Result<Self, ValidationError> {
        if percent_complete > 100 {
            return Err(ValidationError::out_of_range(
                "percent_complete",
                0,
                100,
                i64::from(percent_complete),
            ));
        }
        Ok(Self {
            course,
            completed_lessons: Vec::new(),
            last_watched_lesson: None,
            percent_complete,
        })
    }
}

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    /// Payment-provider customer reference. Set or refreshed, never cleared.
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_owned_courses")]
    pub purchased_courses: Vec<CourseId>,
    #[serde(default)]
    pub course_progress: Vec<CourseProgress>,
    #[serde(default)]
    pub marketing_consent: bool,
    /// Argon2 PHC string; absent for accounts managed elsewhere.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

/// Input for provisioning a customer account after a guest checkout.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub stripe_customer_id: Option<String>,
    pub seeded_course: CourseId,
}

impl User {
    /// Creates a customer-role account with the purchased course pre-seeded.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the email is blank or lacks `@`.
    pub fn new_customer(input: NewCustomer) -> Result<Self, ValidationError> {
        let email = validate_email(&input.email)?;
        let now = Timestamp::now();

        Ok(Self {
            id: UserId::new(),
            email,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: None,
            role: UserRole::Customer,
            stripe_customer_id: input
                .stripe_customer_id
                .filter(|id| !id.trim().is_empty()),
            purchased_courses: vec![input.seeded_course],
            course_progress: Vec::new(),
            marketing_consent: false,
            password_hash: Some(input.password_hash),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn owns_course(&self, course_id: &CourseId) -> bool {
        self.purchased_courses.contains(course_id)
    }

    /// Adds a course to the owned set. Returns false when already owned.
    pub fn grant_course(&mut self, course_id: CourseId) -> bool {
        if self.owns_course(&course_id) {
            return false;
        }
        self.purchased_courses.push(course_id);
        self.updated_at = Timestamp::now();
        true
    }

    /// Records the payment-customer reference.
    ///
    /// A blank or missing reference never clears an existing one. Returns
    /// true when the stored value changed.
    pub fn record_stripe_customer(&mut self, customer_id: Option<&str>) -> bool {
        let Some(customer_id) = customer_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return false;
        };
        if self.stripe_customer_id.as_deref() == Some(customer_id) {
            return false;
        }
        self.stripe_customer_id = Some(customer_id.to_string());
        self.updated_at = Timestamp::now();
        true
    }

    /// First name if set, otherwise the supplied fallback.
    pub fn greeting_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.first_name.trim().is_empty() {
            fallback
        } else {
            &self.first_name
        }
    }
}

fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }
    if !email.contains('@') {
        return Err(ValidationError::invalid_format("email", "missing @ symbol"));
    }
    Ok(normalize_email(email))
}

/// Lower-cases and trims an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
