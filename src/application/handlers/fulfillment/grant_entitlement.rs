//! GrantEntitlementHandler - Adds the purchased course to the buyer's account.

use std::sync::Arc;

use tracing::info;

use crate::domain::account::User;
use crate::domain::foundation::{CourseId, DomainError};
use crate::ports::UserRepository;

/// Command to grant a course.
#[derive(Debug, Clone)]
pub struct GrantEntitlementCommand {
    pub user: User,
    /// The account was provisioned in this delivery with the course seeded.
    pub is_new: bool,
    pub course_id: CourseId,
    pub stripe_customer_id: Option<String>,
}

/// What the grant did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Course was seeded when the account was created.
    SeededAtCreation,
    /// Course was added now.
    Granted,
    /// Course was already owned; only the customer reference may have changed.
    AlreadyOwned,
}

impl GrantOutcome {
    /// True when this delivery gave the user access they did not have.
    pub fn newly_granted(&self) -> bool {
        !matches!(self, GrantOutcome::AlreadyOwned)
    }
}

/// Handler for granting course ownership.
pub struct GrantEntitlementHandler {
    users: Arc<dyn UserRepository>,
}

impl GrantEntitlementHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Ensure the user owns the course.
    ///
    /// Writes only when ownership or the customer reference changed; previously
    /// owned courses are never removed.
    pub async fn handle(&self, cmd: GrantEntitlementCommand) -> Result<GrantOutcome, DomainError> {
        if cmd.is_new {
            return Ok(GrantOutcome::SeededAtCreation);
        }

        let mut user = cmd.user;
        let granted = user.grant_course(cmd.course_id);
        let customer_changed = user.record_stripe_customer(cmd.stripe_customer_id.as_deref());

        if granted || customer_changed {
            self.users.update(&user).await?;
        }

        let outcome = if granted {
            GrantOutcome::Granted
        } else {
            GrantOutcome::AlreadyOwned
        };

        info!(
            user_id = %user.id,
            course_id = %cmd.course_id,
            outcome = ?outcome,
            customer_changed,
            "Course entitlement applied"
        );

        Ok(outcome)
    }
}
