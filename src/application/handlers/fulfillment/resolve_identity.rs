//! ResolveIdentityHandler - Finds or provisions the account a purchase belongs to.
//!
//! Resolution order: the signed-in user id from checkout metadata, then the
//! payer email, then a new customer account seeded with the purchased course.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::account::{
    normalize_email, split_display_name, NewCustomer, TemporaryPassword, User,
};
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::ports::{CredentialHasher, UserRepository};

/// Command to resolve the purchasing account.
#[derive(Debug, Clone)]
pub struct ResolveIdentityCommand {
    pub course_id: CourseId,
    pub user_id: Option<UserId>,
    pub customer_email: String,
    pub customer_name: String,
    pub stripe_customer_id: Option<String>,
}

/// The account a purchase belongs to.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub user: User,
    /// True when the account was provisioned by this call.
    pub is_new: bool,
    /// Present only for new accounts; goes to the welcome email and nowhere else.
    pub temporary_password: Option<TemporaryPassword>,
}

impl ResolvedIdentity {
    fn existing(user: User) -> Self {
        Self {
            user,
            is_new: false,
            temporary_password: None,
        }
    }
}

/// Handler for resolving the purchasing account.
pub struct ResolveIdentityHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl ResolveIdentityHandler {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Resolve or create the account.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` when the payer email is missing; nothing is written
    /// - Store errors are propagated unchanged
    pub async fn handle(&self, cmd: ResolveIdentityCommand) -> Result<ResolvedIdentity, DomainError> {
        let email = normalize_email(&cmd.customer_email);
        if email.is_empty() {
            return Err(DomainError::validation(
                "customer_email",
                "Payer email is required to deliver access",
            ));
        }

        // 1. Signed-in purchaser
        if let Some(user_id) = &cmd.user_id {
            match self.users.find_by_id(user_id).await? {
                Some(user) => {
                    info!(user_id = %user.id, is_new = false, "Resolved purchaser by id");
                    return Ok(ResolvedIdentity::existing(user));
                }
                None => debug!(user_id = %user_id, "Metadata user not found, trying email"),
            }
        }

        // 2. Existing account with the payer email
        if let Some(user) = self.users.find_by_email(&email).await? {
            info!(user_id = %user.id, is_new = false, "Resolved purchaser by email");
            return Ok(ResolvedIdentity::existing(user));
        }

        // 3. Guest checkout: provision an account
        self.provision(cmd, email).await
    }

    async fn provision(
        &self,
        cmd: ResolveIdentityCommand,
        email: String,
    ) -> Result<ResolvedIdentity, DomainError> {
        let (first_name, last_name) = split_display_name(&cmd.customer_name);
        let password = TemporaryPassword::generate();
        let password_hash = self.hasher.hash(password.expose())?;

        let user = User::new_customer(NewCustomer {
            email: email.clone(),
            first_name,
            last_name,
            password_hash,
            stripe_customer_id: cmd.stripe_customer_id,
            seeded_course: cmd.course_id,
        })?;

        match self.users.create(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, is_new = true, "Provisioned customer account");
                Ok(ResolvedIdentity {
                    user,
                    is_new: true,
                    temporary_password: Some(password),
                })
            }
            Err(e) if e.code == ErrorCode::AlreadyExists => {
                // Another delivery provisioned the same email first
                let existing = self.users.find_by_email(&email).await?.ok_or(e)?;
                info!(user_id = %existing.id, is_new = false, "Resolved purchaser after provisioning race");
                Ok(ResolvedIdentity::existing(existing))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::fulfillment::test_support::{MockUserRepository, PlainHasher};
    use crate::domain::account::test_support::customer;
    use crate::domain::account::UserRole;

    fn handler(users: Arc<MockUserRepository>) -> ResolveIdentityHandler {
        ResolveIdentityHandler::new(users, Arc::new(PlainHasher))
    }

    fn command(email: &str) -> ResolveIdentityCommand {
        ResolveIdentityCommand {
            course_id: CourseId::new(),
            user_id: None,
            customer_email: email.to_string(),
            customer_name: "Jana Nováková".to_string(),
            stripe_customer_id: Some("cus_123".to_string()),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // New guest
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn provisions_guest_with_split_name_and_seeded_course() {
        let users = Arc::new(MockUserRepository::new());
        let cmd = command("jana@example.com");
        let course_id = cmd.course_id;

        let resolved = handler(users.clone()).handle(cmd).await.unwrap();

        assert!(resolved.is_new);
        assert_eq!(resolved.user.first_name, "Jana");
        assert_eq!(resolved.user.last_name, "Nováková");
        assert_eq!(resolved.user.email, "jana@example.com");
        assert_eq!(resolved.user.role, UserRole::Customer);
        assert_eq!(resolved.user.purchased_courses, vec![course_id]);
        assert_eq!(resolved.user.stripe_customer_id.as_deref(), Some("cus_123"));
        assert_eq!(users.users().len(), 1);
    }

    #[tokio::test]
    async fn stores_hash_of_the_returned_password() {
        let users = Arc::new(MockUserRepository::new());

        let resolved = handler(users.clone()).handle(command("jana@example.com")).await.unwrap();

        let password = resolved.temporary_password.unwrap();
        let stored = users.users()[0].password_hash.clone().unwrap();
        assert_eq!(stored, format!("hashed:{}", password.expose()));
    }

    #[tokio::test]
    async fn single_word_name_leaves_last_name_empty() {
        let users = Arc::new(MockUserRepository::new());
        let mut cmd = command("cher@example.com");
        cmd.customer_name = "Cher".to_string();

        let resolved = handler(users).handle(cmd).await.unwrap();

        assert_eq!(resolved.user.first_name, "Cher");
        assert_eq!(resolved.user.last_name, "");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Existing accounts
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn metadata_user_id_wins_over_email() {
        let known = customer("eva@example.com");
        let users = Arc::new(MockUserRepository::with_user(known.clone()));
        let mut cmd = command("different@example.com");
        cmd.user_id = Some(known.id);

        let resolved = handler(users.clone()).handle(cmd).await.unwrap();

        assert!(!resolved.is_new);
        assert_eq!(resolved.user.id, known.id);
        assert_eq!(users.write_count(), 0);
    }

    #[tokio::test]
    async fn unknown_user_id_falls_through_to_email() {
        let existing = customer("eva@example.com");
        let users = Arc::new(MockUserRepository::with_user(existing.clone()));
        let mut cmd = command("eva@example.com");
        cmd.user_id = Some(UserId::new());

        let resolved = handler(users).handle(cmd).await.unwrap();

        assert_eq!(resolved.user.id, existing.id);
        assert!(resolved.temporary_password.is_none());
    }

    #[tokio::test]
    async fn payer_email_is_matched_after_normalizing_case() {
        let existing = customer("eva@example.com");
        let users = Arc::new(MockUserRepository::with_user(existing.clone()));

        let resolved = handler(users.clone()).handle(command(" Eva@Example.com ")).await.unwrap();

        assert_eq!(resolved.user.id, existing.id);
        assert_eq!(users.create_count(), 0);
    }

    #[tokio::test]
    async fn lost_provisioning_race_returns_winner() {
        let winner = customer("jana@example.com");
        let users = Arc::new(MockUserRepository::new().losing_race_to(winner.clone()));

        let resolved = handler(users.clone()).handle(command("jana@example.com")).await.unwrap();

        assert!(!resolved.is_new);
        assert_eq!(resolved.user.id, winner.id);
        assert_eq!(users.users().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failures
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_email_fails_before_any_write() {
        let users = Arc::new(MockUserRepository::new());

        let err = handler(users.clone()).handle(command("  ")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(users.write_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_surfaced() {
        let users = Arc::new(MockUserRepository::new().failing_reads());

        let err = handler(users).handle(command("jana@example.com")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
