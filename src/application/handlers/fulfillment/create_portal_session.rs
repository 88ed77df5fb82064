//! CreatePortalSessionHandler - Opens the Stripe billing portal for a customer.

use std::sync::Arc;

use tracing::info;

use super::errors::PortalSessionError;
use crate::domain::foundation::UserId;
use crate::ports::{PaymentProvider, UserRepository};

#[derive(Debug, Clone)]
pub struct CreatePortalSessionCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePortalSessionResult {
    pub url: String,
}

pub struct CreatePortalSessionHandler {
    users: Arc<dyn UserRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    public_url: String,
}

impl CreatePortalSessionHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            payment_provider,
            public_url: public_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePortalSessionCommand,
    ) -> Result<CreatePortalSessionResult, PortalSessionError> {
        let user = self
            .users
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or(PortalSessionError::UserNotFound)?;

        let customer_id = user
            .stripe_customer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(PortalSessionError::NoPaymentCustomer)?;

        let return_url = format!("{}/dashboard", self.public_url);
        let session = self
            .payment_provider
            .create_portal_session(customer_id, &return_url)
            .await?;

        info!(user_id = %user.id, "Billing portal session created");

        Ok(CreatePortalSessionResult { url: session.url })
    }
}
