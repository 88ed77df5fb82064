//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UserRepository` - Customer and admin accounts
//! - `CourseRepository` - Read-only course catalog
//! - `OrderRepository` - Purchase receipts, unique per checkout session
//!
//! ## Integration Ports
//!
//! - `PaymentProvider` - Hosted checkout, billing portal, webhook authentication
//! - `Notifier` - Transactional email
//! - `CredentialHasher` - One-way password hashing
//! - `SessionValidator` - Bearer/cookie token validation

mod course_repository;
mod credential_hasher;
mod notifier;
mod order_repository;
mod payment_provider;
mod session_validator;
mod user_repository;

pub use course_repository::CourseRepository;
pub use credential_hasher::CredentialHasher;
pub use notifier::{Notification, NotificationKind, Notifier, NotifyError};
pub use order_repository::{OrderRepository, SaveResult};
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    PortalSession,
};
pub use session_validator::SessionValidator;
pub use user_repository::UserRepository;
