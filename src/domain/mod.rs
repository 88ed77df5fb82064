//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, money, timestamps, errors)
//! - `catalog` - Courses, modules and lessons
//! - `account` - Users, roles, owned courses and provisioning helpers
//! - `ordering` - Purchase receipts and order numbers
//! - `checkout` - Stripe webhook verification and the checkout context
//! - `access` - Lesson access rule

pub mod access;
pub mod account;
pub mod catalog;
pub mod checkout;
pub mod foundation;
pub mod ordering;
