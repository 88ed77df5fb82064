//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresUserRepository` - Accounts, owned courses and progress
//! - `PostgresCourseRepository` - Read-only course catalog
//! - `PostgresOrderRepository` - Purchase receipts, unique per checkout session

mod course_repository;
mod order_repository;
mod user_repository;

pub use course_repository::PostgresCourseRepository;
pub use order_repository::PostgresOrderRepository;
pub use user_repository::PostgresUserRepository;
