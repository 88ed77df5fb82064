//! In-memory entity store.
//!
//! Implements the user, course and order repositories over `RwLock`ed maps.
//! Used by the HTTP integration tests and for running the service without a
//! database. Enforces the same uniqueness rules as the Postgres schema.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{normalize_owned_courses, OwnedCourseRef, User};
use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::domain::ordering::Order;
use crate::ports::{CourseRepository, OrderRepository, SaveResult, UserRepository};

/// In-memory storage for users, courses and orders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<Vec<User>>>,
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
    orders: Arc<RwLock<Vec<Order>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a course in the catalog.
    pub async fn put_course(&self, course: Course) {
        self.courses.write().await.insert(course.id, course);
    }

    /// Insert a user directly, bypassing the uniqueness check.
    pub async fn put_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.retain(|u| u.id != user.id);
        users.push(user);
    }

    /// Make every operation fail with `DatabaseError` (useful for tests).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all stored users.
    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Snapshot of all stored orders.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("In-memory store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), DomainError> {
        self.check_available()?;
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("User with email {} already exists", user.email),
            ));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("User {} already exists", user.id),
            ));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        self.check_available()?;
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::UserNotFound, format!("User {} not found", user.id))
            })?;

        // Owned courses only grow: merge whatever another writer stored.
        let merged = normalize_owned_courses(
            stored
                .purchased_courses
                .iter()
                .chain(user.purchased_courses.iter())
                .copied()
                .map(OwnedCourseRef::Id),
        );
        *stored = User {
            purchased_courses: merged,
            ..user.clone()
        };
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        self.check_available()?;
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError> {
        self.check_available()?;
        let courses = self.courses.read().await;
        Ok(courses.values().find(|c| c.slug == slug).cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(&self, order: &Order) -> Result<SaveResult, DomainError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        if orders
            .iter()
            .any(|o| o.stripe_checkout_session_id == order.stripe_checkout_session_id)
        {
            return Ok(SaveResult::AlreadyExists);
        }
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Order number {} already exists", order.order_number),
            ));
        }
        orders.push(order.clone());
        Ok(SaveResult::Inserted)
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        self.check_available()?;
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .find(|o| o.stripe_checkout_session_id == session_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::test_support::customer;
    use crate::domain::catalog::test_support::sample_course;
    use crate::domain::foundation::Money;
    use crate::domain::ordering::PaidOrder;

    fn paid_order(user: &User, session: &str) -> Order {
        Order::paid(PaidOrder {
            customer: user.id,
            customer_email: user.email.clone(),
            course: CourseId::new(),
            total: Money::eur(4999).unwrap(),
            stripe_checkout_session_id: session.to_string(),
            stripe_payment_intent_id: None,
            billing_details: None,
        })
    }

    // ══════════════════════════════════════════════════════════════
    // Users
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = InMemoryStore::new();
        UserRepository::create(&store, &customer("eva@example.com"))
            .await
            .unwrap();

        let err = UserRepository::create(&store, &customer("eva@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn update_never_drops_stored_courses() {
        let store = InMemoryStore::new();
        let user = customer("eva@example.com");
        UserRepository::create(&store, &user).await.unwrap();

        let first = CourseId::new();
        let second = CourseId::new();

        let mut copy_a = user.clone();
        copy_a.grant_course(first);
        let mut copy_b = user.clone();
        copy_b.grant_course(second);

        store.update(&copy_a).await.unwrap();
        store.update(&copy_b).await.unwrap();

        let stored = UserRepository::find_by_id(&store, &user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.owns_course(&first));
        assert!(stored.owns_course(&second));
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.update(&customer("ghost@example.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    // ══════════════════════════════════════════════════════════════
    // Courses
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn finds_course_by_slug() {
        let store = InMemoryStore::new();
        let course = sample_course();
        store.put_course(course.clone()).await;

        let found = store.find_by_slug("zaklady-liceni").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(course.id));
        assert!(store.find_by_slug("missing").await.unwrap().is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Orders
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn second_order_for_session_is_reported_not_stored() {
        let store = InMemoryStore::new();
        let user = customer("eva@example.com");

        let first = OrderRepository::create(&store, &paid_order(&user, "cs_1"))
            .await
            .unwrap();
        let second = OrderRepository::create(&store, &paid_order(&user, "cs_1"))
            .await
            .unwrap();

        assert_eq!(first, SaveResult::Inserted);
        assert_eq!(second, SaveResult::AlreadyExists);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_reads() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);

        let err = store.find_by_email("eva@example.com").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
