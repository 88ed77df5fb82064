//! Hand-written port mocks shared by the fulfillment handler tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::account::User;
use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::domain::ordering::Order;
use crate::ports::{
    CourseRepository, CredentialHasher, OrderRepository, SaveResult, UserRepository,
};

// ════════════════════════════════════════════════════════════════════════════
// Users
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockUserRepository {
    users: Mutex<Vec<User>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Simulates a concurrent provisioning that wins the race.
    racing_user: Mutex<Option<User>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        let repo = Self::new();
        repo.users.lock().unwrap().push(user);
        repo
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// The next `create` loses to this user, which appears with the same email.
    pub fn losing_race_to(self, user: User) -> Self {
        *self.racing_user.lock().unwrap() = Some(user);
        self
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.create_count() + self.update_count()
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("connection refused"));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.check_reads()?;
        Ok(self.users.lock().unwrap().iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.check_reads()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), DomainError> {
        self.check_writes()?;
        self.creates.fetch_add(1, Ordering::SeqCst);

        if let Some(winner) = self.racing_user.lock().unwrap().take() {
            self.users.lock().unwrap().push(winner);
            return Err(DomainError::new(ErrorCode::AlreadyExists, "email taken"));
        }

        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::new(ErrorCode::AlreadyExists, "email taken"));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        self.check_writes()?;
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(DomainError::new(ErrorCode::UserNotFound, "no such user")),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Courses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockCourseRepository {
    courses: Mutex<Vec<Course>>,
    fail: AtomicBool,
}

impl MockCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(course: Course) -> Self {
        let repo = Self::new();
        repo.courses.lock().unwrap().push(course);
        repo
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::database("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for MockCourseRepository {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        self.check()?;
        Ok(self.courses.lock().unwrap().iter().find(|c| &c.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError> {
        self.check()?;
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Orders
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockOrderRepository {
    orders: Mutex<Vec<Order>>,
    fail: AtomicBool,
    /// Number of inserts that report an order-number collision first.
    number_collisions: AtomicUsize,
}

impl MockOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn colliding_numbers(self, times: usize) -> Self {
        self.number_collisions.store(times, Ordering::SeqCst);
        self
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderRepository for MockOrderRepository {
    async fn create(&self, order: &Order) -> Result<SaveResult, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::database("connection refused"));
        }
        if self.number_collisions.load(Ordering::SeqCst) > 0 {
            self.number_collisions.fetch_sub(1, Ordering::SeqCst);
            return Err(DomainError::new(ErrorCode::AlreadyExists, "order number taken"));
        }

        let mut orders = self.orders.lock().unwrap();
        if orders
            .iter()
            .any(|o| o.stripe_checkout_session_id == order.stripe_checkout_session_id)
        {
            return Ok(SaveResult::AlreadyExists);
        }
        orders.push(order.clone());
        Ok(SaveResult::Inserted)
    }

    async fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::database("connection refused"));
        }
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.stripe_checkout_session_id == session_id)
            .cloned())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Credentials
// ════════════════════════════════════════════════════════════════════════════

/// Reversible stand-in so tests can check which password was hashed.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plain: &str) -> Result<String, DomainError> {
        Ok(format!("hashed:{}", plain))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash == format!("hashed:{}", plain)
    }
}
