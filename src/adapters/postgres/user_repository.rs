//! PostgreSQL implementation of UserRepository.
//!
//! Owned courses live in `user_courses` and are only ever inserted, so two
//! concurrent grants never overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::account::{CourseProgress, User, UserRole};
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::UserRepository;

/// PostgreSQL implementation of the UserRepository port.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_user(&self, row: UserRow) -> Result<User, DomainError> {
        let course_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT course_id FROM user_courses WHERE user_id = $1 ORDER BY granted_at, course_id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load owned courses", e))?;

        let progress_rows: Vec<ProgressRow> = sqlx::query_as(
            r#"
            SELECT course_id, completed_lessons, last_watched_lesson, percent_complete
            FROM course_progress
            WHERE user_id = $1
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load course progress", e))?;

        let mut user = User::try_from(row)?;
        user.purchased_courses = course_ids.into_iter().map(CourseId::from_uuid).collect();
        user.course_progress = progress_rows.into_iter().map(CourseProgress::from).collect();
        Ok(user)
    }
}

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    role: String,
    stripe_customer_id: Option<String>,
    marketing_consent: bool,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = UserRole::parse(&row.role).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid role value: {}", row.role),
            )
        })?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            role,
            stripe_customer_id: row.stripe_customer_id,
            purchased_courses: Vec::new(),
            course_progress: Vec::new(),
            marketing_consent: row.marketing_consent,
            password_hash: row.password_hash,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    course_id: Uuid,
    completed_lessons: Vec<String>,
    last_watched_lesson: Option<String>,
    percent_complete: i16,
}

impl From<ProgressRow> for CourseProgress {
    fn from(row: ProgressRow) -> Self {
        CourseProgress {
            course: CourseId::from_uuid(row.course_id),
            completed_lessons: row.completed_lessons,
            last_watched_lesson: row.last_watched_lesson,
            percent_complete: row.percent_complete.clamp(0, 100) as u8,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, email, first_name, last_name, phone, role, stripe_customer_id,
           marketing_consent, password_hash, created_at, updated_at
    FROM users
"#;

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// Inserts owned courses; existing rows are left untouched.
async fn insert_owned_courses(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> Result<(), DomainError> {
    for course_id in &user.purchased_courses {
        sqlx::query(
            r#"
            INSERT INTO user_courses (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(course_id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to grant course", e))?;
    }
    Ok(())
}

async fn upsert_progress(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> Result<(), DomainError> {
    for progress in &user.course_progress {
        sqlx::query(
            r#"
            INSERT INTO course_progress (
                user_id, course_id, completed_lessons, last_watched_lesson, percent_complete
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, course_id) DO UPDATE SET
                completed_lessons = EXCLUDED.completed_lessons,
                last_watched_lesson = EXCLUDED.last_watched_lesson,
                percent_complete = EXCLUDED.percent_complete
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(progress.course.as_uuid())
        .bind(&progress.completed_lessons)
        .bind(&progress.last_watched_lesson)
        .bind(i16::from(progress.percent_complete))
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to save course progress", e))?;
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user", e))?;

        match row {
            Some(row) => Ok(Some(self.load_user(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "{} WHERE email = $1 ORDER BY created_at LIMIT 1",
            SELECT_USER
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find user by email", e))?;

        match row {
            Some(row) => Ok(Some(self.load_user(row).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, phone, role, stripe_customer_id,
                marketing_consent, password_hash, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.stripe_customer_id)
        .bind(user.marketing_consent)
        .bind(&user.password_hash)
        .bind(user.created_at.as_datetime())
        .bind(user.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("users_email_key") {
                    return DomainError::new(
                        ErrorCode::AlreadyExists,
                        format!("User with email {} already exists", user.email),
                    );
                }
            }
            db_error("Failed to create user", e)
        })?;

        insert_owned_courses(&mut tx, user).await?;
        upsert_progress(&mut tx, user).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit user", e))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name = $2,
                last_name = $3,
                phone = $4,
                role = $5,
                stripe_customer_id = COALESCE($6, stripe_customer_id),
                marketing_consent = $7,
                password_hash = COALESCE($8, password_hash),
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.stripe_customer_id)
        .bind(user.marketing_consent)
        .bind(&user.password_hash)
        .bind(user.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("User {} not found", user.id),
            ));
        }

        insert_owned_courses(&mut tx, user).await?;
        upsert_progress(&mut tx, user).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit user", e))?;
        Ok(())
    }
}
