//! PostgreSQL implementation of CourseRepository.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::{Course, CourseModule, CourseStatus};
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, Money};
use crate::ports::CourseRepository;

pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    slug: String,
    title: String,
    price_cents: i64,
    original_price_cents: Option<i64>,
    currency: String,
    stripe_price_id: Option<String>,
    status: String,
    modules: Json<Vec<CourseModule>>,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let currency = row.currency.trim();
        let price = Money::from_minor(row.price_cents, currency).map_err(invalid_column)?;
        let original_price = row
            .original_price_cents
            .map(|cents| Money::from_minor(cents, currency))
            .transpose()
            .map_err(invalid_column)?;

        Ok(Course {
            id: CourseId::from_uuid(row.id),
            slug: row.slug,
            title: row.title,
            price,
            original_price,
            stripe_price_id: row.stripe_price_id,
            status: parse_status(&row.status)?,
            modules: row.modules.0,
        })
    }
}

fn parse_status(s: &str) -> Result<CourseStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "draft" => Ok(CourseStatus::Draft),
        "published" => Ok(CourseStatus::Published),
        "archived" => Ok(CourseStatus::Archived),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid course status value: {}", s),
        )),
    }
}

fn invalid_column(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid course row: {}", e))
}

const SELECT_COURSE: &str = r#"
    SELECT id, slug, title, price_cents, original_price_cents, currency,
           stripe_price_id, status, modules
    FROM courses
"#;

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COURSE))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to find course: {}", e)))?;

        row.map(Course::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> =
            sqlx::query_as(&format!("{} WHERE slug = $1", SELECT_COURSE))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to find course by slug: {}", e))
                })?;

        row.map(Course::try_from).transpose()
    }
}
