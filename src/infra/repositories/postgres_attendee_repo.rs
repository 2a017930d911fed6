use crate::domain::{models::attendee::Attendee, ports::AttendeeRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAttendeeRepo {
    pool: PgPool,
}

impl PostgresAttendeeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendeeRepository for PostgresAttendeeRepo {
    async fn upsert_by_email(&self, attendee: &Attendee) -> Result<Attendee, AppError> {
        sqlx::query_as::<_, Attendee>(
            "INSERT INTO attendees (id, name, email, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (email) DO UPDATE SET name = excluded.name, updated_at = excluded.updated_at
             RETURNING id, name, email, created_at, updated_at",
        )
            .bind(&attendee.id)
            .bind(&attendee.name)
            .bind(&attendee.email)
            .bind(attendee.created_at)
            .bind(attendee.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(
            "SELECT id, name, email, created_at, updated_at FROM attendees WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(
            "SELECT id, name, email, created_at, updated_at FROM attendees WHERE email = $1",
        )
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Attendee>, AppError> {
        sqlx::query_as::<_, Attendee>(
            "SELECT id, name, email, created_at, updated_at FROM attendees ORDER BY created_at DESC LIMIT $1",
        )
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendees")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
