use crate::domain::{models::check_in::{CheckIn, InsertOutcome}, ports::CheckInRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteCheckInRepo {
    pool: SqlitePool,
}

impl SqliteCheckInRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository for SqliteCheckInRepo {
    async fn insert_if_absent(&self, check_in: &CheckIn) -> Result<InsertOutcome, AppError> {
        let inserted = sqlx::query_as::<_, CheckIn>(
            "INSERT INTO check_ins (id, attendee_id, event_id, checked_in_at, method) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (attendee_id, event_id) DO NOTHING
             RETURNING id, attendee_id, event_id, checked_in_at, method",
        )
            .bind(&check_in.id)
            .bind(&check_in.attendee_id)
            .bind(&check_in.event_id)
            .bind(check_in.checked_in_at)
            .bind(&check_in.method)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Attendee"))?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome::Inserted(row));
        }

        let existing = self.find_by_pair(&check_in.attendee_id, &check_in.event_id).await?
            .ok_or(AppError::InternalWithMsg("Check-in conflict without an existing row".into()))?;
        Ok(InsertOutcome::AlreadyExists(existing))
    }

    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckIn>, AppError> {
        sqlx::query_as::<_, CheckIn>(
            "SELECT id, attendee_id, event_id, checked_in_at, method FROM check_ins WHERE attendee_id = ? AND event_id = ?",
        )
            .bind(attendee_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<CheckIn>, AppError> {
        sqlx::query_as::<_, CheckIn>(
            "SELECT id, attendee_id, event_id, checked_in_at, method FROM check_ins WHERE event_id = ? ORDER BY checked_in_at DESC",
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_event_since(&self, event_id: &str, since: DateTime<Utc>) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins WHERE event_id = ? AND checked_in_at >= ?")
            .bind(event_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
