use crate::domain::{models::token::CheckInToken, ports::TokenRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteTokenRepo {
    pool: SqlitePool,
}

impl SqliteTokenRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepo {
    async fn upsert(&self, token: &CheckInToken) -> Result<CheckInToken, AppError> {
        sqlx::query_as::<_, CheckInToken>(
            "INSERT INTO tokens (token, attendee_id, event_id, created_at, expires_at, used, used_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (attendee_id, event_id) DO UPDATE SET
                token = excluded.token,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at,
                used = 0,
                used_at = NULL
             RETURNING token, attendee_id, event_id, created_at, expires_at, used, used_at",
        )
            .bind(&token.token)
            .bind(&token.attendee_id)
            .bind(&token.event_id)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.used)
            .bind(token.used_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Attendee or event"))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<CheckInToken>, AppError> {
        sqlx::query_as::<_, CheckInToken>(
            "SELECT token, attendee_id, event_id, created_at, expires_at, used, used_at FROM tokens WHERE token = ?",
        )
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckInToken>, AppError> {
        sqlx::query_as::<_, CheckInToken>(
            "SELECT token, attendee_id, event_id, created_at, expires_at, used, used_at FROM tokens WHERE attendee_id = ? AND event_id = ?",
        )
            .bind(attendee_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_used(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE tokens SET used = 1, used_at = ? WHERE token = ? AND used = 0")
            .bind(at)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
