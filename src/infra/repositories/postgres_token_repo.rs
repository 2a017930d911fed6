use crate::domain::{models::token::CheckInToken, ports::TokenRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, Utc};

pub struct PostgresTokenRepo {
    pool: PgPool,
}

impl PostgresTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepo {
    async fn upsert(&self, token: &CheckInToken) -> Result<CheckInToken, AppError> {
        sqlx::query_as::<_, CheckInToken>(
            "INSERT INTO tokens (token, attendee_id, event_id, created_at, expires_at, used, used_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (attendee_id, event_id) DO UPDATE SET
                token = EXCLUDED.token,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                used = FALSE,
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
            "SELECT token, attendee_id, event_id, created_at, expires_at, used, used_at FROM tokens WHERE token = $1",
        )
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckInToken>, AppError> {
        sqlx::query_as::<_, CheckInToken>(
            "SELECT token, attendee_id, event_id, created_at, expires_at, used, used_at FROM tokens WHERE attendee_id = $1 AND event_id = $2",
        )
            .bind(attendee_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_used(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE tokens SET used = TRUE, used_at = $1 WHERE token = $2 AND used = FALSE")
            .bind(at)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
