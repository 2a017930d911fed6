use crate::domain::{
    models::event_session::{EventSession, SeatOutcome, SessionRegistration},
    ports::EventSessionRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

const SESSION_COLUMNS: &str =
    "id, event_id, title, description, speaker, location, start_time, end_time, max_capacity, created_at";

pub struct PostgresEventSessionRepo {
    pool: PgPool,
}

impl PostgresEventSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSessionRepository for PostgresEventSessionRepo {
    async fn create(&self, session: &EventSession) -> Result<EventSession, AppError> {
        sqlx::query_as::<_, EventSession>(&format!(
            "INSERT INTO event_sessions ({SESSION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {SESSION_COLUMNS}"
        ))
            .bind(&session.id)
            .bind(&session.event_id)
            .bind(&session.title)
            .bind(&session.description)
            .bind(&session.speaker)
            .bind(&session.location)
            .bind(session.start_time)
            .bind(session.end_time)
            .bind(session.max_capacity)
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Event"))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<EventSession>, AppError> {
        sqlx::query_as::<_, EventSession>(&format!("SELECT {SESSION_COLUMNS} FROM event_sessions WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventSession>, AppError> {
        sqlx::query_as::<_, EventSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM event_sessions WHERE event_id = $1 ORDER BY start_time ASC"
        ))
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn registration_counts(&self, event_id: &str) -> Result<Vec<(String, i64)>, AppError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT sr.session_id, COUNT(*) FROM session_registrations sr
             JOIN event_sessions es ON es.id = sr.session_id
             WHERE es.event_id = $1
             GROUP BY sr.session_id",
        )
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn registered_session_ids(&self, attendee_id: &str, event_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT sr.session_id FROM session_registrations sr
             JOIN event_sessions es ON es.id = sr.session_id
             WHERE sr.attendee_id = $1 AND es.event_id = $2",
        )
            .bind(attendee_id)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_registration(&self, attendee_id: &str, session_id: &str) -> Result<Option<SessionRegistration>, AppError> {
        sqlx::query_as::<_, SessionRegistration>(
            "SELECT id, attendee_id, session_id, registered_at FROM session_registrations WHERE attendee_id = $1 AND session_id = $2",
        )
            .bind(attendee_id)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn register_seat(&self, registration: &SessionRegistration) -> Result<SeatOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Row lock on the session serialises concurrent seat grabs.
        let capacity = sqlx::query_as::<_, (Option<i32>,)>(
            "SELECT max_capacity FROM event_sessions WHERE id = $1 FOR UPDATE",
        )
            .bind(&registration.session_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let Some((max_capacity,)) = capacity else {
            return Err(AppError::InvalidReference("Attendee or session does not exist".to_string()));
        };

        let existing = sqlx::query_as::<_, SessionRegistration>(
            "SELECT id, attendee_id, session_id, registered_at FROM session_registrations WHERE attendee_id = $1 AND session_id = $2",
        )
            .bind(&registration.attendee_id)
            .bind(&registration.session_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(existing) = existing {
            tx.commit().await.map_err(AppError::Database)?;
            return Ok(SeatOutcome::AlreadyRegistered(existing));
        }

        if let Some(cap) = max_capacity {
            let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session_registrations WHERE session_id = $1")
                .bind(&registration.session_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if taken >= i64::from(cap) {
                tx.commit().await.map_err(AppError::Database)?;
                return Ok(SeatOutcome::Full);
            }
        }

        let row = sqlx::query_as::<_, SessionRegistration>(
            "INSERT INTO session_registrations (id, attendee_id, session_id, registered_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, attendee_id, session_id, registered_at",
        )
            .bind(&registration.id)
            .bind(&registration.attendee_id)
            .bind(&registration.session_id)
            .bind(registration.registered_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "Attendee or session"))?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(SeatOutcome::Registered(row))
    }

    async fn unregister(&self, attendee_id: &str, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM session_registrations WHERE attendee_id = $1 AND session_id = $2")
            .bind(attendee_id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
