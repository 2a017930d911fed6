use crate::domain::{
    models::event_session::{EventSession, SeatOutcome, SessionRegistration},
    ports::EventSessionRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

const SESSION_COLUMNS: &str =
    "id, event_id, title, description, speaker, location, start_time, end_time, max_capacity, created_at";

pub struct SqliteEventSessionRepo {
    pool: SqlitePool,
}

impl SqliteEventSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventSessionRepository for SqliteEventSessionRepo {
    async fn create(&self, session: &EventSession) -> Result<EventSession, AppError> {
        sqlx::query_as::<_, EventSession>(&format!(
            "INSERT INTO event_sessions ({SESSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {SESSION_COLUMNS}"
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
        sqlx::query_as::<_, EventSession>(&format!("SELECT {SESSION_COLUMNS} FROM event_sessions WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventSession>, AppError> {
        sqlx::query_as::<_, EventSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM event_sessions WHERE event_id = ? ORDER BY start_time ASC"
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
             WHERE es.event_id = ?
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
             WHERE sr.attendee_id = ? AND es.event_id = ?",
        )
            .bind(attendee_id)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_registration(&self, attendee_id: &str, session_id: &str) -> Result<Option<SessionRegistration>, AppError> {
        sqlx::query_as::<_, SessionRegistration>(
            "SELECT id, attendee_id, session_id, registered_at FROM session_registrations WHERE attendee_id = ? AND session_id = ?",
        )
            .bind(attendee_id)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn register_seat(&self, registration: &SessionRegistration) -> Result<SeatOutcome, AppError> {
        // A single write statement, so SQLite holds the write lock across the count and the insert.
        let inserted = sqlx::query_as::<_, SessionRegistration>(
            "INSERT INTO session_registrations (id, attendee_id, session_id, registered_at)
             SELECT ?, ?, ?, ?
             WHERE EXISTS (
                 SELECT 1 FROM event_sessions es
                 WHERE es.id = ?
                   AND (es.max_capacity IS NULL
                        OR (SELECT COUNT(*) FROM session_registrations WHERE session_id = es.id) < es.max_capacity)
             )
             ON CONFLICT (attendee_id, session_id) DO NOTHING
             RETURNING id, attendee_id, session_id, registered_at",
        )
            .bind(&registration.id)
            .bind(&registration.attendee_id)
            .bind(&registration.session_id)
            .bind(registration.registered_at)
            .bind(&registration.session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Attendee or session"))?;

        if let Some(row) = inserted {
            return Ok(SeatOutcome::Registered(row));
        }

        match self.find_registration(&registration.attendee_id, &registration.session_id).await? {
            Some(existing) => Ok(SeatOutcome::AlreadyRegistered(existing)),
            None => Ok(SeatOutcome::Full),
        }
    }

    async fn unregister(&self, attendee_id: &str, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM session_registrations WHERE attendee_id = ? AND session_id = ?")
            .bind(attendee_id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
