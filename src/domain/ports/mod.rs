use crate::domain::models::{
    attendee::Attendee, event::Event, token::CheckInToken,
    event_session::{EventSession, SeatOutcome, SessionRegistration},
    check_in::{CheckIn, InsertOutcome}, identity::Identity,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    /// Inserts a new attendee, or refreshes the name of the one already holding this email.
    async fn upsert_by_email(&self, attendee: &Attendee) -> Result<Attendee, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Attendee>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Attendee>, AppError>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<Attendee>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self) -> Result<Vec<Event>, AppError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Writes the token as the single row for its (attendee, event) pair,
    /// replacing any previous value and resetting the used flag.
    async fn upsert(&self, token: &CheckInToken) -> Result<CheckInToken, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<CheckInToken>, AppError>;
    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckInToken>, AppError>;
    async fn mark_used(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Atomic conditional insert guarded by the (attendee_id, event_id) unique key.
    async fn insert_if_absent(&self, check_in: &CheckIn) -> Result<InsertOutcome, AppError>;
    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckIn>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<CheckIn>, AppError>;
    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError>;
    async fn count_by_event_since(&self, event_id: &str, since: DateTime<Utc>) -> Result<i64, AppError>;
}

#[async_trait]
pub trait EventSessionRepository: Send + Sync {
    async fn create(&self, session: &EventSession) -> Result<EventSession, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<EventSession>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventSession>, AppError>;
    /// (session_id, registered seats) for every session of the event that has any.
    async fn registration_counts(&self, event_id: &str) -> Result<Vec<(String, i64)>, AppError>;
    async fn registered_session_ids(&self, attendee_id: &str, event_id: &str) -> Result<Vec<String>, AppError>;
    async fn find_registration(&self, attendee_id: &str, session_id: &str) -> Result<Option<SessionRegistration>, AppError>;
    /// Takes a seat unless the session is at capacity. Capacity check and insert are atomic.
    async fn register_seat(&self, registration: &SessionRegistration) -> Result<SeatOutcome, AppError>;
    /// Returns false when there was nothing to remove.
    async fn unregister(&self, attendee_id: &str, session_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}

/// Turns the opaque session credential carried by a request into an [`Identity`].
pub trait IdentityResolver: Send + Sync {
    fn issue(&self, subject: &str, role: &str, ttl: Duration) -> Result<String, AppError>;
    fn resolve(&self, session: &str) -> Option<Identity>;
}
