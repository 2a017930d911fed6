use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A talk or workshop inside an event that attendees sign up for.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventSession {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub speaker: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `None` means unlimited seats.
    pub max_capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

pub struct NewSessionParams {
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_capacity: Option<i32>,
}

impl EventSession {
    pub fn new(params: NewSessionParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            title: params.title,
            description: params.description.unwrap_or_default(),
            speaker: params.speaker,
            location: params.location,
            start_time: params.start,
            end_time: params.end,
            max_capacity: params.max_capacity,
            created_at: Utc::now(),
        }
    }

    pub fn is_full(&self, registered: i64) -> bool {
        self.max_capacity.is_some_and(|cap| registered >= i64::from(cap))
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionRegistration {
    pub id: String,
    pub attendee_id: String,
    pub session_id: String,
    pub registered_at: DateTime<Utc>,
}

impl SessionRegistration {
    pub fn new(attendee_id: String, session_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            attendee_id,
            session_id,
            registered_at: Utc::now(),
        }
    }
}

/// Result of the capacity-guarded seat insert.
#[derive(Debug, Clone)]
pub enum SeatOutcome {
    Registered(SessionRegistration),
    AlreadyRegistered(SessionRegistration),
    Full,
}
