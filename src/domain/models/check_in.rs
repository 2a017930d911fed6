use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInMethod {
    Scanned,
    Manual,
}

impl CheckInMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInMethod::Scanned => "scanned",
            CheckInMethod::Manual => "manual",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: String,
    pub attendee_id: String,
    pub event_id: String,
    pub checked_in_at: DateTime<Utc>,
    pub method: String, // scanned, manual
}

impl CheckIn {
    pub fn new(attendee_id: String, event_id: String, method: CheckInMethod) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            attendee_id,
            event_id,
            checked_in_at: Utc::now(),
            method: method.as_str().to_string(),
        }
    }
}

/// Result of the store's conditional insert on (attendee_id, event_id).
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(CheckIn),
    AlreadyExists(CheckIn),
}
