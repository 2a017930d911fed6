use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<String>,
    pub website_url: Option<String>,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: params.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: params.name,
            description: params.description.unwrap_or_default(),
            start_time: params.start,
            end_time: params.end,
            location: params.location,
            website_url: params.website_url,
            created_at: Utc::now(),
        }
    }
}

/// Event metadata shown after a redemption.
///
/// Built from an optional [`Event`] so that a token whose event row has gone
/// missing still produces a usable confirmation instead of an error.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub website_url: Option<String>,
}

pub const FALLBACK_EVENT_NAME: &str = "the event";

impl EventSummary {
    pub fn resolve(event_id: &str, event: Option<Event>) -> Self {
        match event {
            Some(e) => Self {
                id: e.id,
                name: e.name,
                start_time: Some(e.start_time),
                end_time: Some(e.end_time),
                location: e.location,
                website_url: e.website_url,
            },
            None => Self {
                id: event_id.to_string(),
                name: FALLBACK_EVENT_NAME.to_string(),
                start_time: None,
                end_time: None,
                location: None,
                website_url: None,
            },
        }
    }

    /// Website to forward the attendee to after a successful scan, if any.
    pub fn redirect_target(&self) -> Option<&str> {
        self.website_url.as_deref().filter(|url| url.starts_with("http"))
    }
}
