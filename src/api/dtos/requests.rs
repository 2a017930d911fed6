use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    pub attendee_id: Option<String>,
    pub event_id: Option<String>,
    #[serde(default)]
    pub notify: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCheckInRequest {
    pub attendee_id: Option<String>,
    pub event_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub secret: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Deserialize)]
pub struct EmailLookupRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub speaker: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub event_id: Option<String>,
}

/// Trims the value and rejects it when absent or blank.
pub fn required(value: Option<String>, field: &str) -> Result<String, crate::error::AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| crate::error::AppError::Validation(format!("{} is required", field)))
}
