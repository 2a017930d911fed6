use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::{attendee::Attendee, check_in::CheckIn, event_session::EventSession};
use crate::domain::services::schedule::SessionOverview;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub attendee_id: String,
    pub token: String,
    pub redemption_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenIssuedResponse {
    pub success: bool,
    pub token: String,
    pub redemption_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyQrResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub redemption_url: String,
    pub qr_image_url: String,
    pub checked_in: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCheckInResponse {
    pub success: bool,
    pub check_in: CheckIn,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeListItem {
    pub id: String,
    pub name: String,
    pub email: String,
    pub checked_in: bool,
    pub registration_date: DateTime<Utc>,
}

impl AttendeeListItem {
    pub fn new(attendee: Attendee, checked_in: bool) -> Self {
        Self {
            id: attendee.id,
            name: attendee.name,
            email: attendee.email,
            checked_in,
            registration_date: attendee.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListItem {
    #[serde(flatten)]
    pub session: EventSession,
    pub registered_count: i64,
    pub is_registered: bool,
    pub is_full: bool,
}

impl From<SessionOverview> for SessionListItem {
    fn from(overview: SessionOverview) -> Self {
        Self {
            is_full: overview.session.is_full(overview.registered_count),
            registered_count: overview.registered_count,
            is_registered: overview.is_registered,
            session: overview.session,
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_attendees: i64,
    pub checked_in_attendees: i64,
    pub today_check_ins: i64,
    pub attendance_rate: i64,
}

impl StatsResponse {
    pub fn new(total_attendees: i64, checked_in_attendees: i64, today_check_ins: i64) -> Self {
        let attendance_rate = if total_attendees > 0 {
            (checked_in_attendees as f64 * 100.0 / total_attendees as f64).round() as i64
        } else {
            0
        };
        Self { total_attendees, checked_in_attendees, today_check_ins, attendance_rate }
    }
}
