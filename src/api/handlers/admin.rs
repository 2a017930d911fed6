use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::CreateEventRequest, responses::{AttendeeListItem, StatsResponse}};
use crate::api::extractors::session::AdminUser;
use crate::domain::models::event::{Event, NewEventParams};
use crate::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use chrono::{NaiveTime, Utc};
use tracing::info;

const ATTENDEE_LIST_LIMIT: i64 = 100;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Event name is required".into()));
    }
    if payload.end_time < payload.start_time {
        return Err(AppError::Validation("Event cannot end before it starts".into()));
    }

    let event = Event::new(NewEventParams {
        id: payload.id.filter(|id| !id.trim().is_empty()),
        name: payload.name.trim().to_string(),
        description: payload.description,
        start: payload.start_time,
        end: payload.end_time,
        location: payload.location,
        website_url: payload.website_url,
    });
    let created = state.event_repo.create(&event).await?;

    info!(event_id = %created.id, "Event created");
    Ok(Json(created))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list().await?;
    Ok(Json(events))
}

pub async fn list_attendees(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let attendees = state.attendee_repo.list_recent(ATTENDEE_LIST_LIMIT).await?;
    let checked_in: HashSet<String> = state.check_in_repo
        .list_by_event(&state.config.default_event_id).await?
        .into_iter()
        .map(|c| c.attendee_id)
        .collect();

    let items: Vec<AttendeeListItem> = attendees
        .into_iter()
        .map(|a| {
            let is_in = checked_in.contains(&a.id);
            AttendeeListItem::new(a, is_in)
        })
        .collect();

    Ok(Json(serde_json::json!({ "success": true, "users": items })))
}

pub async fn list_check_ins(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let check_ins = state.check_in_repo.list_by_event(&event_id).await?;
    Ok(Json(check_ins))
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let event_id = &state.config.default_event_id;
    let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

    let total = state.attendee_repo.count().await?;
    let checked_in = state.check_in_repo.count_by_event(event_id).await?;
    let today = state.check_in_repo.count_by_event_since(event_id, start_of_day).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "stats": StatsResponse::new(total, checked_in, today),
    })))
}
