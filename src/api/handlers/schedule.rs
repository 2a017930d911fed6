use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{required, CreateSessionRequest, SessionListQuery},
    responses::SessionListItem,
};
use crate::api::extractors::session::{AdminUser, CurrentAttendee, MaybeIdentity};
use crate::domain::models::event_session::{EventSession, NewSessionParams};
use crate::error::AppError;
use std::sync::Arc;

/// Sessions of an event with live seat counts; `isRegistered` reflects the caller's own seats.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    MaybeIdentity(identity): MaybeIdentity,
    Query(query): Query<SessionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event_id = query.event_id
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| state.config.default_event_id.clone());
    let viewer = identity.as_ref().and_then(|i| i.attendee_id());

    let sessions: Vec<SessionListItem> = state.schedule
        .overview(&event_id, viewer).await?
        .into_iter()
        .map(SessionListItem::from)
        .collect();

    Ok(Json(serde_json::json!({ "success": true, "sessions": sessions })))
}

pub async fn register_for_session(
    State(state): State<Arc<AppState>>,
    CurrentAttendee(attendee_id): CurrentAttendee,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state.schedule.register(&attendee_id, &session_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "registration": registration })))
}

pub async fn unregister_from_session(
    State(state): State<Arc<AppState>>,
    CurrentAttendee(attendee_id): CurrentAttendee,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.schedule.unregister(&attendee_id, &session_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = required(payload.title, "Title")?;
    if payload.end_time < payload.start_time {
        return Err(AppError::Validation("Session cannot end before it starts".into()));
    }
    if payload.max_capacity.is_some_and(|cap| cap <= 0) {
        return Err(AppError::Validation("Capacity must be positive".into()));
    }

    let session = EventSession::new(NewSessionParams {
        event_id,
        title,
        description: payload.description,
        speaker: payload.speaker,
        location: payload.location,
        start: payload.start_time,
        end: payload.end_time,
        max_capacity: payload.max_capacity,
    });
    let created = state.schedule.create_session(session).await?;
    Ok(Json(created))
}
