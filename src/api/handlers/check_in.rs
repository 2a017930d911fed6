use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{requests::{required, ManualCheckInRequest}, responses::ManualCheckInResponse};
use crate::api::extractors::session::AdminUser;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn manual_check_in(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<ManualCheckInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attendee_id = required(payload.attendee_id, "User ID")?;
    let event_id = payload.event_id
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| state.config.default_event_id.clone());

    info!(attendee_id = %attendee_id, event_id = %event_id, "Manual check-in requested");
    let check_in = state.manual_check_in.check_in(&attendee_id, &event_id).await?;

    Ok(Json(ManualCheckInResponse { success: true, check_in }))
}
