use axum::{
    extract::{State, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::dtos::{requests::{required, IssueTokenRequest}, responses::TokenIssuedResponse};
use crate::api::extractors::session::MaybeIdentity;
use crate::api::handlers::registration::dispatch_qr_mail;
use crate::domain::{models::token::is_well_formed, services::qr_image::render_png};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

/// Issues or rotates the token of an (attendee, event) pair; `notify` resends the QR mail.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attendee_id = required(payload.attendee_id, "attendeeId")?;
    let event_id = payload.event_id
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| state.config.default_event_id.clone());

    let identity = identity.ok_or(AppError::Unauthorized)?;
    if !identity.is_admin() && identity.attendee_id() != Some(attendee_id.as_str()) {
        return Err(AppError::Forbidden("Cannot issue tokens for another attendee".into()));
    }

    let token = state.token_issuer.issue(&attendee_id, &event_id).await?;

    if payload.notify {
        let attendee = state.attendee_repo.find_by_id(&attendee_id).await?
            .ok_or(AppError::NotFound("User not found".into()))?;
        dispatch_qr_mail(state.clone(), attendee, token.clone());
        info!(attendee_id = %attendee_id, "QR code resend requested");
    }

    Ok(Json(TokenIssuedResponse {
        success: true,
        redemption_url: state.config.redemption_url(&token.token),
        expires_at: token.expires_at,
        token: token.token,
    }))
}

pub async fn qr_image(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_well_formed(&token) {
        return Err(AppError::NotFound("QR code not found".into()));
    }
    let record = state.token_repo.find_by_token(&token).await?
        .ok_or(AppError::NotFound("QR code not found".into()))?;

    let png = render_png(&state.config.redemption_url(&record.token))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        png,
    ))
}
