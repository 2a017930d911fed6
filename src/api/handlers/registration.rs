use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{required, EmailLookupRequest, RegisterRequest},
    responses::{MyQrResponse, RegistrationResponse},
};
use crate::api::extractors::session::CurrentAttendee;
use crate::api::handlers::auth::{set_session_cookie, ATTENDEE_SESSION_DAYS};
use crate::domain::models::{attendee::Attendee, event::EventSummary, identity::ROLE_ATTENDEE, token::CheckInToken};
use crate::domain::services::notification::QrMail;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{error, info, info_span, Instrument};

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = required(payload.name, "Name")?;
    let email = required(payload.email, "Email")?.to_lowercase();
    if !looks_like_email(&email) {
        return Err(AppError::Validation("Email is invalid".into()));
    }

    let attendee = state.attendee_repo.upsert_by_email(&Attendee::new(name, email)).await?;
    info!(attendee_id = %attendee.id, "Attendee registered");

    let event_id = state.config.default_event_id.clone();
    let token = state.token_issuer.issue(&attendee.id, &event_id).await?;

    dispatch_qr_mail(state.clone(), attendee.clone(), token.clone());

    let session = state.identity.issue(&attendee.id, ROLE_ATTENDEE, chrono::Duration::days(ATTENDEE_SESSION_DAYS))?;
    set_session_cookie(&cookies, session, time::Duration::days(ATTENDEE_SESSION_DAYS));

    Ok(Json(RegistrationResponse {
        success: true,
        message: "Registration successful! Check your email for your QR code.".to_string(),
        attendee_id: attendee.id,
        redemption_url: state.config.redemption_url(&token.token),
        token: token.token,
    }))
}

/// Re-sends the QR mail of an already registered attendee. The current token is kept while it is live.
pub async fn lookup_by_email(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailLookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = required(payload.email, "Email")?;
    let attendee = state.attendee_repo.find_by_email(&email).await?
        .ok_or(AppError::NotFound("User not found. Please register first.".into()))?;

    let token = state.token_issuer
        .ensure_redeemable(&attendee.id, &state.config.default_event_id).await?;
    info!(attendee_id = %attendee.id, "QR code requested by email");

    dispatch_qr_mail(state.clone(), attendee, token);

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Your QR code has been sent to your email",
    })))
}

pub async fn my_qr(
    State(state): State<Arc<AppState>>,
    CurrentAttendee(attendee_id): CurrentAttendee,
) -> Result<impl IntoResponse, AppError> {
    let event_id = &state.config.default_event_id;
    let token = state.token_repo.find_by_pair(&attendee_id, event_id).await?
        .ok_or(AppError::NotFound("No QR code issued yet".into()))?;
    let checked_in = state.check_in_repo.find_by_pair(&attendee_id, event_id).await?.is_some();

    Ok(Json(MyQrResponse {
        redemption_url: state.config.redemption_url(&token.token),
        qr_image_url: state.config.qr_image_url(&token.token),
        expires_at: token.expires_at,
        token: token.token,
        checked_in,
    }))
}

/// Sends the QR mail in the background; delivery problems are logged, never returned.
pub(crate) fn dispatch_qr_mail(state: Arc<AppState>, attendee: Attendee, token: CheckInToken) {
    let span = info_span!("qr_mail", attendee_id = %attendee.id, event_id = %token.event_id);

    tokio::spawn(async move {
        let event = state.event_repo.find_by_id(&token.event_id).await.ok().flatten();
        let event = EventSummary::resolve(&token.event_id, event);
        let redemption_url = state.config.redemption_url(&token.token);
        let qr_image_url = state.config.qr_image_url(&token.token);

        let mail = QrMail {
            attendee: &attendee,
            event_name: &event.name,
            redemption_url: &redemption_url,
            qr_image_url: &qr_image_url,
        };
        if let Err(e) = state.notifications.send_qr_mail(mail).await {
            error!("QR mail delivery failed: {}", e);
        }
    }.instrument(span));
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::looks_like_email;

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada.example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@localhost"));
        assert!(!looks_like_email("ada lovelace@example.com"));
    }
}
