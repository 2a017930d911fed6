use axum::{
    extract::{State, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use crate::state::AppState;
use crate::domain::models::{attendee::Attendee, event::EventSummary};
use crate::domain::services::redemption::RedemptionResult;
use crate::error::AppError;
use std::sync::Arc;
use tera::Context;
use tracing::error;

/// Scan target encoded in the QR code. Holding the token is the credential.
pub async fn redeem_page(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    match state.redemption.redeem(&token).await {
        Ok(RedemptionResult::Success { attendee, event, .. }) => confirmation(&state, &attendee, &event, false),
        Ok(RedemptionResult::AlreadyCheckedIn { attendee, event, .. }) => confirmation(&state, &attendee, &event, true),
        Ok(RedemptionResult::Invalid) => failure_page(
            &state,
            StatusCode::NOT_FOUND,
            "Invalid QR Code",
            "This QR code is invalid or has expired.",
        ),
        Ok(RedemptionResult::Expired) => failure_page(
            &state,
            StatusCode::GONE,
            "Expired QR Code",
            "This QR code has expired. Ask the registration desk to send you a new one.",
        ),
        Err(e) => {
            error!("QR code processing error: {:?}", e);
            failure_page(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error",
                "There was an error processing your QR code. Please try again.",
            )
        }
    }
}

/// Same redemption for API clients (scanner apps).
pub async fn redeem_json(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.redemption.redeem(&token).await?;
    let status = match result {
        RedemptionResult::Invalid => StatusCode::NOT_FOUND,
        RedemptionResult::Expired => StatusCode::GONE,
        _ => StatusCode::OK,
    };
    Ok((status, Json(result)))
}

fn confirmation(state: &AppState, attendee: &Attendee, event: &EventSummary, already: bool) -> Response {
    if let Some(url) = event.redirect_target() {
        return Redirect::to(url).into_response();
    }

    let mut context = Context::new();
    context.insert("attendee", attendee);
    context.insert("event", event);
    context.insert("already", &already);

    render(state, "redeem_success.html", &context, StatusCode::OK)
}

fn failure_page(state: &AppState, status: StatusCode, title: &str, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("message", message);
    render(state, "redeem_failure.html", &context, status)
}

fn render(state: &AppState, template: &str, context: &Context, status: StatusCode) -> Response {
    match state.templates.render(template, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Tera render error for {}: {:?}", template, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
