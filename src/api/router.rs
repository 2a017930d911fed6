use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, registration, token, redemption, check_in, admin, schedule};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Scan targets (unauthenticated, the token is the credential)
        .route("/redeem/{token}", get(redemption::redeem_page))
        .route("/qr/{token}", get(redemption::redeem_page))
        .route("/api/v1/redeem/{token}", get(redemption::redeem_json))
        .route("/api/v1/qr/image/{token}", get(token::qr_image))

        // Attendee
        .route("/api/v1/register", post(registration::register))
        .route("/api/v1/login", post(registration::lookup_by_email))
        .route("/api/v1/me/qr", get(registration::my_qr))
        .route("/api/v1/tokens", post(token::issue_token))
        .route("/api/v1/sessions", get(schedule::list_sessions))
        .route(
            "/api/v1/sessions/{session_id}/registration",
            post(schedule::register_for_session).delete(schedule::unregister_from_session),
        )

        // Auth
        .route("/api/v1/admin/login", post(auth::admin_login))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Admin
        .route("/api/v1/admin/checkin", post(check_in::manual_check_in))
        .route("/api/v1/admin/events", get(admin::list_events).post(admin::create_event))
        .route("/api/v1/admin/events/{event_id}/checkins", get(admin::list_check_ins))
        .route("/api/v1/admin/events/{event_id}/sessions", post(schedule::create_session))
        .route("/api/v1/admin/attendees", get(admin::list_attendees))
        .route("/api/v1/admin/stats", get(admin::stats))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        attendee_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
