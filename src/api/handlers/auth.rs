use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::AdminLoginRequest;
use crate::api::extractors::session::SESSION_COOKIE;
use crate::domain::models::identity::ROLE_ADMIN;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use sha2::{Sha256, Digest};
use tracing::{info, warn};

pub const ADMIN_SESSION_HOURS: i64 = 12;
pub const ATTENDEE_SESSION_DAYS: i64 = 30;

pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Fixed-length digests, so comparison time does not depend on a matching prefix.
    let given = Sha256::digest(payload.secret.as_bytes());
    let expected = Sha256::digest(state.config.admin_secret.as_bytes());
    if given != expected {
        warn!("Rejected admin login attempt");
        return Err(AppError::Unauthorized);
    }

    let session = state.identity.issue("admin", ROLE_ADMIN, chrono::Duration::hours(ADMIN_SESSION_HOURS))?;
    set_session_cookie(&cookies, session, time::Duration::hours(ADMIN_SESSION_HOURS));

    info!("Admin logged in");
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());
    Json(serde_json::json!({ "success": true }))
}

pub fn set_session_cookie(cookies: &Cookies, value: String, max_age: time::Duration) {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(max_age);
    cookies.add(cookie);
}
