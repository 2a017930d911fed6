use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::identity::Identity;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

pub const SESSION_COOKIE: &str = "session";

fn resolve_identity(parts: &Parts, state: &AppState) -> Result<Option<Identity>, StatusCode> {
    let cookies = parts.extensions.get::<Cookies>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    Ok(state.identity.resolve(cookie.value()))
}

/// Any session, or none at all.
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let identity = resolve_identity(parts, &app_state)?;

        if let Some(id) = identity.as_ref().and_then(|i| i.attendee_id()) {
            Span::current().record("attendee_id", id);
        }
        Ok(MaybeIdentity(identity))
    }
}

pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let identity = resolve_identity(parts, &app_state)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if !identity.is_admin() {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(AdminUser(identity))
    }
}

/// The attendee behind the session; replaces any notion of a fixed demo user.
pub struct CurrentAttendee(pub String);

impl<S> FromRequestParts<S> for CurrentAttendee
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let identity = resolve_identity(parts, &app_state)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let attendee_id = identity.attendee_id()
            .ok_or(StatusCode::FORBIDDEN)?
            .to_string();

        Span::current().record("attendee_id", attendee_id.as_str());
        Ok(CurrentAttendee(attendee_id))
    }
}
