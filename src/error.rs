use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Session is full")]
    SessionFull,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("Attendee is already checked in")]
    AlreadyCheckedIn,
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

// SQLite extended result codes / PostgreSQL SQLSTATE values.
const SQLITE_UNIQUE: &str = "2067";
const SQLITE_PRIMARY_KEY: &str = "1555";
const SQLITE_FOREIGN_KEY: &str = "787";
const PG_UNIQUE: &str = "23505";
const PG_FOREIGN_KEY: &str = "23503";

impl AppError {
    /// Maps a referential-integrity failure from the store onto `InvalidReference`,
    /// everything else stays a database error.
    pub fn from_write(e: sqlx::Error, what: &str) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let code = db_err.code().unwrap_or_default();
            if code == SQLITE_FOREIGN_KEY || code == PG_FOREIGN_KEY {
                return AppError::InvalidReference(format!("{} does not exist", what));
            }
        }
        AppError::Database(e)
    }

    /// True when the persistence layer itself could not be reached.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    if code == SQLITE_UNIQUE || code == SQLITE_PRIMARY_KEY || code == PG_UNIQUE {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "success": false, "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                }

                if self.is_store_unavailable() {
                    error!("Store unavailable: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Service temporarily unavailable".to_string())
                } else {
                    error!("Database error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::SessionFull => (StatusCode::BAD_REQUEST, "Session is full".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidReference(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::AlreadyCheckedIn => (StatusCode::BAD_REQUEST, "User is already checked in".to_string()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
