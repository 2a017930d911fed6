use std::sync::Arc;
use chrono::Duration;
use tracing::info;
use crate::domain::{models::token::CheckInToken, ports::TokenRepository};
use crate::error::AppError;

/// Creates or rotates the single check-in token of an (attendee, event) pair.
pub struct TokenIssuer {
    repo: Arc<dyn TokenRepository>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(repo: Arc<dyn TokenRepository>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    /// Existence of the attendee and event is left to the store's foreign keys,
    /// which surface as `AppError::InvalidReference`.
    pub async fn issue(&self, attendee_id: &str, event_id: &str) -> Result<CheckInToken, AppError> {
        let token = CheckInToken::new(attendee_id.to_string(), event_id.to_string(), self.ttl);
        let stored = self.repo.upsert(&token).await?;
        info!(attendee_id, event_id, expires_at = %stored.expires_at, "Issued check-in token");
        Ok(stored)
    }

    /// Returns the current token when it can still be redeemed, otherwise issues a fresh one.
    pub async fn ensure_redeemable(&self, attendee_id: &str, event_id: &str) -> Result<CheckInToken, AppError> {
        match self.repo.find_by_pair(attendee_id, event_id).await? {
            Some(existing) if !existing.is_expired_at(chrono::Utc::now()) => Ok(existing),
            _ => self.issue(attendee_id, event_id).await,
        }
    }
}
