use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// 32 alphanumeric characters, roughly 190 bits of entropy.
pub const TOKEN_LENGTH: usize = 32;
const MAX_ACCEPTED_LENGTH: usize = 128;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CheckInToken {
    pub token: String,
    pub attendee_id: String,
    pub event_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

impl CheckInToken {
    pub fn new(attendee_id: String, event_id: String, ttl: Duration) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let now = Utc::now();
        Self {
            token,
            attendee_id,
            event_id,
            created_at: now,
            expires_at: now + ttl,
            used: false,
            used_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Cheap shape check so obviously bogus values never reach the store.
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_ACCEPTED_LENGTH
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
