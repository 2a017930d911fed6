use std::sync::Arc;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use crate::domain::{
    models::{
        attendee::Attendee,
        check_in::{CheckIn, CheckInMethod, InsertOutcome},
        event::EventSummary,
        token::is_well_formed,
    },
    ports::{AttendeeRepository, CheckInRepository, EventRepository, TokenRepository},
};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedemptionResult {
    Success {
        attendee: Attendee,
        event: EventSummary,
        #[serde(rename = "checkIn")]
        check_in: CheckIn,
    },
    AlreadyCheckedIn {
        attendee: Attendee,
        event: EventSummary,
        #[serde(rename = "checkIn")]
        check_in: CheckIn,
    },
    Invalid,
    Expired,
}

pub struct RedemptionService {
    tokens: Arc<dyn TokenRepository>,
    attendees: Arc<dyn AttendeeRepository>,
    events: Arc<dyn EventRepository>,
    check_ins: Arc<dyn CheckInRepository>,
}

impl RedemptionService {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        attendees: Arc<dyn AttendeeRepository>,
        events: Arc<dyn EventRepository>,
        check_ins: Arc<dyn CheckInRepository>,
    ) -> Self {
        Self { tokens, attendees, events, check_ins }
    }

    /// Safe to call any number of times for the same token: only the first
    /// successful call creates a check-in record.
    pub async fn redeem(&self, raw_token: &str) -> Result<RedemptionResult, AppError> {
        if !is_well_formed(raw_token) {
            return Ok(RedemptionResult::Invalid);
        }

        let Some(token) = self.tokens.find_by_token(raw_token).await? else {
            return Ok(RedemptionResult::Invalid);
        };

        let now = Utc::now();
        if token.is_expired_at(now) {
            info!(attendee_id = %token.attendee_id, "Rejected expired check-in token");
            return Ok(RedemptionResult::Expired);
        }

        let Some(attendee) = self.attendees.find_by_id(&token.attendee_id).await? else {
            warn!(attendee_id = %token.attendee_id, "Token references a missing attendee");
            return Ok(RedemptionResult::Invalid);
        };

        let event = match self.events.find_by_id(&token.event_id).await {
            Ok(event) => event,
            Err(e) => {
                warn!(event_id = %token.event_id, "Event lookup failed during redemption: {:?}", e);
                None
            }
        };
        let event = EventSummary::resolve(&token.event_id, event);

        let check_in = CheckIn::new(attendee.id.clone(), token.event_id.clone(), CheckInMethod::Scanned);

        match self.check_ins.insert_if_absent(&check_in).await? {
            InsertOutcome::Inserted(check_in) => {
                if let Err(e) = self.tokens.mark_used(&token.token, now).await {
                    warn!("Failed to mark token as used: {:?}", e);
                }
                info!(attendee_id = %attendee.id, event_id = %event.id, "Attendee checked in via QR scan");
                Ok(RedemptionResult::Success { attendee, event, check_in })
            }
            InsertOutcome::AlreadyExists(check_in) => {
                info!(attendee_id = %attendee.id, event_id = %event.id, "Repeated scan for checked-in attendee");
                Ok(RedemptionResult::AlreadyCheckedIn { attendee, event, check_in })
            }
        }
    }
}
