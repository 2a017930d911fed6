use std::sync::Arc;
use tracing::info;
use crate::domain::{
    models::check_in::{CheckIn, CheckInMethod, InsertOutcome},
    ports::{AttendeeRepository, CheckInRepository},
    services::token_issuer::TokenIssuer,
};
use crate::error::AppError;

/// Administrative check-in without a token.
///
/// Unlike a QR scan, a repeated check-in here is reported as
/// `AppError::AlreadyCheckedIn` so the operator notices.
pub struct ManualCheckInService {
    attendees: Arc<dyn AttendeeRepository>,
    check_ins: Arc<dyn CheckInRepository>,
    issuer: Arc<TokenIssuer>,
}

impl ManualCheckInService {
    pub fn new(
        attendees: Arc<dyn AttendeeRepository>,
        check_ins: Arc<dyn CheckInRepository>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self { attendees, check_ins, issuer }
    }

    pub async fn check_in(&self, attendee_id: &str, event_id: &str) -> Result<CheckIn, AppError> {
        let attendee = self.attendees.find_by_id(attendee_id).await?
            .ok_or(AppError::NotFound("User not found".into()))?;

        // The pair must hold a live token before it is checked in.
        self.issuer.ensure_redeemable(&attendee.id, event_id).await?;

        let check_in = CheckIn::new(attendee.id.clone(), event_id.to_string(), CheckInMethod::Manual);
        match self.check_ins.insert_if_absent(&check_in).await? {
            InsertOutcome::Inserted(created) => {
                info!(attendee_id = %attendee.id, event_id, "Manual check-in recorded");
                Ok(created)
            }
            InsertOutcome::AlreadyExists(_) => Err(AppError::AlreadyCheckedIn),
        }
    }
}
