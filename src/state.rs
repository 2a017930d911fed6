use std::sync::Arc;
use chrono::Duration;
use tera::Tera;
use crate::config::Config;
use crate::domain::ports::{
    AttendeeRepository, CheckInRepository, EmailService, EventRepository,
    EventSessionRepository, IdentityResolver, TokenRepository,
};
use crate::domain::services::{
    manual_check_in::ManualCheckInService, notification::NotificationService,
    redemption::RedemptionService, schedule::ScheduleService, token_issuer::TokenIssuer,
};

pub struct Repositories {
    pub attendees: Arc<dyn AttendeeRepository>,
    pub events: Arc<dyn EventRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub check_ins: Arc<dyn CheckInRepository>,
    pub sessions: Arc<dyn EventSessionRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub token_repo: Arc<dyn TokenRepository>,
    pub check_in_repo: Arc<dyn CheckInRepository>,
    pub identity: Arc<dyn IdentityResolver>,
    pub token_issuer: Arc<TokenIssuer>,
    pub redemption: Arc<RedemptionService>,
    pub manual_check_in: Arc<ManualCheckInService>,
    pub notifications: Arc<NotificationService>,
    pub schedule: Arc<ScheduleService>,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn assemble(
        config: Config,
        repos: Repositories,
        email_service: Arc<dyn EmailService>,
        identity: Arc<dyn IdentityResolver>,
        templates: Arc<Tera>,
    ) -> Self {
        let token_issuer = Arc::new(TokenIssuer::new(
            repos.tokens.clone(),
            Duration::days(config.token_ttl_days),
        ));
        let redemption = Arc::new(RedemptionService::new(
            repos.tokens.clone(),
            repos.attendees.clone(),
            repos.events.clone(),
            repos.check_ins.clone(),
        ));
        let manual_check_in = Arc::new(ManualCheckInService::new(
            repos.attendees.clone(),
            repos.check_ins.clone(),
            token_issuer.clone(),
        ));
        let notifications = Arc::new(NotificationService::new(email_service, templates.clone()));
        let schedule = Arc::new(ScheduleService::new(repos.events.clone(), repos.sessions));

        Self {
            config,
            attendee_repo: repos.attendees,
            event_repo: repos.events,
            token_repo: repos.tokens,
            check_in_repo: repos.check_ins,
            identity,
            token_issuer,
            redemption,
            manual_check_in,
            notifications,
            schedule,
            templates,
        }
    }
}
