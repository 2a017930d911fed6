use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::{
    models::event_session::{EventSession, SeatOutcome, SessionRegistration},
    ports::{EventRepository, EventSessionRepository},
};
use crate::error::AppError;

/// A session together with its live seat count, as seen by one viewer.
pub struct SessionOverview {
    pub session: EventSession,
    pub registered_count: i64,
    pub is_registered: bool,
}

/// Seat bookings for the talks and workshops of an event.
pub struct ScheduleService {
    events: Arc<dyn EventRepository>,
    sessions: Arc<dyn EventSessionRepository>,
}

impl ScheduleService {
    pub fn new(events: Arc<dyn EventRepository>, sessions: Arc<dyn EventSessionRepository>) -> Self {
        Self { events, sessions }
    }

    pub async fn create_session(&self, session: EventSession) -> Result<EventSession, AppError> {
        self.events.find_by_id(&session.event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        let created = self.sessions.create(&session).await?;
        info!(session_id = %created.id, event_id = %created.event_id, "Session created");
        Ok(created)
    }

    pub async fn overview(&self, event_id: &str, viewer: Option<&str>) -> Result<Vec<SessionOverview>, AppError> {
        let sessions = self.sessions.list_by_event(event_id).await?;
        let counts: HashMap<String, i64> = self.sessions.registration_counts(event_id).await?.into_iter().collect();
        let mine: HashSet<String> = match viewer {
            Some(attendee_id) => self.sessions.registered_session_ids(attendee_id, event_id).await?.into_iter().collect(),
            None => HashSet::new(),
        };

        Ok(sessions
            .into_iter()
            .map(|session| SessionOverview {
                registered_count: counts.get(&session.id).copied().unwrap_or(0),
                is_registered: mine.contains(&session.id),
                session,
            })
            .collect())
    }

    /// Registering twice for the same session returns the existing seat.
    pub async fn register(&self, attendee_id: &str, session_id: &str) -> Result<SessionRegistration, AppError> {
        self.sessions.find_by_id(session_id).await?
            .ok_or(AppError::NotFound("Session not found".into()))?;

        let seat = SessionRegistration::new(attendee_id.to_string(), session_id.to_string());
        match self.sessions.register_seat(&seat).await? {
            SeatOutcome::Registered(created) => {
                info!(attendee_id, session_id, "Seat taken");
                Ok(created)
            }
            SeatOutcome::AlreadyRegistered(existing) => Ok(existing),
            SeatOutcome::Full => {
                warn!(attendee_id, session_id, "Session full");
                Err(AppError::SessionFull)
            }
        }
    }

    pub async fn unregister(&self, attendee_id: &str, session_id: &str) -> Result<(), AppError> {
        self.sessions.find_by_id(session_id).await?
            .ok_or(AppError::NotFound("Session not found".into()))?;
        if self.sessions.unregister(attendee_id, session_id).await? {
            info!(attendee_id, session_id, "Seat released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::domain::models::{event::{Event, NewEventParams}, event_session::NewSessionParams};
    use crate::domain::services::fakes::{MemoryEventSessions, MemoryEvents};

    async fn setup(max_capacity: Option<i32>) -> (ScheduleService, Arc<MemoryEventSessions>, String) {
        let events = Arc::new(MemoryEvents::default());
        events.create(&Event::new(NewEventParams {
            id: Some("e1".into()),
            name: "Conf".into(),
            description: None,
            start: Utc::now(),
            end: Utc::now() + Duration::days(1),
            location: None,
            website_url: None,
        })).await.unwrap();

        let sessions = Arc::new(MemoryEventSessions::default());
        let service = ScheduleService::new(events, sessions.clone());
        let created = service.create_session(EventSession::new(NewSessionParams {
            event_id: "e1".into(),
            title: "Workshop".into(),
            description: None,
            speaker: None,
            location: None,
            start: Utc::now(),
            end: Utc::now() + Duration::hours(2),
            max_capacity,
        })).await.unwrap();
        (service, sessions, created.id)
    }

    #[tokio::test]
    async fn rejects_when_full() {
        let (service, sessions, id) = setup(Some(1)).await;
        service.register("a1", &id).await.unwrap();

        let err = service.register("a2", &id).await.unwrap_err();
        assert!(matches!(err, AppError::SessionFull));
        assert_eq!(sessions.seats_taken(&id), 1);
    }

    #[tokio::test]
    async fn second_registration_keeps_the_seat() {
        let (service, sessions, id) = setup(Some(1)).await;
        let first = service.register("a1", &id).await.unwrap();
        let again = service.register("a1", &id).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(sessions.seats_taken(&id), 1);
    }

    #[tokio::test]
    async fn unregister_frees_the_seat() {
        let (service, _, id) = setup(Some(1)).await;
        service.register("a1", &id).await.unwrap();
        service.unregister("a1", &id).await.unwrap();
        service.unregister("a1", &id).await.unwrap();
        service.register("a2", &id).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (service, _, _) = setup(None).await;
        assert!(matches!(service.register("a1", "missing").await.unwrap_err(), AppError::NotFound(_)));
        assert!(matches!(service.unregister("a1", "missing").await.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn overview_marks_viewer_seats() {
        let (service, _, id) = setup(None).await;
        service.register("a1", &id).await.unwrap();
        service.register("a2", &id).await.unwrap();

        let seen = service.overview("e1", Some("a1")).await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].registered_count, 2);
        assert!(seen[0].is_registered);

        let anonymous = service.overview("e1", None).await.unwrap();
        assert!(!anonymous[0].is_registered);
    }

    #[tokio::test]
    async fn session_needs_existing_event() {
        let (service, _, _) = setup(None).await;
        let orphan = EventSession::new(NewSessionParams {
            event_id: "nope".into(),
            title: "Lost".into(),
            description: None,
            speaker: None,
            location: None,
            start: Utc::now(),
            end: Utc::now(),
            max_capacity: None,
        });
        assert!(matches!(service.create_session(orphan).await.unwrap_err(), AppError::NotFound(_)));
    }
}
