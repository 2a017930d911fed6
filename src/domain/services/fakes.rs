//! In-memory port implementations for service-level unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::{
    models::{
        attendee::Attendee, event::Event, token::CheckInToken,
        check_in::{CheckIn, InsertOutcome},
        event_session::{EventSession, SeatOutcome, SessionRegistration},
    },
    ports::{AttendeeRepository, CheckInRepository, EventRepository, EventSessionRepository, TokenRepository},
};
use crate::error::AppError;

#[derive(Default)]
pub struct MemoryAttendees(pub Mutex<HashMap<String, Attendee>>);

#[async_trait]
impl AttendeeRepository for MemoryAttendees {
    async fn upsert_by_email(&self, attendee: &Attendee) -> Result<Attendee, AppError> {
        let mut map = self.0.lock().unwrap();
        if let Some(existing) = map.values_mut().find(|a| a.email == attendee.email) {
            existing.name = attendee.name.clone();
            return Ok(existing.clone());
        }
        map.insert(attendee.id.clone(), attendee.clone());
        Ok(attendee.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Attendee>, AppError> {
        Ok(self.0.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Attendee>, AppError> {
        Ok(self.0.lock().unwrap().values().find(|a| a.email == email).cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Attendee>, AppError> {
        Ok(self.0.lock().unwrap().values().take(limit as usize).cloned().collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.0.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct MemoryEvents(pub Mutex<HashMap<String, Event>>);

#[async_trait]
impl EventRepository for MemoryEvents {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        self.0.lock().unwrap().insert(event.id.clone(), event.clone());
        Ok(event.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        Ok(self.0.lock().unwrap().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }
}

/// Keyed by (attendee_id, event_id), mirroring the unique constraint of the real table.
#[derive(Default)]
pub struct MemoryTokens(pub Mutex<HashMap<(String, String), CheckInToken>>);

#[async_trait]
impl TokenRepository for MemoryTokens {
    async fn upsert(&self, token: &CheckInToken) -> Result<CheckInToken, AppError> {
        let key = (token.attendee_id.clone(), token.event_id.clone());
        self.0.lock().unwrap().insert(key, token.clone());
        Ok(token.clone())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<CheckInToken>, AppError> {
        Ok(self.0.lock().unwrap().values().find(|t| t.token == token).cloned())
    }

    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckInToken>, AppError> {
        Ok(self.0.lock().unwrap().get(&(attendee_id.to_string(), event_id.to_string())).cloned())
    }

    async fn mark_used(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(t) = self.0.lock().unwrap().values_mut().find(|t| t.token == token) {
            t.used = true;
            t.used_at = Some(at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCheckIns(pub Mutex<HashMap<(String, String), CheckIn>>);

impl MemoryCheckIns {
    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[async_trait]
impl CheckInRepository for MemoryCheckIns {
    async fn insert_if_absent(&self, check_in: &CheckIn) -> Result<InsertOutcome, AppError> {
        let key = (check_in.attendee_id.clone(), check_in.event_id.clone());
        let mut map = self.0.lock().unwrap();
        if let Some(existing) = map.get(&key) {
            return Ok(InsertOutcome::AlreadyExists(existing.clone()));
        }
        map.insert(key, check_in.clone());
        Ok(InsertOutcome::Inserted(check_in.clone()))
    }

    async fn find_by_pair(&self, attendee_id: &str, event_id: &str) -> Result<Option<CheckIn>, AppError> {
        Ok(self.0.lock().unwrap().get(&(attendee_id.to_string(), event_id.to_string())).cloned())
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<CheckIn>, AppError> {
        Ok(self.0.lock().unwrap().values().filter(|c| c.event_id == event_id).cloned().collect())
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        Ok(self.list_by_event(event_id).await?.len() as i64)
    }

    async fn count_by_event_since(&self, event_id: &str, since: DateTime<Utc>) -> Result<i64, AppError> {
        Ok(self.list_by_event(event_id).await?.iter().filter(|c| c.checked_in_at >= since).count() as i64)
    }
}

#[derive(Default)]
pub struct MemoryEventSessions {
    pub sessions: Mutex<HashMap<String, EventSession>>,
    pub registrations: Mutex<Vec<SessionRegistration>>,
}

impl MemoryEventSessions {
    pub fn seats_taken(&self, session_id: &str) -> usize {
        self.registrations.lock().unwrap().iter().filter(|r| r.session_id == session_id).count()
    }
}

#[async_trait]
impl EventSessionRepository for MemoryEventSessions {
    async fn create(&self, session: &EventSession) -> Result<EventSession, AppError> {
        self.sessions.lock().unwrap().insert(session.id.clone(), session.clone());
        Ok(session.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<EventSession>, AppError> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventSession>, AppError> {
        let mut list: Vec<EventSession> = self.sessions.lock().unwrap()
            .values().filter(|s| s.event_id == event_id).cloned().collect();
        list.sort_by_key(|s| s.start_time);
        Ok(list)
    }

    async fn registration_counts(&self, event_id: &str) -> Result<Vec<(String, i64)>, AppError> {
        let ids: Vec<String> = self.list_by_event(event_id).await?.into_iter().map(|s| s.id).collect();
        Ok(ids.into_iter()
            .map(|id| { let n = self.seats_taken(&id) as i64; (id, n) })
            .filter(|(_, n)| *n > 0)
            .collect())
    }

    async fn registered_session_ids(&self, attendee_id: &str, event_id: &str) -> Result<Vec<String>, AppError> {
        let ids: Vec<String> = self.list_by_event(event_id).await?.into_iter().map(|s| s.id).collect();
        Ok(self.registrations.lock().unwrap().iter()
            .filter(|r| r.attendee_id == attendee_id && ids.contains(&r.session_id))
            .map(|r| r.session_id.clone())
            .collect())
    }

    async fn find_registration(&self, attendee_id: &str, session_id: &str) -> Result<Option<SessionRegistration>, AppError> {
        Ok(self.registrations.lock().unwrap().iter()
            .find(|r| r.attendee_id == attendee_id && r.session_id == session_id)
            .cloned())
    }

    async fn register_seat(&self, registration: &SessionRegistration) -> Result<SeatOutcome, AppError> {
        let session = self.sessions.lock().unwrap().get(&registration.session_id).cloned()
            .ok_or(AppError::InvalidReference("Attendee or session does not exist".into()))?;
        let mut regs = self.registrations.lock().unwrap();
        if let Some(existing) = regs.iter()
            .find(|r| r.attendee_id == registration.attendee_id && r.session_id == registration.session_id)
        {
            return Ok(SeatOutcome::AlreadyRegistered(existing.clone()));
        }
        let taken = regs.iter().filter(|r| r.session_id == session.id).count() as i64;
        if session.is_full(taken) {
            return Ok(SeatOutcome::Full);
        }
        regs.push(registration.clone());
        Ok(SeatOutcome::Registered(registration.clone()))
    }

    async fn unregister(&self, attendee_id: &str, session_id: &str) -> Result<bool, AppError> {
        let mut regs = self.registrations.lock().unwrap();
        let before = regs.len();
        regs.retain(|r| !(r.attendee_id == attendee_id && r.session_id == session_id));
        Ok(regs.len() < before)
    }
}
