pub mod sqlite_attendee_repo;
pub mod sqlite_event_repo;
pub mod sqlite_token_repo;
pub mod sqlite_check_in_repo;
pub mod sqlite_event_session_repo;

pub mod postgres_attendee_repo;
pub mod postgres_event_repo;
pub mod postgres_token_repo;
pub mod postgres_check_in_repo;
pub mod postgres_event_session_repo;
