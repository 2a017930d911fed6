pub mod attendee;
pub mod check_in;
pub mod event;
pub mod event_session;
pub mod identity;
pub mod token;
