pub mod admin;
pub mod auth;
pub mod check_in;
pub mod health;
pub mod redemption;
pub mod registration;
pub mod schedule;
pub mod token;
