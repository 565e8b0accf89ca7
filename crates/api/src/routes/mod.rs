//! HTTP route handlers.

pub mod audit;
pub mod health;
pub mod mail;
pub mod users;
