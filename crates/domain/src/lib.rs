//! Domain layer for the RustDesk admin backend.
//!
//! This crate contains:
//! - Domain models for users, connection audits, file transfers and mail logs
//! - Request payloads accepted by the admin endpoints

pub mod models;
