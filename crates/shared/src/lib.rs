//! Shared utilities and common types for the RustDesk admin backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Page coordinates and result pages for listing endpoints
//! - Password hashing with Argon2id
//! - Time-based one-time passwords for two-factor login
//! - Canonical timestamp formatting

pub mod pagination;
pub mod password;
pub mod time;
pub mod totp;
