//! Persistence layer for the RustDesk admin backend.
//!
//! This crate contains:
//! - Database connection management
//! - The filtered pagination query engine shared by every listing
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod query;
pub mod repositories;
