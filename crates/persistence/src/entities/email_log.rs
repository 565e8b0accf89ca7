//! Email log entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Listing row of `email_logs`. The rendered body is only loaded on demand.
#[derive(Debug, Clone, FromRow)]
pub struct EmailLogEntity {
    pub id: i64,
    pub user_id: i64,
    pub tpl_id: i64,
    pub from_email: String,
    pub to_email: String,
    pub subject: String,
    pub status: i16,

    /// Delivery diagnostics, empty on success.
    pub logs: String,

    pub created_at: DateTime<Utc>,
}
