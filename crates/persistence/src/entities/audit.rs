//! Connection audit entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row of `audits`.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntity {
    pub id: i64,
    pub conn_id: i64,
    pub rustdesk_id: String,
    pub ip: String,
    pub session_id: String,
    pub uuid: String,

    /// Connection kind reported by the relay client.
    #[sqlx(rename = "type")]
    pub audit_type: i32,

    pub created_at: DateTime<Utc>,

    /// Set once the relay reports the connection closed.
    pub closed_at: Option<DateTime<Utc>>,
}
