//! Remote-control connection audit records.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One connection audit entry reported by a relay client.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionAudit {
    pub id: i64,
    pub conn_id: i64,
    pub rustdesk_id: String,
    pub ip: String,
    pub session_id: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub audit_type: i32,
    #[serde(serialize_with = "shared::time::canonical::serialize")]
    pub created_at: DateTime<Utc>,
}
