//! File transfer records.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FileTransfer {
    pub id: i64,
    pub rustdesk_id: String,
    pub peer_id: String,
    pub path: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub transfer_type: i32,
    #[serde(serialize_with = "shared::time::canonical::serialize")]
    pub created_at: DateTime<Utc>,
}
