//! File transfer entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct FileTransferEntity {
    pub id: i64,
    pub rustdesk_id: String,
    pub peer_id: String,
    pub path: String,
    pub uuid: String,
    #[sqlx(rename = "type")]
    pub transfer_type: i32,
    pub created_at: DateTime<Utc>,
}
