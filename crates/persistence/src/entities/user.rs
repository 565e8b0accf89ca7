//! User entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row of `users`, minus the password hash which is write-only.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub licensed_devices: i32,
    pub note: String,
    pub login_verify: String,
    pub tfa_secret: String,
    pub status: i16,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
