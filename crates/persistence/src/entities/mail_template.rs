//! Mail template entity.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MailTemplateEntity {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub contents: String,
}
