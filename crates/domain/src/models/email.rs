//! Mail templates, delivery log entries and the send request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Delivery outcome stored in `email_logs.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailSendStatus {
    Failed,
    Sent,
}

impl MailSendStatus {
    pub fn as_i16(&self) -> i16 {
        match self {
            MailSendStatus::Failed => 0,
            MailSendStatus::Sent => 1,
        }
    }
}

/// A stored mail template. `contents` is HTML with literal placeholders.
#[derive(Debug, Clone)]
pub struct MailTemplate {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub contents: String,
}

impl MailTemplate {
    /// Replaces every occurrence of each variable key with its value.
    ///
    /// Keys are matched literally, so callers choose the placeholder syntax
    /// (`{{code}}`, `%name%`, ...).
    pub fn render(&self, vars: &HashMap<String, String>) -> String {
        // Longer keys first so `{{user}}` cannot clobber part of `{{username}}`.
        let mut keys: Vec<&String> = vars.keys().filter(|k| !k.is_empty()).collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        keys.into_iter().fold(self.contents.clone(), |body, key| {
            body.replace(key.as_str(), &vars[key])
        })
    }
}

/// Mail log record as returned by the mail log listing.
#[derive(Debug, Clone, Serialize)]
pub struct EmailLog {
    pub id: i64,
    pub user_id: i64,
    pub tpl_id: i64,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub status: i16,
    pub logs: String,
    #[serde(serialize_with = "shared::time::canonical::serialize")]
    pub created_at: DateTime<Utc>,
}

/// Payload of `mail/send`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMailRequest {
    #[serde(default)]
    pub user_id: i64,

    pub tpl_id: i64,

    #[validate(email(message = "Invalid recipient email address"))]
    pub to: String,

    #[serde(default)]
    pub vars: HashMap<String, String>,
}
