//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod audit;
pub mod email_log;
pub mod file_transfer;
pub mod mail_template;
pub mod user;

pub use audit::AuditEntity;
pub use email_log::EmailLogEntity;
pub use file_transfer::FileTransferEntity;
pub use mail_template::MailTemplateEntity;
pub use user::UserEntity;
