//! Repository implementations for database operations.
//!
//! Listing repositories declare a static descriptor and filter list and
//! delegate to [`crate::query::list_page`].

pub mod audit;
pub mod email_log;
pub mod mail_template;
pub mod user;

pub use audit::AuditRepository;
pub use email_log::{EmailLogRepository, NewEmailLog};
pub use mail_template::MailTemplateRepository;
pub use user::UserRepository;
