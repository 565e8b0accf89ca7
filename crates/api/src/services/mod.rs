//! Application services.

pub mod admin_bootstrap;
pub mod email;

pub use admin_bootstrap::{bootstrap_admin, BootstrapOutcome};
pub use email::{EmailError, EmailService, MailTransport};
