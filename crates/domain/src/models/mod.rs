//! Domain models for the admin backend.

pub mod audit;
pub mod email;
pub mod file_transfer;
pub mod user;

pub use audit::ConnectionAudit;
pub use email::{EmailLog, MailSendStatus, MailTemplate, SendMailRequest};
pub use file_transfer::FileTransfer;
pub use user::{
    DeleteUsersRequest, LoginVerify, TotpRequest, TotpResponse, User, UserForm, UserStatus,
    BOOTSTRAP_ADMIN_ID,
};
