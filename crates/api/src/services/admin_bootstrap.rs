//! First administrator account.
//!
//! On an empty `users` table, creates the bootstrap admin from
//! `admin.bootstrap_username`. When no password is configured a random one
//! is generated and logged once.

use domain::models::{UserForm, UserStatus};
use persistence::repositories::UserRepository;
use shared::password::{hash_password, PasswordError};
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

const GENERATED_PASSWORD_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Not configured, or accounts already exist.
    Skipped,
    Created { id: i64, generated_password: bool },
}

/// Idempotent: does nothing once any account exists.
pub async fn bootstrap_admin(
    users: &UserRepository,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if config.bootstrap_username.is_empty() {
        return Ok(BootstrapOutcome::Skipped);
    }

    if !users.is_empty().await? {
        info!("Accounts already exist - skipping admin bootstrap");
        return Ok(BootstrapOutcome::Skipped);
    }

    let generated_password = config.bootstrap_password.is_empty();
    let password = if generated_password {
        generate_password()
    } else {
        config.bootstrap_password.clone()
    };

    let form = bootstrap_form(&config.bootstrap_username);
    let id = users.insert(&form, &hash_password(&password)?).await?;

    info!(username = %form.username, user_id = id, "Bootstrap admin created");
    if generated_password {
        warn!(
            "SECURITY: generated bootstrap admin password: {} - change it after first login",
            password
        );
    }

    Ok(BootstrapOutcome::Created {
        id,
        generated_password,
    })
}

fn bootstrap_form(username: &str) -> UserForm {
    let mut form = UserForm {
        username: username.to_string(),
        status: UserStatus::Normal.as_i16(),
        is_admin: true,
        ..Default::default()
    };
    form.normalize();
    form
}

fn generate_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
    let mut rng = rand::thread_rng();

    (0..GENERATED_PASSWORD_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
