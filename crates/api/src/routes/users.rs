//! User management endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use domain::models::{DeleteUsersRequest, TotpRequest, TotpResponse, User, UserForm, UserStatus};
use persistence::repositories::UserRepository;
use shared::pagination::Page;
use shared::password::hash_password;
use shared::totp;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ListParams;
use crate::response::{success, success_message, Envelope};

/// GET /admin/users/list
///
/// Filters: `username`, `name` (substring), `email`, `admin_status`,
/// `status` and a `created_at[0..1]` range.
pub async fn list(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Envelope<Page<User>>>, ApiError> {
    let page = UserRepository::new(state.pool.clone())
        .list(&params.filters, params.page)
        .await?;
    Ok(success(page, "ok"))
}

/// POST /admin/users/add
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<UserForm>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let Json(mut form) = payload?;
    form.validate()?;
    check_status(&form)?;

    if form.username.is_empty() {
        return Err(ApiError::Validation("UsernameEmpty".into()));
    }

    let users = UserRepository::new(state.pool.clone());
    if users.exists_by_username(&form.username).await? {
        return Err(ApiError::Conflict("UserExists".into()));
    }

    if form.password.is_empty() {
        return Err(ApiError::Validation("PasswordEmpty".into()));
    }

    form.normalize();
    if form.requires_tfa() {
        if !totp::verify_now(&form.tfa_secret, &form.tfa_code) {
            return Err(ApiError::Validation("TFA_Validate_Err".into()));
        }
    } else {
        form.tfa_secret.clear();
    }

    let password_hash = hash_password(&form.password)?;
    let id = users.insert(&form, &password_hash).await?;

    info!(user_id = id, username = %form.username, "User added");
    Ok(success_message("UserAddSuccess"))
}

/// POST /admin/users/edit
///
/// Empty fields keep their stored value. A new TOTP secret is only stored
/// after its code checks out.
pub async fn edit(
    State(state): State<AppState>,
    payload: Result<Json<UserForm>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let Json(mut form) = payload?;
    if form.id <= 0 {
        return Err(ApiError::Validation("DataError".into()));
    }
    form.validate()?;
    check_status(&form)?;
    form.normalize();

    let users = UserRepository::new(state.pool.clone());
    let stored = users
        .find_by_id(form.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("UserNotFound".into()))?;

    let password_hash = if form.password.is_empty() {
        None
    } else {
        Some(hash_password(&form.password)?)
    };

    let tfa_secret = if form.requires_tfa() && form.tfa_secret != stored.tfa_secret {
        if !totp::verify_now(&form.tfa_secret, &form.tfa_code) {
            return Err(ApiError::Validation("TFA_Validate_Err".into()));
        }
        Some(form.tfa_secret.as_str())
    } else {
        None
    };

    users
        .update(&form, password_hash.as_deref(), tfa_secret)
        .await?;

    info!(user_id = form.id, "User updated");
    Ok(success_message("UserUpdateSuccess"))
}

fn check_status(form: &UserForm) -> Result<(), ApiError> {
    match UserStatus::from_i16(form.status) {
        Some(_) => Ok(()),
        None => Err(ApiError::Validation("DataError".into())),
    }
}

/// POST /admin/users/delete
///
/// The bootstrap admin is silently kept.
pub async fn delete(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUsersRequest>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let Json(request) = payload?;
    let ids = request.deletable_ids();
    let deleted = UserRepository::new(state.pool.clone())
        .delete_many(&ids)
        .await?;

    info!(requested = request.ids.len(), deleted, "Users deleted");
    Ok(success_message("UserDeleteSuccess"))
}

/// POST /admin/users/totp
///
/// Generates a fresh secret for `username`. Nothing is stored until the
/// admin confirms it through add or edit.
pub async fn totp(
    State(state): State<AppState>,
    payload: Result<Json<TotpRequest>, JsonRejection>,
) -> Result<Json<Envelope<TotpResponse>>, ApiError> {
    let Json(request) = payload?;
    let enrollment = totp::enroll(&state.config.totp.issuer, &request.username)?;
    Ok(success(
        TotpResponse {
            url: enrollment.uri,
            key: enrollment.secret,
        },
        "ok",
    ))
}
