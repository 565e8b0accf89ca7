//! Admin-managed user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// The account created at install time. It can never be deleted.
pub const BOOTSTRAP_ADMIN_ID: i64 = 1;

/// Second factor required at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginVerify {
    EmailCheck,
    TfaCheck,
    AccessToken,
}

impl LoginVerify {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginVerify::EmailCheck => "email_check",
            LoginVerify::TfaCheck => "tfa_check",
            LoginVerify::AccessToken => "access_token",
        }
    }
}

impl FromStr for LoginVerify {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_check" => Ok(LoginVerify::EmailCheck),
            "tfa_check" => Ok(LoginVerify::TfaCheck),
            "access_token" => Ok(LoginVerify::AccessToken),
            _ => Err(format!("Unknown login verification: {}", s)),
        }
    }
}

impl fmt::Display for LoginVerify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status as stored in `users.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Unverified,
    Disabled,
    Normal,
}

impl UserStatus {
    pub fn as_i16(&self) -> i16 {
        match self {
            UserStatus::Unverified => -1,
            UserStatus::Disabled => 0,
            UserStatus::Normal => 1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            -1 => Some(UserStatus::Unverified),
            0 => Some(UserStatus::Disabled),
            1 => Some(UserStatus::Normal),
            _ => None,
        }
    }
}

/// User record as returned by the user listing. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct User {
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
    #[serde(serialize_with = "shared::time::canonical::serialize")]
    pub created_at: DateTime<Utc>,
}

/// Payload of `users/add` and `users/edit`.
///
/// Missing fields default to their zero value, matching what the admin UI
/// sends for untouched inputs.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserForm {
    pub id: i64,

    #[validate(length(max = 50, message = "Username must be at most 50 characters"))]
    pub username: String,

    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: String,

    #[validate(length(max = 255, message = "Note must be at most 255 characters"))]
    pub note: String,

    pub licensed_devices: i32,

    #[validate(length(max = 20, message = "Login verification must be at most 20 characters"))]
    pub login_verify: String,

    pub tfa_secret: String,

    pub tfa_code: String,

    pub status: i16,

    pub is_admin: bool,
}

impl UserForm {
    /// Applies the defaults shared by add and edit: an empty display name
    /// falls back to the username and the device quota is never negative.
    pub fn normalize(&mut self) {
        if self.name.is_empty() {
            self.name = self.username.clone();
        }
        if self.licensed_devices < 0 {
            self.licensed_devices = 0;
        }
    }

    /// Whether the form asks for TOTP as the login second factor.
    pub fn requires_tfa(&self) -> bool {
        self.login_verify.parse::<LoginVerify>() == Ok(LoginVerify::TfaCheck)
    }
}

/// Payload of `users/delete`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteUsersRequest {
    pub ids: Vec<i64>,
}

impl DeleteUsersRequest {
    /// Requested ids without the bootstrap admin.
    pub fn deletable_ids(&self) -> Vec<i64> {
        self.ids
            .iter()
            .copied()
            .filter(|id| *id != BOOTSTRAP_ADMIN_ID)
            .collect()
    }
}

/// Payload of `users/totp`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TotpRequest {
    pub username: String,
}

/// Enrollment data shown to the admin as a QR code and a raw key.
#[derive(Debug, Clone, Serialize)]
pub struct TotpResponse {
    pub url: String,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fake::faker::internet::en::Username;
    use fake::Fake;

    #[test]
    fn test_login_verify_roundtrip() {
        for v in [
            LoginVerify::EmailCheck,
            LoginVerify::TfaCheck,
            LoginVerify::AccessToken,
        ] {
            assert_eq!(v.as_str().parse::<LoginVerify>(), Ok(v));
        }
        assert!("sms".parse::<LoginVerify>().is_err());
    }

    #[test]
    fn test_user_status_values() {
        assert_eq!(UserStatus::from_i16(-1), Some(UserStatus::Unverified));
        assert_eq!(UserStatus::from_i16(0), Some(UserStatus::Disabled));
        assert_eq!(UserStatus::Normal.as_i16(), 1);
        assert_eq!(UserStatus::from_i16(7), None);
    }

    #[test]
    fn test_form_defaults_when_fields_missing() {
        let form: UserForm = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert_eq!(form.id, 0);
        assert_eq!(form.password, "");
        assert!(!form.is_admin);
    }

    #[test]
    fn test_normalize_fills_name_and_clamps_devices() {
        let username: String = Username().fake();
        let mut form = UserForm {
            username: username.clone(),
            licensed_devices: -3,
            ..Default::default()
        };
        form.normalize();
        assert_eq!(form.name, username);
        assert_eq!(form.licensed_devices, 0);
    }

    #[test]
    fn test_normalize_keeps_explicit_name() {
        let mut form = UserForm {
            username: "alice".into(),
            name: "Alice Liddell".into(),
            licensed_devices: 4,
            ..Default::default()
        };
        form.normalize();
        assert_eq!(form.name, "Alice Liddell");
        assert_eq!(form.licensed_devices, 4);
    }

    #[test]
    fn test_requires_tfa() {
        let mut form = UserForm::default();
        assert!(!form.requires_tfa());
        form.login_verify = "tfa_check".into();
        assert!(form.requires_tfa());
        form.login_verify = "email_check".into();
        assert!(!form.requires_tfa());
    }

    #[test]
    fn test_form_length_validation() {
        let form = UserForm {
            username: "x".repeat(51),
            ..Default::default()
        };
        assert!(form.validate().is_err());
        assert!(UserForm::default().validate().is_ok());
    }

    #[test]
    fn test_bootstrap_admin_is_never_deletable() {
        let req = DeleteUsersRequest { ids: vec![1, 2, 3, 1] };
        assert_eq!(req.deletable_ids(), vec![2, 3]);
    }

    #[test]
    fn test_user_record_shape() {
        let user = User {
            id: 2,
            username: "alice".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            licensed_devices: 3,
            note: String::new(),
            login_verify: "tfa_check".into(),
            tfa_secret: "JBSWY3DPEHPK3PXP".into(),
            status: 1,
            is_admin: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["created_at"], "2024-01-02 03:04:05");
        assert_eq!(json["tfa_secret"], "JBSWY3DPEHPK3PXP");
        assert!(json.get("password").is_none());
    }
}
