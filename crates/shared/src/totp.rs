//! Time-based one-time passwords (RFC 6238) for two-factor login.
//!
//! Codes are six digits over 30 second steps using HMAC-SHA1, the
//! RFC 6238 default that every authenticator app implements. Secrets are
//! exchanged as unpadded base32, which is what authenticator apps expect.

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Seconds per code.
pub const STEP_SECS: u64 = 30;

/// Digits per code.
pub const DIGITS: u32 = 6;

/// Accepted clock drift, in steps, on either side of the current one.
const SKEW_STEPS: u64 = 1;

const SECRET_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum TotpError {
    #[error("Secret is not valid base32")]
    InvalidSecret,

    #[error("Failed to build provisioning URI: {0}")]
    InvalidUri(String),
}

/// A freshly generated enrollment: the secret and its `otpauth://` URI.
#[derive(Debug, Clone)]
pub struct TotpEnrollment {
    pub secret: String,
    pub uri: String,
}

/// Generates a random 160-bit secret, base32 encoded.
pub fn generate_secret() -> String {
    let bytes: [u8; SECRET_LEN] = rand::random();
    BASE32_NOPAD.encode(&bytes)
}

/// Creates a new secret and provisioning URI for `account` under `issuer`.
pub fn enroll(issuer: &str, account: &str) -> Result<TotpEnrollment, TotpError> {
    let secret = generate_secret();
    let uri = provisioning_uri(issuer, account, &secret)?;
    Ok(TotpEnrollment { secret, uri })
}

/// Builds the `otpauth://totp/...` URI scanned by authenticator apps.
pub fn provisioning_uri(issuer: &str, account: &str, secret: &str) -> Result<String, TotpError> {
    let mut uri =
        Url::parse("otpauth://totp/").map_err(|e| TotpError::InvalidUri(e.to_string()))?;

    uri.path_segments_mut()
        .map_err(|_| TotpError::InvalidUri("URI cannot carry a label".to_string()))?
        .clear()
        .push(&format!("{}:{}", issuer, account));

    uri.query_pairs_mut()
        .append_pair("secret", secret)
        .append_pair("issuer", issuer)
        .append_pair("algorithm", "SHA1")
        .append_pair("digits", &DIGITS.to_string())
        .append_pair("period", &STEP_SECS.to_string());

    Ok(uri.to_string())
}

/// Computes the code for `secret` at `unix_secs`.
pub fn code_at(secret: &str, unix_secs: u64) -> Result<String, TotpError> {
    let key = decode_secret(secret)?;
    Ok(hotp(&key, unix_secs / STEP_SECS))
}

/// Checks `code` against `secret` at `unix_secs`, tolerating one step of drift.
///
/// Malformed secrets and codes never verify.
pub fn verify(secret: &str, code: &str, unix_secs: u64) -> bool {
    let code = code.trim();
    if code.len() != DIGITS as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let Ok(key) = decode_secret(secret) else {
        return false;
    };

    let counter = unix_secs / STEP_SECS;
    let first = counter.saturating_sub(SKEW_STEPS);
    (first..=counter + SKEW_STEPS).any(|c| hotp(&key, c) == code)
}

/// Same as [`verify`] using the system clock.
pub fn verify_now(secret: &str, code: &str) -> bool {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    verify(secret, code, now)
}

fn decode_secret(secret: &str) -> Result<Vec<u8>, TotpError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.is_empty() {
        return Err(TotpError::InvalidSecret);
    }

    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|_| TotpError::InvalidSecret)
}

fn hotp(key: &[u8], counter: u64) -> String {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha1::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);

    format!(
        "{:0width$}",
        binary % 10u32.pow(DIGITS),
        width = DIGITS as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 6238 appendix B SHA-1 seed.
    const RFC_SEED: &[u8] = b"12345678901234567890";

    fn rfc_secret() -> String {
        BASE32_NOPAD.encode(RFC_SEED)
    }

    #[test]
    fn test_rfc6238_sha1_vectors() {
        let secret = rfc_secret();
        // Last six digits of the published eight-digit codes.
        assert_eq!(code_at(&secret, 59).unwrap(), "287082");
        assert_eq!(code_at(&secret, 1111111109).unwrap(), "081804");
        assert_eq!(code_at(&secret, 1111111111).unwrap(), "050471");
        assert_eq!(code_at(&secret, 1234567890).unwrap(), "005924");
    }

    #[test]
    fn test_verify_accepts_authenticator_app_code() {
        let secret = rfc_secret();
        assert!(verify(&secret, "287082", 59));
        assert!(verify(&secret, "081804", 1111111109));
        assert!(!verify(&secret, "119246", 59));
    }

    #[test]
    fn test_verify_accepts_adjacent_steps() {
        let secret = rfc_secret();
        let code = code_at(&secret, 1111111109).unwrap();
        assert!(verify(&secret, &code, 1111111109));
        assert!(verify(&secret, &code, 1111111109 + STEP_SECS));
        assert!(verify(&secret, &code, 1111111109 - STEP_SECS));
        assert!(!verify(&secret, &code, 1111111109 + 3 * STEP_SECS));
    }

    #[test]
    fn test_verify_rejects_malformed_input() {
        let secret = rfc_secret();
        assert!(!verify(&secret, "", 59));
        assert!(!verify(&secret, "12345", 59));
        assert!(!verify(&secret, "abcdef", 59));
        assert!(!verify("not base32!", "287082", 59));
        assert!(!verify("", "287082", 59));
    }

    #[test]
    fn test_secret_decoding_is_lenient() {
        let secret = rfc_secret().to_lowercase();
        assert_eq!(code_at(&secret, 59).unwrap(), "287082");
    }

    #[test]
    fn test_generate_secret_is_base32() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 32);
        assert!(BASE32_NOPAD.decode(secret.as_bytes()).is_ok());
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_provisioning_uri() {
        let uri = provisioning_uri("RustDesk", "alice", "JBSWY3DPEHPK3PXP").unwrap();
        assert!(uri.starts_with("otpauth://totp/RustDesk:alice?"));
        assert!(uri.contains("secret=JBSWY3DPEHPK3PXP"));
        assert!(uri.contains("issuer=RustDesk"));
        assert!(uri.contains("algorithm=SHA1"));
        assert!(uri.contains("digits=6"));
    }

    #[test]
    fn test_enroll_secret_matches_uri() {
        let enrollment = enroll("RustDesk", "bob").unwrap();
        assert!(enrollment.uri.contains(&enrollment.secret));
    }
}
