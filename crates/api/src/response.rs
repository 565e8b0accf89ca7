//! Success envelope shared by the admin endpoints.

use axum::Json;
use serde::Serialize;

/// `{"success": true, "message": ..., "data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// Successful response carrying `data`.
pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: message.into(),
        data: Some(data),
    })
}

/// Successful response with `data: null`.
pub fn success_message(message: impl Into<String>) -> Json<Envelope<()>> {
    Json(Envelope {
        success: true,
        message: message.into(),
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let Json(envelope) = success(vec![1, 2], "ok");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "ok", "data": [1, 2]}));
    }

    #[test]
    fn test_message_only_has_null_data() {
        let Json(envelope) = success_message("UserAddSuccess");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["message"], "UserAddSuccess");
        assert!(json["data"].is_null());
    }
}
