//! Integration tests for mail sending and delivery logs.
//!
//! Tests cover:
//! - POST /admin/mail/send
//! - GET /admin/mail/logs/list
//! - GET /admin/mail/logs/info

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, get_request, json_request, parse_response_body, test_pool, unique_suffix,
    unreachable_pool,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn insert_template(pool: &PgPool, subject: &str, contents: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO mail_templates (name, subject, contents) VALUES ('test', $1, $2) RETURNING id",
    )
    .bind(subject)
    .bind(contents)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_send_rejects_invalid_recipient() {
    let app = create_test_app(unreachable_pool());

    let request = json_request(
        Method::POST,
        "/admin/mail/send",
        json!({ "tpl_id": 1, "to": "not-an-address" }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Invalid recipient email address");
}

#[tokio::test]
async fn test_logs_info_requires_id() {
    let app = create_test_app(unreachable_pool());

    let response = app.oneshot(get_request("/admin/mail/logs/info")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_and_read_logs() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tpl_id = insert_template(&pool, "Your code", "<p>Hello {{name}}, code {{code}}</p>").await;
    let app = create_test_app(pool);
    let to = format!("ops{}@example.com", unique_suffix());

    let request = json_request(
        Method::POST,
        "/admin/mail/send",
        json!({
            "user_id": 7,
            "tpl_id": tpl_id,
            "to": to,
            "vars": { "{{name}}": "Ann", "{{code}}": "123456" }
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "MailSendSuccess");

    let uri = format!("/admin/mail/logs/list?to={}", to);
    let body = parse_response_body(app.clone().oneshot(get_request(&uri)).await.unwrap()).await;
    assert_eq!(body["data"]["total"], 1);
    let record = &body["data"]["records"][0];
    assert_eq!(record["status"], 1);
    assert_eq!(record["subject"], "Your code");
    assert_eq!(record["user_id"], 7);
    assert!(record.get("contents").is_none());

    let id = record["id"].as_i64().unwrap();
    let uri = format!("/admin/mail/logs/info?id={}", id);
    let body = parse_response_body(app.oneshot(get_request(&uri)).await.unwrap()).await;
    assert_eq!(body["data"]["contents"], "<p>Hello Ann, code 123456</p>");
}

#[tokio::test]
async fn test_send_unknown_template_is_logged() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let app = create_test_app(pool);
    let to = format!("missing{}@example.com", unique_suffix());

    let request = json_request(
        Method::POST,
        "/admin/mail/send",
        json!({ "tpl_id": i64::MAX, "to": to }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uri = format!("/admin/mail/logs/list?to={}&status=0", to);
    let body = parse_response_body(app.oneshot(get_request(&uri)).await.unwrap()).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_logs_info_unknown_id() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let app = create_test_app(pool);

    let uri = format!("/admin/mail/logs/info?id={}", i64::MAX);
    let response = app.oneshot(get_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "not_found");
}
