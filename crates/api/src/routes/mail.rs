//! Mail sending and delivery log endpoints.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Json,
};
use domain::models::{EmailLog, SendMailRequest};
use persistence::repositories::EmailLogRepository;
use serde::{Deserialize, Serialize};
use shared::pagination::Page;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ListParams;
use crate::response::{success, success_message, Envelope};

#[derive(Debug, Deserialize)]
pub struct LogInfoQuery {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct LogContents {
    pub id: i64,
    pub contents: String,
}

/// POST /admin/mail/send
pub async fn send(
    State(state): State<AppState>,
    payload: Result<Json<SendMailRequest>, JsonRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    state
        .email
        .send(request.user_id, request.tpl_id, &request.to, &request.vars)
        .await?;

    Ok(success_message("MailSendSuccess"))
}

/// GET /admin/mail/logs/list
///
/// Filters: `user_id`, `tpl_id`, `to`, `subject` (substring), `status` and
/// a `created_at[0..1]` range. Message bodies are left out.
pub async fn logs_list(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Envelope<Page<EmailLog>>>, ApiError> {
    let page = EmailLogRepository::new(state.pool.clone())
        .list(&params.filters, params.page)
        .await?;
    Ok(success(page, "ok"))
}

/// GET /admin/mail/logs/info?id=
pub async fn logs_info(
    State(state): State<AppState>,
    query: Result<Query<LogInfoQuery>, QueryRejection>,
) -> Result<Json<Envelope<LogContents>>, ApiError> {
    let Query(query) = query?;
    let contents = EmailLogRepository::new(state.pool.clone())
        .find_contents(query.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("not_found".into()))?;

    Ok(success(
        LogContents {
            id: query.id,
            contents,
        },
        "ok",
    ))
}
