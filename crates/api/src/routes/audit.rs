//! Connection and file transfer audit listings.

use axum::{extract::State, Json};
use domain::models::{ConnectionAudit, FileTransfer};
use persistence::repositories::AuditRepository;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ListParams;
use crate::response::{success, Envelope};

/// GET /admin/audit/list
///
/// Filters: `conn_id`, `type`, `rustdesk_id`, `ip`, `session_id`, `uuid`,
/// and `created_at[0..1]` / `closed_at[0..1]` ranges.
pub async fn list(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Envelope<Page<ConnectionAudit>>>, ApiError> {
    let page = AuditRepository::new(state.pool.clone())
        .list(&params.filters, params.page)
        .await?;
    Ok(success(page, "ok"))
}

/// GET /admin/audit/file-transfer-list
pub async fn file_transfer_list(
    State(state): State<AppState>,
    params: ListParams,
) -> Result<Json<Envelope<Page<FileTransfer>>>, ApiError> {
    let page = AuditRepository::new(state.pool.clone())
        .list_file_transfers(&params.filters, params.page)
        .await?;
    Ok(success(page, "ok"))
}
