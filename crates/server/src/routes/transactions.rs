use std::path::PathBuf;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header::HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use common::pagination::Pagination;
use service::ledger::domain::CreateTransactionInput;

use crate::errors::ApiError;
use crate::routes::ServerState;

/// Response header carrying the total entry count for pagination.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 20 }

pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let page = state
        .transactions
        .list(Pagination { page: q.page, per_page: q.per_page })
        .await?;
    info!(count = page.transactions.len(), total = page.total, "list transactions");

    let mut response = Json(serde_json::json!({
        "transactions": page.transactions,
        "balance": page.balance,
    }))
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&page.total.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(TOTAL_COUNT_HEADER), value);
    }
    Ok(response)
}

pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<CreateTransactionInput>,
) -> Result<Json<models::transaction::Model>, ApiError> {
    let created = state.transactions.create(input).await?;
    info!(id = %created.id, title = %created.title, "created transaction");
    Ok(Json(created))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.transactions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stage the uploaded CSV under a fresh name, then hand it to the import
/// engine; the engine removes the file once the batch is persisted.
pub async fn import(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<models::transaction::Model>>, ApiError> {
    let mut staged: Option<PathBuf> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(StatusCode::BAD_REQUEST, format!("invalid multipart body: {e}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::new(StatusCode::BAD_REQUEST, format!("could not read upload: {e}"))
        })?;
        let path = state.upload_dir.join(format!("{}.csv", Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            error!(err = %e, "failed to stage upload");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;
        staged = Some(path);
        break;
    }

    let path = staged.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "missing 'file' field"))?;
    let created = state.import.execute(&path).await?;
    info!(count = created.len(), "imported transactions");
    Ok(Json(created))
}
