//! Record CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use metaform_engine::{ListPage, ListParams, SaveReport, DEFAULT_PAGE_SIZE};

use crate::error::ApiError;
use crate::json::{DeleteResponse, SuccessResponse};
use crate::AppState;

/// Record CRUD routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/data/:schema", get(handle_list_records))
        .route("/data/:schema", post(handle_create_record))
        .route("/data/:schema/:id", get(handle_get_record))
        .route("/data/:schema/:id", put(handle_update_record))
        .route("/data/:schema/:id", delete(handle_delete_record))
}

/// Query parameters for listing records.
#[derive(Debug, Deserialize)]
pub struct ListRecordsParams {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Rows per page.
    pub page_size: Option<u32>,
    /// Case-insensitive substring filter over searchable columns.
    pub search: Option<String>,
}

/// Query parameters for a record delete.
#[derive(Debug, Deserialize)]
pub struct DeleteRecordParams {
    /// Delete dependent records first instead of failing on constraints.
    #[serde(default)]
    pub cascade: bool,
}

/// Handle a paginated record listing.
async fn handle_list_records(
    State(state): State<AppState>,
    Path(schema): Path<String>,
    Query(params): Query<ListRecordsParams>,
) -> Result<Json<ListPage>, ApiError> {
    let schema = state.require_schema(&schema).await?;
    let params = ListParams {
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        search: params.search,
    };
    let page = state.records.list(&schema, &params).await?;
    Ok(Json(page))
}

/// Handle a single-record fetch.
async fn handle_get_record(
    State(state): State<AppState>,
    Path((schema, id)): Path<(String, String)>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let schema = state.require_schema(&schema).await?;
    let record = state
        .records
        .get(&schema, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} '{id}' not found", schema.name)))?;
    Ok(Json(record))
}

/// Handle a record create.
async fn handle_create_record(
    State(state): State<AppState>,
    Path(schema): Path<String>,
    Json(values): Json<Map<String, Value>>,
) -> Result<Json<SuccessResponse<SaveReport>>, ApiError> {
    let resolved = state.require_schema_with_related(&schema).await?;
    let report = state
        .records
        .save(&resolved.schema, &resolved.related, None, None, &values)
        .await?;
    Ok(Json(SuccessResponse::new(report)))
}

/// Handle a full-state record update.
///
/// PUT carries no snapshot to diff against, so every submitted value counts
/// as changed and listed relationship collections are reconciled to the
/// submitted state.
async fn handle_update_record(
    State(state): State<AppState>,
    Path((schema, id)): Path<(String, String)>,
    Json(values): Json<Map<String, Value>>,
) -> Result<Json<SuccessResponse<SaveReport>>, ApiError> {
    let resolved = state.require_schema_with_related(&schema).await?;
    let report = state
        .records
        .save(&resolved.schema, &resolved.related, Some(&id), None, &values)
        .await?;
    Ok(Json(SuccessResponse::new(report)))
}

/// Handle a record delete, cascading over dependents when requested.
async fn handle_delete_record(
    State(state): State<AppState>,
    Path((schema, id)): Path<(String, String)>,
    Query(params): Query<DeleteRecordParams>,
) -> Result<Response, ApiError> {
    if params.cascade {
        let catalog = state.store.list_schemas(None).await?;
        let result = state
            .cascade
            .delete_with_dependents(&catalog, &schema, &id)
            .await?;
        return Ok(Json(result).into_response());
    }

    let schema = state.require_schema(&schema).await?;
    match state.records.delete(&schema, &id).await {
        Ok(()) => Ok(Json(DeleteResponse { success: true }).into_response()),
        Err(err) if err.is_referential_integrity() => Err(ApiError::Conflict(format!(
            "{err}; other records reference this one, retry with ?cascade=true to delete them too"
        ))),
        Err(err) => Err(err.into()),
    }
}
