//! Schema catalog endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use metaform_core::{SchemaDef, SchemaKind};

use crate::error::ApiError;
use crate::json::{DeleteResponse, SuccessResponse};
use crate::AppState;

/// Schema catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schemas", get(handle_list_schemas))
        .route("/schemas", post(handle_save_schema))
        .route("/schemas/:name", get(handle_get_schema))
        .route("/schemas/:name", delete(handle_delete_schema))
}

/// Query parameters for listing schemas.
#[derive(Debug, Deserialize)]
pub struct ListSchemasParams {
    /// Restrict the listing to one schema kind.
    pub kind: Option<SchemaKind>,
}

/// Query parameters selecting a schema version.
#[derive(Debug, Deserialize)]
pub struct SchemaVersionParams {
    /// Exact version; latest active version when unset.
    pub version: Option<u32>,
}

/// Handle a schema listing request.
async fn handle_list_schemas(
    State(state): State<AppState>,
    Query(params): Query<ListSchemasParams>,
) -> Result<Json<Vec<SchemaDef>>, ApiError> {
    let schemas = state.store.list_schemas(params.kind).await?;
    Ok(Json(schemas))
}

/// Handle a single-schema fetch.
async fn handle_get_schema(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<SchemaVersionParams>,
) -> Result<Json<SchemaDef>, ApiError> {
    let schema = state
        .store
        .get_schema(&name, params.version)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("schema '{name}' is not configured")))?;
    Ok(Json(schema))
}

/// Handle a schema upsert, answering with the stored row.
async fn handle_save_schema(
    State(state): State<AppState>,
    Json(schema): Json<SchemaDef>,
) -> Result<Json<SuccessResponse<SchemaDef>>, ApiError> {
    let stored = state.store.save_schema(&schema).await?;
    Ok(Json(SuccessResponse::new(stored)))
}

/// Handle a schema soft delete.
async fn handle_delete_schema(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<SchemaVersionParams>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.store.delete_schema(&name, params.version).await?;
    Ok(Json(DeleteResponse { success: true }))
}
