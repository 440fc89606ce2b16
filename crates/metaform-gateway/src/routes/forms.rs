//! Form descriptor and submission endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use metaform_core::{FormContext, FormDescriptor};
use metaform_engine::SaveReport;

use crate::error::ApiError;
use crate::json::SuccessResponse;
use crate::AppState;

/// Form routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forms/:schema", get(handle_form_config))
        .route("/forms/:schema", post(handle_form_submit))
}

/// Query parameters for a form descriptor request.
#[derive(Debug, Deserialize)]
pub struct FormConfigParams {
    /// Record to edit; create mode when unset.
    pub entity_id: Option<String>,
    /// Parent record id, when creating a child inline from a parent form.
    pub parent_id: Option<String>,
}

/// A form submission.
#[derive(Debug, Deserialize)]
pub struct FormSubmission {
    /// Record being edited; create mode when unset.
    pub entity_id: Option<String>,
    /// Snapshot the form was seeded with.
    pub original: Option<Map<String, Value>>,
    /// Submitted values keyed by field and relationship name.
    pub values: Map<String, Value>,
}

/// Handle a form descriptor request.
async fn handle_form_config(
    State(state): State<AppState>,
    Path(schema): Path<String>,
    Query(params): Query<FormConfigParams>,
) -> Result<Json<FormDescriptor>, ApiError> {
    let context = params.parent_id.map(FormContext::with_parent);
    let descriptor = state
        .forms
        .generate_form_config(&schema, params.entity_id.as_deref(), context.as_ref())
        .await?;
    Ok(Json(descriptor))
}

/// Handle a form submission.
async fn handle_form_submit(
    State(state): State<AppState>,
    Path(schema): Path<String>,
    Json(submission): Json<FormSubmission>,
) -> Result<Json<SuccessResponse<SaveReport>>, ApiError> {
    let resolved = state.require_schema_with_related(&schema).await?;
    let FormSubmission {
        entity_id,
        original,
        values,
    } = submission;

    // An edit submitted without its snapshot diffs against freshly loaded
    // state rather than treating every value as changed.
    let original = match (&entity_id, original) {
        (Some(id), None) => Some(
            state
                .loader
                .fetch_initial_data(&resolved.schema, id, &resolved.related)
                .await,
        ),
        (_, original) => original,
    };

    let report = state
        .records
        .save(
            &resolved.schema,
            &resolved.related,
            entity_id.as_deref(),
            original.as_ref(),
            &values,
        )
        .await?;
    Ok(Json(SuccessResponse::new(report)))
}
