//! Record-level CRUD over generated operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use metaform_client::{DataBackend, IdProvider};
use metaform_core::detect_changes;
use metaform_core::form::validate_record;
use metaform_core::graphql::{default_order_by, delete_mutation, get_query, list_query, search_filter};
use metaform_core::{FormMode, SchemaDef};

use crate::error::Error;
use crate::writes::{MutationOrchestrator, SaveReport};

/// Default page size for record lists.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pagination and search parameters for a list request.
#[derive(Debug, Clone)]
pub struct ListParams {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Case-insensitive substring filter over searchable columns.
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

/// One page of records with the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    /// Records on this page.
    pub items: Vec<Value>,
    /// Total rows matching the filter, across all pages.
    pub total: u64,
    /// 1-based page number served.
    pub page: u32,
    /// Rows per page requested.
    pub page_size: u32,
}

/// CRUD over dynamic records described by a schema.
pub struct RecordService {
    backend: Arc<dyn DataBackend>,
    orchestrator: MutationOrchestrator,
}

impl RecordService {
    /// Create a service over the given backend and id provider.
    pub fn new(backend: Arc<dyn DataBackend>, ids: Arc<dyn IdProvider>) -> Self {
        let orchestrator = MutationOrchestrator::new(Arc::clone(&backend), ids);
        Self {
            backend,
            orchestrator,
        }
    }

    /// List records with pagination, optional search, and default ordering.
    pub async fn list(&self, schema: &SchemaDef, params: &ListParams) -> Result<ListPage, Error> {
        let page = params.page.max(1);
        let page_size = params.page_size.max(1);
        let offset = (page - 1) * page_size;
        let filter = params
            .search
            .as_deref()
            .and_then(|term| search_filter(schema, term));

        let operation = list_query(schema);
        let variables = json!({
            "limit": page_size,
            "offset": offset,
            "where": filter,
            "order_by": default_order_by(schema),
        });
        let data = self.backend.query(&operation, variables).await?;

        let table = schema.table_name();
        let items = data
            .get(&table)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let total = data
            .get(format!("{table}_aggregate"))
            .and_then(|v| v.get("aggregate"))
            .and_then(|v| v.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64);

        Ok(ListPage {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Fetch one record by primary key.
    pub async fn get(
        &self,
        schema: &SchemaDef,
        entity_id: &str,
    ) -> Result<Option<Map<String, Value>>, Error> {
        let operation = get_query(schema);
        let data = self
            .backend
            .query(&operation, json!({ "id": entity_id }))
            .await?;
        Ok(data
            .get(format!("{}_by_pk", schema.table_name()))
            .and_then(Value::as_object)
            .cloned())
    }

    /// Delete one record by primary key, without cascading.
    ///
    /// A referential-integrity failure propagates unchanged so the surface
    /// can offer the cascading path as remediation.
    pub async fn delete(&self, schema: &SchemaDef, entity_id: &str) -> Result<(), Error> {
        let operation = delete_mutation(schema);
        let data = self
            .backend
            .mutate(&operation, json!({ "id": entity_id }))
            .await?;

        let field = format!("delete_{}_by_pk", schema.table_name());
        if data.get(&field).map_or(true, Value::is_null) {
            return Err(Error::NotFound(format!(
                "{} '{entity_id}' not found",
                schema.name
            )));
        }
        Ok(())
    }

    /// Validate and persist a form submission.
    ///
    /// Creates when `entity_id` is absent. Otherwise diffs `original`
    /// against `current` and applies only the detected changes; with no
    /// original snapshot every submitted value counts as changed.
    pub async fn save(
        &self,
        schema: &SchemaDef,
        related: &BTreeMap<String, SchemaDef>,
        entity_id: Option<&str>,
        original: Option<&Map<String, Value>>,
        current: &Map<String, Value>,
    ) -> Result<SaveReport, Error> {
        let mode = if entity_id.is_some() {
            FormMode::Edit
        } else {
            FormMode::Create
        };
        let violations = validate_record(schema, current, mode);
        if !violations.is_empty() {
            return Err(Error::Validation { violations });
        }

        match entity_id {
            None => self.orchestrator.create(schema, related, current).await,
            Some(id) => {
                let empty = Map::new();
                let original = original.unwrap_or(&empty);
                let changes = detect_changes(&schema.relationships, original, current);
                if changes.is_empty() {
                    debug!(schema = %schema.name, entity_id = id, "no changes detected");
                    return Ok(SaveReport::unchanged(id));
                }
                self.orchestrator.update(schema, related, id, &changes).await
            }
        }
    }
}
