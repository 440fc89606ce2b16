//! Initial data loading for edit-mode forms.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use metaform_client::DataBackend;
use metaform_core::graphql::record_query;
use metaform_core::SchemaDef;

/// Loads a record's current values, reshaped into form value keys.
pub struct DataLoader {
    backend: Arc<dyn DataBackend>,
}

impl DataLoader {
    /// Create a loader over the given backend.
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the record plus one level of relationship data in a single
    /// query, reshaped for form consumption.
    ///
    /// Any failure degrades to an empty map: a form whose initial data
    /// cannot be loaded renders empty instead of blocking.
    pub async fn fetch_initial_data(
        &self,
        schema: &SchemaDef,
        entity_id: &str,
        related: &BTreeMap<String, SchemaDef>,
    ) -> Map<String, Value> {
        let operation = record_query(schema, related);
        let variables = json!({ "id": entity_id });

        let data = match self.backend.query(&operation, variables).await {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    schema = %schema.name,
                    entity_id,
                    error = %e,
                    "initial data load failed, rendering empty form"
                );
                return Map::new();
            }
        };

        let record = data
            .get(format!("{}_by_pk", schema.table_name()))
            .and_then(Value::as_object)
            .cloned();
        let Some(record) = record else {
            warn!(schema = %schema.name, entity_id, "record not found for edit form");
            return Map::new();
        };

        reshape_record(schema, record)
    }
}

/// Reshape a fetched record into form value keys.
///
/// Reference relationships populate both the foreign-key scalar (what the
/// change detector compares) and the relationship-named key with the full
/// object (what the selector widget labels); the raw backend field key is
/// dropped when it differs from the relationship name. Collection arrays
/// pass through under the relationship name.
fn reshape_record(schema: &SchemaDef, mut record: Map<String, Value>) -> Map<String, Value> {
    for rel in &schema.relationships {
        let Some(value) = record.remove(rel.graphql_field()) else {
            continue;
        };

        if rel.cardinality.is_reference() {
            if let Some(source_field) = &rel.source_field {
                if let Some(id) = value.get("id").filter(|id| !id.is_null()) {
                    record.insert(source_field.clone(), id.clone());
                }
            }
            if !value.is_null() {
                record.insert(rel.name.clone(), value);
            }
        } else {
            record.insert(rel.name.clone(), value);
        }
    }
    record
}
