//! Cascading delete: dependent discovery and ordered execution.
//!
//! The pure planning half (edge derivation, topological ordering) lives in
//! `metaform_core::cascade`; this module walks the backend to discover
//! dependent record ids and executes the resulting plan in batches.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use metaform_client::DataBackend;
use metaform_core::cascade::{build_plan, dependency_graph, fk_edges};
use metaform_core::graphql::{batch_delete_mutation, dependents_query};
use metaform_core::{DeletePlan, SchemaDef};

use crate::error::Error;
use crate::writes::{returned_ids, value_as_id};

/// Records deleted per batch request.
pub const DELETE_BATCH_SIZE: usize = 50;

/// Outcome of a cascading delete.
///
/// `deleted_records` is populated as batches complete, so a failed run
/// still reports exactly which schemas' records were removed before the
/// stop; nothing is re-created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CascadeResult {
    /// Whether every planned deletion completed.
    pub success: bool,
    /// Deleted record ids, keyed by schema name.
    pub deleted_records: BTreeMap<String, Vec<String>>,
    /// Failures, in the order they occurred.
    pub errors: Vec<String>,
}

impl CascadeResult {
    /// Total number of records deleted.
    pub fn affected_count(&self) -> usize {
        self.deleted_records.values().map(Vec::len).sum()
    }
}

/// Discovers dependent records and deletes them children-first.
pub struct CascadeDeleter {
    backend: Arc<dyn DataBackend>,
}

impl CascadeDeleter {
    /// Create a deleter over the given backend.
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        Self { backend }
    }

    /// Plan and execute a cascading delete of one root record.
    ///
    /// Planning errors (unknown schema, dependency cycle) fail before any
    /// write; execution failures surface through the result.
    pub async fn delete_with_dependents(
        &self,
        catalog: &[SchemaDef],
        root_schema: &str,
        root_id: &str,
    ) -> Result<CascadeResult, Error> {
        let plan = self.plan(catalog, root_schema, root_id).await?;
        debug!(
            schema = root_schema,
            entity_id = root_id,
            records = plan.total_records(),
            steps = plan.steps.len(),
            "cascade plan ready"
        );
        Ok(self.execute(catalog, &plan).await)
    }

    /// Discover every dependent record of the root and order the deletions
    /// children-first.
    pub async fn plan(
        &self,
        catalog: &[SchemaDef],
        root_schema: &str,
        root_id: &str,
    ) -> Result<DeletePlan, Error> {
        let discovered = self.discover(catalog, root_schema, root_id).await?;
        let graph = dependency_graph(catalog);
        Ok(build_plan(catalog, &discovered, &graph)?)
    }

    /// Walk foreign-key edges outward from the root, collecting dependent
    /// record ids schema by schema.
    ///
    /// Each frontier of newly found parent ids is queried against every
    /// child schema referencing it, so grandchildren are reached
    /// hop by hop. A visited set over `schema:sorted-ids` stops repeat
    /// frontiers.
    async fn discover(
        &self,
        catalog: &[SchemaDef],
        root_schema: &str,
        root_id: &str,
    ) -> Result<BTreeMap<String, Vec<String>>, Error> {
        let by_name: BTreeMap<&str, &SchemaDef> =
            catalog.iter().map(|s| (s.name.as_str(), s)).collect();
        if !by_name.contains_key(root_schema) {
            return Err(Error::NotFound(format!(
                "schema '{root_schema}' not found in catalog"
            )));
        }

        let edges = fk_edges(catalog);

        let mut dependents: BTreeMap<String, Vec<String>> = BTreeMap::new();
        dependents.insert(root_schema.to_string(), vec![root_id.to_string()]);

        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut frontier: Vec<(String, Vec<String>)> =
            vec![(root_schema.to_string(), vec![root_id.to_string()])];

        while let Some((parent, parent_ids)) = frontier.pop() {
            let mut sorted = parent_ids.clone();
            sorted.sort();
            if !visited.insert(format!("{parent}:{}", sorted.join(","))) {
                continue;
            }

            for edge in edges.iter().filter(|e| e.parent_schema == parent) {
                let Some(child) = by_name.get(edge.child_schema.as_str()) else {
                    continue;
                };

                let operation = dependents_query(child, &edge.fk_field);
                let data = self
                    .backend
                    .query(&operation, json!({ "parentIds": &parent_ids }))
                    .await?;

                let pk = child.primary_key_name();
                let found: Vec<String> = data
                    .get(&child.table_name())
                    .and_then(Value::as_array)
                    .map(|rows| {
                        rows.iter()
                            .filter_map(|row| row.get(pk).and_then(value_as_id))
                            .collect()
                    })
                    .unwrap_or_default();

                let new_ids: Vec<String> = {
                    let known = dependents.get(&edge.child_schema);
                    found
                        .into_iter()
                        .filter(|id| known.map_or(true, |k| !k.contains(id)))
                        .collect()
                };
                if new_ids.is_empty() {
                    continue;
                }
                dependents
                    .entry(edge.child_schema.clone())
                    .or_default()
                    .extend(new_ids.iter().cloned());
                frontier.push((edge.child_schema.clone(), new_ids));
            }
        }

        Ok(dependents)
    }

    /// Execute a plan, deleting in batches of [`DELETE_BATCH_SIZE`] and
    /// stopping at the first failure to avoid orphaning parents.
    pub async fn execute(&self, catalog: &[SchemaDef], plan: &DeletePlan) -> CascadeResult {
        let by_name: BTreeMap<&str, &SchemaDef> =
            catalog.iter().map(|s| (s.name.as_str(), s)).collect();
        let mut result = CascadeResult {
            success: true,
            ..Default::default()
        };

        'steps: for step in &plan.steps {
            let Some(schema) = by_name.get(step.schema_name.as_str()) else {
                result.success = false;
                result
                    .errors
                    .push(format!("schema '{}' missing from catalog", step.schema_name));
                break;
            };
            let operation = batch_delete_mutation(schema);
            let pk = schema.primary_key_name();
            let field = format!("delete_{}", schema.table_name());

            for batch in step.record_ids.chunks(DELETE_BATCH_SIZE) {
                match self.backend.mutate(&operation, json!({ "ids": batch })).await {
                    Ok(data) => {
                        let deleted = returned_ids(&data, &field, pk);
                        result
                            .deleted_records
                            .entry(step.schema_name.clone())
                            .or_default()
                            .extend(deleted);
                    }
                    Err(e) => {
                        error!(
                            schema = %step.schema_name,
                            error = %e,
                            "cascade batch delete failed, stopping"
                        );
                        result.success = false;
                        result.errors.push(format!(
                            "failed deleting {} records: {e}",
                            step.schema_name
                        ));
                        break 'steps;
                    }
                }
            }
        }

        result
    }
}
