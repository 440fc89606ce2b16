//! Ordered write execution for form submissions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use metaform_client::{DataBackend, IdProvider};
use metaform_core::graphql::{
    bulk_insert_mutation, delete_mutation, insert_mutation, insert_payload,
    junction_delete_mutation, junction_insert_mutation, update_mutation, update_payload,
};
use metaform_core::{
    item_id, Cardinality, ChangeSet, JunctionSpec, RelationshipChanges, RelationshipDef, SchemaDef,
};

use crate::error::Error;

/// Per-relationship record of applied writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipWrites {
    /// Ids of created related records.
    pub created: Vec<String>,
    /// Ids of updated related records.
    pub updated: Vec<String>,
    /// Ids of deleted related records.
    pub deleted: Vec<String>,
}

/// Structured report of the writes one save applied.
///
/// On partial failure this is carried inside the error, so callers always
/// know which steps completed; nothing is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// Primary key of the main entity.
    pub entity_id: String,
    /// Whether the main entity row was inserted.
    pub created: bool,
    /// Whether the main entity row was updated.
    pub main_updated: bool,
    /// Applied relationship writes, keyed by relationship name.
    pub relationship_writes: BTreeMap<String, RelationshipWrites>,
}

impl SaveReport {
    /// Report for a save that found nothing to write.
    pub fn unchanged(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            created: false,
            main_updated: false,
            relationship_writes: BTreeMap::new(),
        }
    }

    /// True when the save wrote nothing at all.
    pub fn is_noop(&self) -> bool {
        !self.created
            && !self.main_updated
            && self
                .relationship_writes
                .values()
                .all(|w| w.created.is_empty() && w.updated.is_empty() && w.deleted.is_empty())
    }
}

struct StepError {
    step: String,
    source: metaform_client::Error,
}

/// Executes change sets as ordered sequences of backend writes.
///
/// Every write is an awaited round-trip: ids assigned by earlier steps feed
/// later ones, and within each relationship the order is delete, create,
/// update. There is no rollback; a failure aborts the remaining steps and
/// the error reports what was already applied.
pub struct MutationOrchestrator {
    backend: Arc<dyn DataBackend>,
    ids: Arc<dyn IdProvider>,
}

impl MutationOrchestrator {
    /// Create an orchestrator over the given backend and id provider.
    pub fn new(backend: Arc<dyn DataBackend>, ids: Arc<dyn IdProvider>) -> Self {
        Self { backend, ids }
    }

    /// Insert a new record, then its collection children.
    ///
    /// The primary key is assigned up front when the schema marks it
    /// auto-generated and the payload carries none, so child rows can
    /// reference it; one-to-many children are bulk-inserted with the parent
    /// id injected into their foreign-key field.
    pub async fn create(
        &self,
        schema: &SchemaDef,
        related: &BTreeMap<String, SchemaDef>,
        data: &Map<String, Value>,
    ) -> Result<SaveReport, Error> {
        let mut data = data.clone();
        let pk = schema.primary_key_name();

        let mut entity_id = data.get(pk).and_then(value_as_id);
        if entity_id.is_none() && schema.primary_key_field().is_some_and(|f| f.auto_generate) {
            let generated = self.ids.next_id().await;
            data.insert(pk.to_string(), Value::String(generated.clone()));
            entity_id = Some(generated);
        }

        let operation = insert_mutation(schema);
        let payload = insert_payload(schema, &data);
        let response = self
            .backend
            .mutate(&operation, json!({ "object": payload }))
            .await?;
        let entity_id = response_row_id(
            &response,
            &format!("insert_{}_one", schema.table_name()),
            pk,
        )
        .or(entity_id)
        .ok_or_else(|| {
            metaform_client::Error::MalformedResponse("insert returned no primary key".to_string())
        })?;
        debug!(schema = %schema.name, entity_id = %entity_id, "main entity inserted");

        let mut report = SaveReport {
            entity_id: entity_id.clone(),
            created: true,
            main_updated: false,
            relationship_writes: BTreeMap::new(),
        };

        for rel in &schema.relationships {
            if !rel.cardinality.is_collection() {
                continue;
            }
            let Some(items) = data.get(&rel.name).and_then(Value::as_array) else {
                continue;
            };
            if items.is_empty() {
                continue;
            }

            let mut writes = RelationshipWrites::default();
            let result = match rel.cardinality {
                Cardinality::ManyToMany => {
                    self.link_targets(rel, &entity_id, items, &mut writes).await
                }
                _ => {
                    self.bulk_insert_children(schema, related, rel, &entity_id, items, &mut writes)
                        .await
                }
            };
            let failed = result.err();
            report.relationship_writes.insert(rel.name.clone(), writes);
            if let Some(StepError { step, source }) = failed {
                warn!(schema = %schema.name, step = %step, error = %source, "create aborted partway");
                return Err(Error::PartialWrite {
                    report,
                    failed_step: step,
                    source,
                });
            }
        }

        Ok(report)
    }

    /// Apply a change set to an existing record.
    ///
    /// The main entity is updated only when its fields changed; each changed
    /// relationship is processed as deletes, then creates, then updates,
    /// item by item.
    pub async fn update(
        &self,
        schema: &SchemaDef,
        related: &BTreeMap<String, SchemaDef>,
        entity_id: &str,
        changes: &ChangeSet,
    ) -> Result<SaveReport, Error> {
        let mut report = SaveReport::unchanged(entity_id);

        if changes.main_changed {
            let payload = update_payload(schema, &changes.main_data);
            if !payload.is_empty() {
                let operation = update_mutation(schema);
                let response = self
                    .backend
                    .mutate(&operation, json!({ "id": entity_id, "changes": payload }))
                    .await?;
                let field = format!("update_{}_by_pk", schema.table_name());
                if response.get(&field).map_or(true, Value::is_null) {
                    return Err(Error::NotFound(format!(
                        "{} '{entity_id}' not found",
                        schema.name
                    )));
                }
                report.main_updated = true;
                debug!(schema = %schema.name, entity_id, "main entity updated");
            }
        }

        for (rel_name, rel_changes) in &changes.relationship_changes {
            if rel_changes.is_empty() {
                continue;
            }
            let Some(rel) = schema.get_relationship(rel_name) else {
                warn!(schema = %schema.name, relationship = %rel_name, "change set names unknown relationship");
                continue;
            };

            let mut writes = RelationshipWrites::default();
            let result = match rel.cardinality {
                Cardinality::ManyToMany => {
                    self.apply_membership_changes(rel, entity_id, rel_changes, &mut writes)
                        .await
                }
                Cardinality::OneToMany => {
                    self.apply_child_changes(schema, related, rel, entity_id, rel_changes, &mut writes)
                        .await
                }
                // Reference relationships fold into the main-entity fields.
                _ => Ok(()),
            };
            let failed = result.err();
            report.relationship_writes.insert(rel_name.clone(), writes);
            if let Some(StepError { step, source }) = failed {
                warn!(schema = %schema.name, step = %step, error = %source, "save aborted partway");
                return Err(Error::PartialWrite {
                    report,
                    failed_step: step,
                    source,
                });
            }
        }

        Ok(report)
    }

    async fn bulk_insert_children(
        &self,
        parent: &SchemaDef,
        related: &BTreeMap<String, SchemaDef>,
        rel: &RelationshipDef,
        parent_id: &str,
        items: &[Value],
        writes: &mut RelationshipWrites,
    ) -> Result<(), StepError> {
        let Some(child) = related.get(&rel.target_schema) else {
            warn!(
                relationship = %rel.name,
                target = %rel.target_schema,
                "related schema not resolved, skipping child inserts"
            );
            return Ok(());
        };
        let fk_field = rel.resolve_fk_field(parent, child);

        let objects: Vec<Value> = items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| {
                let mut object = insert_payload(child, item);
                object.insert(fk_field.clone(), Value::String(parent_id.to_string()));
                Value::Object(object)
            })
            .collect();
        if objects.is_empty() {
            return Ok(());
        }

        let operation = bulk_insert_mutation(child);
        let response = self
            .backend
            .mutate(&operation, json!({ "objects": objects }))
            .await
            .map_err(|source| StepError {
                step: format!("create {}", rel.name),
                source,
            })?;
        writes.created = returned_ids(
            &response,
            &format!("insert_{}", child.table_name()),
            child.primary_key_name(),
        );
        Ok(())
    }

    async fn apply_child_changes(
        &self,
        parent: &SchemaDef,
        related: &BTreeMap<String, SchemaDef>,
        rel: &RelationshipDef,
        parent_id: &str,
        changes: &RelationshipChanges,
        writes: &mut RelationshipWrites,
    ) -> Result<(), StepError> {
        let Some(child) = related.get(&rel.target_schema) else {
            warn!(
                relationship = %rel.name,
                target = %rel.target_schema,
                "related schema not resolved, skipping relationship writes"
            );
            return Ok(());
        };
        let child_pk = child.primary_key_name();
        let fk_field = rel.resolve_fk_field(parent, child);

        // Deletes run first so replaced rows free unique constraints.
        let delete_op = delete_mutation(child);
        for item in &changes.deleted {
            let Some(id) = item_id(item) else { continue };
            self.backend
                .mutate(&delete_op, json!({ "id": &id }))
                .await
                .map_err(|source| StepError {
                    step: format!("delete {} {id}", rel.name),
                    source,
                })?;
            writes.deleted.push(id);
        }

        let insert_op = insert_mutation(child);
        for item in &changes.added {
            let Some(item) = item.as_object() else { continue };
            let mut object = insert_payload(child, item);
            if object.get(child_pk).map_or(false, Value::is_null) {
                object.remove(child_pk);
            }
            if !object.contains_key(child_pk)
                && child.primary_key_field().is_some_and(|f| f.auto_generate)
            {
                object.insert(child_pk.to_string(), Value::String(self.ids.next_id().await));
            }
            object.insert(fk_field.clone(), Value::String(parent_id.to_string()));

            let assigned = object.get(child_pk).and_then(value_as_id);
            let response = self
                .backend
                .mutate(&insert_op, json!({ "object": Value::Object(object) }))
                .await
                .map_err(|source| StepError {
                    step: format!("create {}", rel.name),
                    source,
                })?;
            let id = response_row_id(
                &response,
                &format!("insert_{}_one", child.table_name()),
                child_pk,
            )
            .or(assigned);
            if let Some(id) = id {
                writes.created.push(id);
            }
        }

        let update_op = update_mutation(child);
        for item in &changes.updated {
            let Some(object) = item.as_object() else { continue };
            let Some(id) = item_id(item) else { continue };
            let payload = update_payload(child, object);
            if payload.is_empty() {
                continue;
            }
            self.backend
                .mutate(&update_op, json!({ "id": &id, "changes": payload }))
                .await
                .map_err(|source| StepError {
                    step: format!("update {} {id}", rel.name),
                    source,
                })?;
            writes.updated.push(id);
        }

        Ok(())
    }

    async fn link_targets(
        &self,
        rel: &RelationshipDef,
        parent_id: &str,
        items: &[Value],
        writes: &mut RelationshipWrites,
    ) -> Result<(), StepError> {
        let Some(junction) = &rel.junction else {
            return Ok(());
        };
        let target_ids: Vec<String> = items.iter().filter_map(item_id).collect();
        if target_ids.is_empty() {
            return Ok(());
        }

        let objects: Vec<Value> = target_ids
            .iter()
            .map(|id| junction_row(junction, parent_id, id))
            .collect();
        let operation = junction_insert_mutation(junction);
        self.backend
            .mutate(&operation, json!({ "objects": objects }))
            .await
            .map_err(|source| StepError {
                step: format!("link {}", rel.name),
                source,
            })?;
        writes.created = target_ids;
        Ok(())
    }

    async fn apply_membership_changes(
        &self,
        rel: &RelationshipDef,
        parent_id: &str,
        changes: &RelationshipChanges,
        writes: &mut RelationshipWrites,
    ) -> Result<(), StepError> {
        let Some(junction) = &rel.junction else {
            return Ok(());
        };

        let removed: Vec<String> = changes.deleted.iter().filter_map(item_id).collect();
        if !removed.is_empty() {
            let operation = junction_delete_mutation(junction);
            self.backend
                .mutate(
                    &operation,
                    json!({ "parentId": parent_id, "targetIds": &removed }),
                )
                .await
                .map_err(|source| StepError {
                    step: format!("unlink {}", rel.name),
                    source,
                })?;
            writes.deleted = removed;
        }

        let added: Vec<String> = changes.added.iter().filter_map(item_id).collect();
        if !added.is_empty() {
            let objects: Vec<Value> = added
                .iter()
                .map(|id| junction_row(junction, parent_id, id))
                .collect();
            let operation = junction_insert_mutation(junction);
            self.backend
                .mutate(&operation, json!({ "objects": objects }))
                .await
                .map_err(|source| StepError {
                    step: format!("link {}", rel.name),
                    source,
                })?;
            writes.created = added;
        }

        Ok(())
    }
}

fn junction_row(junction: &JunctionSpec, parent_id: &str, target_id: &str) -> Value {
    let mut row = Map::new();
    row.insert(
        junction.source_field.clone(),
        Value::String(parent_id.to_string()),
    );
    row.insert(
        junction.target_field.clone(),
        Value::String(target_id.to_string()),
    );
    Value::Object(row)
}

/// Read a scalar id out of a JSON value.
pub(crate) fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read the id of a single returned row, e.g. `insert_invoice_one { id }`.
pub(crate) fn response_row_id(response: &Value, field: &str, pk: &str) -> Option<String> {
    response
        .get(field)
        .and_then(|row| row.get(pk))
        .and_then(value_as_id)
}

/// Read the ids out of a `returning` list, e.g. bulk inserts and batch
/// deletes.
pub(crate) fn returned_ids(response: &Value, field: &str, pk: &str) -> Vec<String> {
    response
        .get(field)
        .and_then(|v| v.get("returning"))
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.get(pk).and_then(value_as_id))
                .collect()
        })
        .unwrap_or_default()
}
