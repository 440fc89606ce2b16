//! Change detection between a loaded record and an edited payload.
//!
//! Saves are diff-based: the main entity is only written when its stripped
//! field map actually differs from the loaded snapshot, and relationship
//! collections are reconciled item-by-item instead of being replaced
//! wholesale. Items are matched by their persisted `id`.

use crate::catalog::{Cardinality, RelationshipDef};
use crate::graphql::fold_reference_values;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reconciliation result for one collection relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipChanges {
    /// Edited items with no persisted id, or an id the snapshot never held.
    pub added: Vec<Value>,
    /// Edited items matched by id whose fields differ from the snapshot.
    pub updated: Vec<Value>,
    /// Snapshot items whose id is absent from the edited collection.
    pub deleted: Vec<Value>,
}

impl RelationshipChanges {
    /// Check if the relationship needs no mutations.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// Everything that must be written to persist an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Whether the main entity's field map differs from the snapshot.
    pub main_changed: bool,
    /// The edited main-entity field map, relationship keys stripped and
    /// reference values folded into their source-field columns.
    pub main_data: Map<String, Value>,
    /// Per-relationship reconciliation, keyed by relationship name. Only
    /// relationships with at least one non-empty bucket appear; a `BTreeMap`
    /// keeps processing order deterministic.
    pub relationship_changes: BTreeMap<String, RelationshipChanges>,
}

impl ChangeSet {
    /// Check if any relationship needs mutations.
    pub fn has_relationship_changes(&self) -> bool {
        !self.relationship_changes.is_empty()
    }

    /// Check if the edit requires no backend mutations at all.
    pub fn is_empty(&self) -> bool {
        !self.main_changed && self.relationship_changes.is_empty()
    }
}

/// Diff an edited payload against the loaded snapshot.
///
/// Both maps are first normalized: reference-relationship values fold into
/// their source-field column (so `{ "customer": { "id": ... } }` and
/// `{ "customer_id": ... }` express the same edit) and every
/// relationship-named key is stripped. The main entity changed when the
/// normalized maps are not deeply equal; a string and a number compare equal
/// when their string forms match, absorbing form-input coercion, but a key
/// present on one side only is a change.
///
/// Collection relationships compare `original[rel] ?? []` against
/// `current[rel] ?? []`, so an edited payload that omits a collection key
/// deletes nothing only because the caller supplies the loaded snapshot's
/// collections through `original` the same way.
///
/// Pure function over two snapshots; no network or side effects.
pub fn detect_changes(
    relationships: &[RelationshipDef],
    original: &Map<String, Value>,
    current: &Map<String, Value>,
) -> ChangeSet {
    let old_main = strip_relationship_keys(relationships, original);
    let new_main = strip_relationship_keys(relationships, current);

    let mut changes = ChangeSet {
        main_changed: !maps_equal(&old_main, &new_main),
        main_data: new_main,
        relationship_changes: BTreeMap::new(),
    };

    for rel in relationships {
        if !rel.cardinality.is_collection() {
            continue;
        }
        let old_items = relationship_items(original, rel);
        let new_items = relationship_items(current, rel);
        let diff = match rel.cardinality {
            Cardinality::ManyToMany => diff_membership(&old_items, &new_items),
            _ => diff_collection(&old_items, &new_items),
        };
        if !diff.is_empty() {
            changes.relationship_changes.insert(rel.name.clone(), diff);
        }
    }

    changes
}

/// Normalize a value map down to main-entity fields: fold reference values
/// into their source-field columns, then drop every relationship-named key.
fn strip_relationship_keys(
    relationships: &[RelationshipDef],
    data: &Map<String, Value>,
) -> Map<String, Value> {
    let mut main = data.clone();
    fold_reference_values(relationships, &mut main);
    for rel in relationships {
        main.remove(&rel.name);
        main.remove(rel.graphql_field());
    }
    main
}

/// Items of a relationship value, under either its name or its backend field
/// name. Missing and non-array values read as empty.
fn relationship_items(data: &Map<String, Value>, rel: &RelationshipDef) -> Vec<Value> {
    data.get(&rel.name)
        .or_else(|| data.get(rel.graphql_field()))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Full reconciliation for one-to-many collections: items are matched by id,
/// matched items are compared field-by-field.
fn diff_collection(old_items: &[Value], new_items: &[Value]) -> RelationshipChanges {
    let old_by_id: BTreeMap<String, &Value> = old_items
        .iter()
        .filter_map(|item| item_id(item).map(|id| (id, item)))
        .collect();

    let mut diff = RelationshipChanges::default();
    let mut seen = Vec::new();
    for item in new_items {
        match item_id(item) {
            Some(id) => match old_by_id.get(&id) {
                Some(old_item) => {
                    seen.push(id);
                    if !loosely_equal(item, old_item) {
                        diff.updated.push(item.clone());
                    }
                }
                None => diff.added.push(item.clone()),
            },
            None => diff.added.push(item.clone()),
        }
    }
    for (id, old_item) in &old_by_id {
        if !seen.contains(id) {
            diff.deleted.push((*old_item).clone());
        }
    }
    diff
}

/// Membership-only reconciliation for many-to-many collections: items are
/// junction references, so only presence matters and nothing is ever
/// classified as updated.
fn diff_membership(old_items: &[Value], new_items: &[Value]) -> RelationshipChanges {
    let old_ids: Vec<String> = old_items.iter().filter_map(item_id).collect();
    let new_ids: Vec<String> = new_items.iter().filter_map(item_id).collect();

    let mut diff = RelationshipChanges::default();
    for item in new_items {
        if item_id(item).is_some_and(|id| !old_ids.contains(&id)) {
            diff.added.push(item.clone());
        }
    }
    for item in old_items {
        if item_id(item).is_some_and(|id| !new_ids.contains(&id)) {
            diff.deleted.push(item.clone());
        }
    }
    diff
}

/// Identity of a collection item: its `id` key, or the item itself when it is
/// a bare scalar reference.
pub fn item_id(item: &Value) -> Option<String> {
    match item {
        Value::Object(obj) => obj.get("id").and_then(value_as_id),
        other => value_as_id(other),
    }
}

fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn maps_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| loosely_equal(value, other)))
}

/// Deep structural equality with form-input coercion: numbers compare by
/// numeric value, a string equals a number when their string forms match.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => maps_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loosely_equal(l, r))
        }
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            *s == n.to_string()
        }
        _ => a == b,
    }
}
