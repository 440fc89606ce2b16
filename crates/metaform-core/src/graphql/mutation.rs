//! Write-operation text generation and payload shaping.

use super::selection::pk_type;
use crate::catalog::{pascal_case, JunctionSpec, RelationshipDef, SchemaDef};
use serde_json::{Map, Value};

/// Single-record insert via `insert_{table}_one`.
pub fn insert_mutation(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    [
        format!(
            "mutation Insert{}($object: {table}_insert_input!) {{",
            schema.type_name()
        ),
        format!("  insert_{table}_one(object: $object) {{"),
        format!("    {}", schema.primary_key_name()),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Single-record update via `update_{table}_by_pk` with a `_set` payload.
pub fn update_mutation(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    let pk = schema.primary_key_name();
    [
        format!(
            "mutation Update{}($id: {}, $changes: {table}_set_input!) {{",
            schema.type_name(),
            pk_type(schema)
        ),
        format!("  update_{table}_by_pk(pk_columns: {{{pk}: $id}}, _set: $changes) {{"),
        format!("    {pk}"),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Single-record delete via `delete_{table}_by_pk`.
pub fn delete_mutation(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    let pk = schema.primary_key_name();
    [
        format!(
            "mutation Delete{}($id: {}) {{",
            schema.type_name(),
            pk_type(schema)
        ),
        format!("  delete_{table}_by_pk({pk}: $id) {{"),
        format!("    {pk}"),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Multi-record insert via `insert_{table}(objects: ...)`, returning the
/// affected row count and the new ids.
pub fn bulk_insert_mutation(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    [
        format!(
            "mutation BulkInsert{}($objects: [{table}_insert_input!]!) {{",
            schema.type_name()
        ),
        format!("  insert_{table}(objects: $objects) {{"),
        "    affected_rows".to_string(),
        "    returning {".to_string(),
        format!("      {}", schema.primary_key_name()),
        "    }".to_string(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Multi-record delete via `delete_{table}(where: {pk: {_in: ...}})`,
/// returning the affected row count and the deleted ids.
pub fn batch_delete_mutation(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    let pk = schema.primary_key_name();
    let scalar = schema
        .primary_key_field()
        .map_or("uuid", |f| f.kind.graphql_scalar());
    [
        format!(
            "mutation BatchDelete{}($ids: [{scalar}!]!) {{",
            schema.type_name()
        ),
        format!("  delete_{table}(where: {{{pk}: {{_in: $ids}}}}) {{"),
        "    affected_rows".to_string(),
        "    returning {".to_string(),
        format!("      {pk}"),
        "    }".to_string(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Junction-row insert for a many-to-many relationship, linking one owner
/// to a set of target records.
pub fn junction_insert_mutation(junction: &JunctionSpec) -> String {
    let table = &junction.table;
    [
        format!(
            "mutation Link{}($objects: [{table}_insert_input!]!) {{",
            pascal_case(table)
        ),
        format!("  insert_{table}(objects: $objects) {{"),
        "    affected_rows".to_string(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Junction-row delete for a many-to-many relationship, unlinking a set of
/// target records from one owner.
pub fn junction_delete_mutation(junction: &JunctionSpec) -> String {
    let table = &junction.table;
    [
        format!(
            "mutation Unlink{}($parentId: uuid!, $targetIds: [uuid!]!) {{",
            pascal_case(table)
        ),
        format!(
            "  delete_{table}(where: {{{}: {{_eq: $parentId}}, {}: {{_in: $targetIds}}}}) {{",
            junction.source_field, junction.target_field
        ),
        "    affected_rows".to_string(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Shape form values into an insert object.
///
/// Reference-relationship values are folded into their source-field column
/// (accepting either a bare id or a `{ id: ... }` object), then every
/// remaining relationship key is stripped. Collection values are persisted
/// through their own child mutations, never inline.
pub fn insert_payload(schema: &SchemaDef, data: &Map<String, Value>) -> Map<String, Value> {
    let mut payload = data.clone();
    fold_reference_values(&schema.relationships, &mut payload);
    for rel in &schema.relationships {
        payload.remove(&rel.name);
        payload.remove(rel.graphql_field());
    }
    payload
}

/// Shape form values into an update `_set` object.
///
/// After reference folding, only declared writable columns survive: the
/// primary key and backend-maintained fields never appear in a `_set`.
pub fn update_payload(schema: &SchemaDef, data: &Map<String, Value>) -> Map<String, Value> {
    let mut folded = data.clone();
    fold_reference_values(&schema.relationships, &mut folded);

    let mut payload = Map::new();
    for field in &schema.fields {
        if field.primary_key || field.auto_generate || field.auto_update {
            continue;
        }
        if let Some(value) = folded.get(&field.name) {
            payload.insert(field.name.clone(), value.clone());
        }
    }
    payload
}

/// Fold reference-relationship values into their source-field column.
///
/// An explicitly supplied source-field value wins over the folded object, so
/// a stale relationship object left in the payload cannot clobber a selector
/// edit.
pub(crate) fn fold_reference_values(relationships: &[RelationshipDef], data: &mut Map<String, Value>) {
    for rel in relationships {
        if !rel.cardinality.is_reference() {
            continue;
        }
        let Some(source_field) = rel.source_field.clone() else {
            continue;
        };
        let value = data
            .remove(&rel.name)
            .or_else(|| data.remove(rel.graphql_field()));
        let Some(value) = value else { continue };
        if data.contains_key(&source_field) {
            continue;
        }
        let id = match value {
            Value::Object(obj) => obj.get("id").cloned().unwrap_or(Value::Null),
            other => other,
        };
        if !id.is_null() {
            data.insert(source_field, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind, RelationshipDef};
    use serde_json::json;

    fn invoice_schema() -> SchemaDef {
        SchemaDef::page("Invoice")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("total", FieldKind::Decimal))
            .with_field(FieldDef::new("customer_id", FieldKind::Uuid))
            .with_field(FieldDef::new("updated_at", FieldKind::Timestamp).auto_updated())
            .with_relationship(RelationshipDef::many_to_one(
                "invoice_customer",
                "customer_id",
                "Customer",
            ))
            .with_relationship(RelationshipDef::one_to_many(
                "line_items",
                "LineItem",
                "invoice_id",
            ))
    }

    #[test]
    fn test_insert_mutation() {
        let expected = "\
mutation InsertInvoice($object: invoice_insert_input!) {
  insert_invoice_one(object: $object) {
    id
  }
}";
        assert_eq!(insert_mutation(&invoice_schema()), expected);
    }

    #[test]
    fn test_update_mutation() {
        let expected = "\
mutation UpdateInvoice($id: uuid!, $changes: invoice_set_input!) {
  update_invoice_by_pk(pk_columns: {id: $id}, _set: $changes) {
    id
  }
}";
        assert_eq!(update_mutation(&invoice_schema()), expected);
    }

    #[test]
    fn test_delete_mutation() {
        let expected = "\
mutation DeleteInvoice($id: uuid!) {
  delete_invoice_by_pk(id: $id) {
    id
  }
}";
        assert_eq!(delete_mutation(&invoice_schema()), expected);
    }

    #[test]
    fn test_bulk_insert_mutation() {
        let mutation = bulk_insert_mutation(&invoice_schema());

        assert!(mutation
            .starts_with("mutation BulkInsertInvoice($objects: [invoice_insert_input!]!) {"));
        assert!(mutation.contains("insert_invoice(objects: $objects) {"));
        assert!(mutation.contains("affected_rows"));
        assert!(mutation.contains("returning {"));
    }

    #[test]
    fn test_batch_delete_mutation() {
        let mutation = batch_delete_mutation(&invoice_schema());

        assert!(mutation.starts_with("mutation BatchDeleteInvoice($ids: [uuid!]!) {"));
        assert!(mutation.contains("delete_invoice(where: {id: {_in: $ids}}) {"));
        assert!(mutation.contains("affected_rows"));
    }

    #[test]
    fn test_junction_insert_mutation() {
        let junction = JunctionSpec {
            table: "product_tags".to_string(),
            source_field: "product_id".to_string(),
            target_field: "tag_id".to_string(),
        };
        let expected = "\
mutation LinkProductTags($objects: [product_tags_insert_input!]!) {
  insert_product_tags(objects: $objects) {
    affected_rows
  }
}";
        assert_eq!(junction_insert_mutation(&junction), expected);
    }

    #[test]
    fn test_junction_delete_mutation() {
        let junction = JunctionSpec {
            table: "product_tags".to_string(),
            source_field: "product_id".to_string(),
            target_field: "tag_id".to_string(),
        };
        let expected = "\
mutation UnlinkProductTags($parentId: uuid!, $targetIds: [uuid!]!) {
  delete_product_tags(where: {product_id: {_eq: $parentId}, tag_id: {_in: $targetIds}}) {
    affected_rows
  }
}";
        assert_eq!(junction_delete_mutation(&junction), expected);
    }

    #[test]
    fn test_insert_payload_folds_references_and_strips_collections() {
        let data = json!({
            "id": "inv-1",
            "total": 99.5,
            "invoice_customer": { "id": "cust-1", "name": "Acme" },
            "line_items": [{ "amount": 10 }],
        });
        let payload = insert_payload(&invoice_schema(), data.as_object().unwrap());

        assert_eq!(
            Value::Object(payload),
            json!({ "id": "inv-1", "total": 99.5, "customer_id": "cust-1" })
        );
    }

    #[test]
    fn test_insert_payload_accepts_bare_reference_id() {
        let data = json!({ "total": 10, "invoice_customer": "cust-2" });
        let payload = insert_payload(&invoice_schema(), data.as_object().unwrap());

        assert_eq!(payload.get("customer_id"), Some(&json!("cust-2")));
        assert!(!payload.contains_key("invoice_customer"));
    }

    #[test]
    fn test_update_payload_keeps_only_writable_columns() {
        let data = json!({
            "id": "inv-1",
            "total": 150,
            "updated_at": "2024-01-01T00:00:00Z",
            "line_items": [],
            "unknown_column": true,
        });
        let payload = update_payload(&invoice_schema(), data.as_object().unwrap());

        assert_eq!(Value::Object(payload), json!({ "total": 150 }));
    }

    #[test]
    fn test_update_payload_folds_reference() {
        let data = json!({ "invoice_customer": { "id": "cust-3" } });
        let payload = update_payload(&invoice_schema(), data.as_object().unwrap());

        assert_eq!(Value::Object(payload), json!({ "customer_id": "cust-3" }));
    }
}
