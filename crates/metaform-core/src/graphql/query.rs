//! Read-operation text generation.
//!
//! Queries are synthesized against a Hasura-style GraphQL schema: per-table
//! root fields (`product`), by-pk lookups (`product_by_pk`) and aggregate
//! counterparts (`product_aggregate`). User input never lands in operation
//! text; all runtime values travel as variables.

use super::selection::{
    column_selection, pk_type, reference_selection, relationship_selection, visible_columns,
};
use crate::catalog::SchemaDef;
use std::collections::BTreeMap;

/// Single-record query selecting every visible field plus, per relationship,
/// the target's id and display field.
pub fn get_query(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    let mut lines = vec![
        format!("query Get{}($id: {}) {{", schema.type_name(), pk_type(schema)),
        format!("  {table}_by_pk({}: $id) {{", schema.primary_key_name()),
    ];
    for column in visible_columns(schema) {
        lines.push(format!("    {}", column_selection(&column)));
    }
    for rel in &schema.relationships {
        lines.push(format!(
            "    {}",
            reference_selection(rel.graphql_field(), rel.display_field())
        ));
    }
    lines.push("  }".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

/// Single-record query for form editing, expanding collection relationships
/// to the related schema's visible fields (one level).
pub fn record_query(schema: &SchemaDef, related: &BTreeMap<String, SchemaDef>) -> String {
    let table = schema.table_name();
    let mut lines = vec![
        format!(
            "query Get{}Record($id: {}) {{",
            schema.type_name(),
            pk_type(schema)
        ),
        format!("  {table}_by_pk({}: $id) {{", schema.primary_key_name()),
    ];
    for column in visible_columns(schema) {
        lines.push(format!("    {}", column_selection(&column)));
    }
    for rel in &schema.relationships {
        lines.push(format!("    {}", relationship_selection(rel, related)));
    }
    lines.push("  }".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

/// List query with paging, filtering, ordering and a total row count.
///
/// Columns come from the configured list view when present, otherwise every
/// visible field; the primary key is always selected so rows stay
/// addressable. Relationships flagged for list display are selected as
/// `field { id display }`.
pub fn list_query(schema: &SchemaDef) -> String {
    let table = schema.table_name();
    let type_name = schema.type_name();
    let pk = schema.primary_key_name();

    let mut columns: Vec<String> = schema
        .ui
        .as_ref()
        .and_then(|ui| ui.list_view.as_ref())
        .map(|lv| lv.columns.clone())
        .filter(|cols| !cols.is_empty())
        .unwrap_or_else(|| visible_columns(schema));
    if !columns.iter().any(|c| c == pk) {
        columns.push(pk.to_string());
    }

    let mut lines = vec![
        format!(
            "query List{type_name}($limit: Int, $offset: Int, $where: {table}_bool_exp, $order_by: [{table}_order_by!]) {{"
        ),
        format!("  {table}(limit: $limit, offset: $offset, where: $where, order_by: $order_by) {{"),
    ];
    for column in &columns {
        lines.push(format!("    {}", column_selection(column)));
    }
    for rel in schema.relationships.iter().filter(|r| r.display_in_list()) {
        lines.push(format!(
            "    {}",
            reference_selection(rel.graphql_field(), rel.display_field())
        ));
    }
    lines.push("  }".to_string());
    lines.push(format!("  {table}_aggregate(where: $where) {{"));
    lines.push("    aggregate {".to_string());
    lines.push("      count".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

/// Query selecting the ids of records whose `fk_field` references any of a
/// set of parent ids. Drives dependent discovery before a cascading delete.
pub fn dependents_query(child: &SchemaDef, fk_field: &str) -> String {
    let table = child.table_name();
    let scalar = child
        .get_field(fk_field)
        .map_or("uuid", |f| f.kind.graphql_scalar());
    [
        format!(
            "query Find{}Dependents($parentIds: [{scalar}!]!) {{",
            child.type_name()
        ),
        format!("  {table}(where: {{{fk_field}: {{_in: $parentIds}}}}) {{"),
        format!("    {}", child.primary_key_name()),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}
