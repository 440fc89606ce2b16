//! Boolean-expression and ordering values for list queries.
//!
//! These build the JSON values bound to `$where` and `$order_by` variables
//! rather than inlining user input into operation text.

use crate::catalog::{SchemaDef, SortDirection};
use serde_json::{json, Value};

/// Column names searched when a schema does not configure its own.
const DEFAULT_SEARCH_COLUMNS: [&str; 3] = ["name", "title", "description"];

/// Build an `_or` filter matching `term` case-insensitively against the
/// schema's searchable text columns.
///
/// Columns come from the list view's `searchable_columns` when configured,
/// otherwise from the conventional `name`/`title`/`description` set. Only
/// text-kinded fields participate; a schema with no searchable text fields
/// yields `None` and the caller should leave `$where` unset.
pub fn search_filter(schema: &SchemaDef, term: &str) -> Option<Value> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let pattern = format!("%{term}%");
    let configured = schema
        .ui
        .as_ref()
        .and_then(|ui| ui.list_view.as_ref())
        .map(|lv| lv.searchable_columns.clone())
        .unwrap_or_default();

    let predicates: Vec<Value> = schema
        .fields
        .iter()
        .filter(|f| f.kind.is_text())
        .filter(|f| {
            if configured.is_empty() {
                DEFAULT_SEARCH_COLUMNS.contains(&f.name.as_str())
            } else {
                configured.iter().any(|c| c == &f.name)
            }
        })
        .map(|f| json!({ f.name.clone(): { "_ilike": pattern } }))
        .collect();

    if predicates.is_empty() {
        return None;
    }
    Some(json!({ "_or": predicates }))
}

/// Default ordering for a schema's list query.
///
/// Prefers the configured list-view sort, then `created_at` descending when
/// the schema has that field, then the primary key ascending.
pub fn default_order_by(schema: &SchemaDef) -> Value {
    if let Some(sort) = schema
        .ui
        .as_ref()
        .and_then(|ui| ui.list_view.as_ref())
        .and_then(|lv| lv.default_sort.as_ref())
    {
        return json!([{ sort.field.clone(): sort.direction.as_str() }]);
    }
    if schema.get_field("created_at").is_some() {
        return json!([{ "created_at": SortDirection::Desc.as_str() }]);
    }
    json!([{ schema.primary_key_name(): SortDirection::Asc.as_str() }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind, ListView, SortSpec, UiConfig};

    fn searchable_schema() -> SchemaDef {
        SchemaDef::page("Product")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("name", FieldKind::Text))
            .with_field(FieldDef::new("description", FieldKind::Text))
            .with_field(FieldDef::new("price", FieldKind::Decimal))
    }

    #[test]
    fn test_search_filter_defaults_to_conventional_columns() {
        let filter = search_filter(&searchable_schema(), "foo").unwrap();

        assert_eq!(
            filter,
            json!({
                "_or": [
                    { "name": { "_ilike": "%foo%" } },
                    { "description": { "_ilike": "%foo%" } },
                ]
            })
        );
    }

    #[test]
    fn test_search_filter_honors_configured_columns() {
        let schema = searchable_schema().with_ui(UiConfig {
            list_view: Some(ListView {
                searchable_columns: vec!["name".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        });

        let filter = search_filter(&schema, "foo").unwrap();
        assert_eq!(filter, json!({ "_or": [{ "name": { "_ilike": "%foo%" } }] }));
    }

    #[test]
    fn test_search_filter_skips_non_text_columns() {
        let schema = SchemaDef::page("Metric")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("value", FieldKind::Decimal))
            .with_ui(UiConfig {
                list_view: Some(ListView {
                    searchable_columns: vec!["value".to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            });

        assert!(search_filter(&schema, "foo").is_none());
    }

    #[test]
    fn test_search_filter_empty_term() {
        assert!(search_filter(&searchable_schema(), "  ").is_none());
    }

    #[test]
    fn test_order_by_prefers_configured_sort() {
        let schema = searchable_schema().with_ui(UiConfig {
            list_view: Some(ListView {
                default_sort: Some(SortSpec {
                    field: "name".to_string(),
                    direction: SortDirection::Asc,
                }),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(default_order_by(&schema), json!([{ "name": "asc" }]));
    }

    #[test]
    fn test_order_by_falls_back_to_created_at() {
        let schema = searchable_schema()
            .with_field(FieldDef::new("created_at", FieldKind::Timestamp).auto_updated());

        assert_eq!(default_order_by(&schema), json!([{ "created_at": "desc" }]));
    }

    #[test]
    fn test_order_by_falls_back_to_primary_key() {
        assert_eq!(default_order_by(&searchable_schema()), json!([{ "id": "asc" }]));
    }
}
