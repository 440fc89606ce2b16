//! Selection-set construction.

use crate::catalog::{Cardinality, RelationshipDef, SchemaDef};
use std::collections::BTreeMap;

/// Render a column name as a selection entry.
///
/// A name containing a literal `.` projects into a related object:
/// `category.name` becomes `category { name }`. Schemas store relationship
/// display fields this way, so the convention must hold everywhere columns
/// are rendered.
pub fn column_selection(column: &str) -> String {
    match column.split_once('.') {
        Some((head, rest)) => format!("{head} {{ {} }}", column_selection(rest)),
        None => column.to_string(),
    }
}

/// Names of a schema's visible fields, keeping the primary key even when its
/// presentation hints hide it.
pub fn visible_columns(schema: &SchemaDef) -> Vec<String> {
    let pk = schema.primary_key_name();
    schema
        .fields
        .iter()
        .filter(|f| !f.is_hidden() || f.name == pk)
        .map(|f| f.name.clone())
        .collect()
}

/// Selection for a relationship as seen from the owning record.
///
/// Reference and many-to-many relationships select the target id plus its
/// display field; one-to-many and one-to-one relationships expand to the
/// related schema's full visible field set when that schema is known (one
/// level only; deeper relationships are not expanded).
pub fn relationship_selection(
    rel: &RelationshipDef,
    related: &BTreeMap<String, SchemaDef>,
) -> String {
    let field = rel.graphql_field();
    match rel.cardinality {
        Cardinality::ManyToOne | Cardinality::ManyToMany => {
            reference_selection(field, rel.display_field())
        }
        Cardinality::OneToMany | Cardinality::OneToOne => match related.get(&rel.target_schema) {
            Some(target) => {
                let columns: Vec<String> = visible_columns(target)
                    .iter()
                    .map(|c| column_selection(c))
                    .collect();
                format!("{field} {{ {} }}", columns.join(" "))
            }
            None => reference_selection(field, rel.display_field()),
        },
    }
}

/// Compact `field { id display }` selection for a referenced record.
pub fn reference_selection(field: &str, display_field: &str) -> String {
    if display_field == "id" {
        return format!("{field} {{ id }}");
    }
    format!("{field} {{ id {} }}", column_selection(display_field))
}

/// Scalar type of a schema's primary key, with the non-null marker.
pub(crate) fn pk_type(schema: &SchemaDef) -> String {
    let scalar = schema
        .primary_key_field()
        .map_or("uuid", |f| f.kind.graphql_scalar());
    format!("{scalar}!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind, FieldUi, RelationshipDef, RelationshipUi};

    #[test]
    fn test_plain_column() {
        assert_eq!(column_selection("name"), "name");
    }

    #[test]
    fn test_dotted_column_nests() {
        assert_eq!(column_selection("category.name"), "category { name }");
        assert_eq!(
            column_selection("category.parent.name"),
            "category { parent { name } }"
        );
    }

    #[test]
    fn test_visible_columns_keeps_primary_key() {
        let schema = SchemaDef::page("Product")
            .with_field(FieldDef::primary_key("id").with_ui(FieldUi {
                hidden: true,
                ..Default::default()
            }))
            .with_field(FieldDef::new("name", FieldKind::Text))
            .with_field(FieldDef::new("internal", FieldKind::Text).with_ui(FieldUi {
                hidden: true,
                ..Default::default()
            }));

        assert_eq!(visible_columns(&schema), vec!["id", "name"]);
    }

    #[test]
    fn test_reference_selection() {
        let rel = RelationshipDef::many_to_one("product_category", "category_id", "Category")
            .with_ui(RelationshipUi {
                display_field: Some("title".to_string()),
                ..Default::default()
            });

        assert_eq!(
            relationship_selection(&rel, &BTreeMap::new()),
            "product_category { id title }"
        );
    }

    #[test]
    fn test_collection_selection_expands_target_fields() {
        let line_item = SchemaDef::component("LineItem")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("amount", FieldKind::Decimal))
            .with_field(FieldDef::new("description", FieldKind::Text));
        let mut related = BTreeMap::new();
        related.insert("LineItem".to_string(), line_item);
        let rel = RelationshipDef::one_to_many("line_items", "LineItem", "invoice_id");

        assert_eq!(
            relationship_selection(&rel, &related),
            "line_items { id amount description }"
        );
    }

    #[test]
    fn test_collection_selection_without_target_schema() {
        let rel = RelationshipDef::one_to_many("line_items", "LineItem", "invoice_id");

        assert_eq!(
            relationship_selection(&rel, &BTreeMap::new()),
            "line_items { id name }"
        );
    }

    #[test]
    fn test_graphql_field_override() {
        let rel = RelationshipDef::many_to_one("product_category", "category_id", "Category")
            .with_graphql_field("category");

        assert_eq!(
            relationship_selection(&rel, &BTreeMap::new()),
            "category { id name }"
        );
    }
}
