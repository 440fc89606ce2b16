//! Schema definitions - versioned, named metadata records.

use super::field::FieldDef;
use super::relation::RelationshipDef;
use super::ui::UiConfig;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Embeddable/relatable unit, not directly editable at the top level.
    Component,
    /// Top-level editable entity.
    Page,
}

/// A versioned, named schema record describing one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Stored row id, when loaded from the schema store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unique schema name; also derives the backing table name.
    pub name: String,
    /// Schema kind.
    pub kind: SchemaKind,
    /// Schema version; upserts are keyed on (name, version).
    #[serde(default = "default_version")]
    pub version: u32,
    /// Explicit backing table name, overriding the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Field shown as a record's label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    /// Ordered field definitions.
    pub fields: Vec<FieldDef>,
    /// Relationships to other schemas.
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,
    /// Presentation hints.
    #[serde(default, rename = "ui_config", skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiConfig>,
    /// Soft-delete flag; inactive schemas are invisible to reads.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Row creation time, when loaded from the schema store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Row update time, when loaded from the schema store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_version() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

impl SchemaDef {
    /// Create an empty page schema.
    pub fn page(name: impl Into<String>) -> Self {
        Self::new(name, SchemaKind::Page)
    }

    /// Create an empty component schema.
    pub fn component(name: impl Into<String>) -> Self {
        Self::new(name, SchemaKind::Component)
    }

    fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            version: 1,
            table: None,
            display_field: None,
            fields: Vec::new(),
            relationships: Vec::new(),
            ui: None,
            active: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a relationship.
    pub fn with_relationship(mut self, relationship: RelationshipDef) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Set the explicit backing table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the presentation hints.
    pub fn with_ui(mut self, ui: UiConfig) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a relationship by name.
    pub fn get_relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// The primary-key field, when declared.
    pub fn primary_key_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Primary-key field name, defaulting to `id` for undeclared schemas.
    pub fn primary_key_name(&self) -> &str {
        self.primary_key_field().map_or("id", |f| f.name.as_str())
    }

    /// Fields not hidden by presentation hints.
    pub fn visible_fields(&self) -> Vec<&FieldDef> {
        self.fields.iter().filter(|f| !f.is_hidden()).collect()
    }

    /// Names of fields that serve as some relationship's foreign key.
    pub fn relationship_source_fields(&self) -> HashSet<&str> {
        self.relationships
            .iter()
            .filter_map(|r| r.source_field.as_deref())
            .collect()
    }

    /// Backing table name: the explicit override, or snake_case of the name.
    pub fn table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| snake_case(&self.name))
    }

    /// PascalCase type name used in generated operation names.
    pub fn type_name(&self) -> String {
        pascal_case(&self.table_name())
    }

    /// Validate the schema invariants.
    ///
    /// All violations are collected before returning so the caller can report
    /// every problem at once.
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push("schema name is required".to_string());
        }
        if self.fields.is_empty() {
            violations.push("schema must declare at least one field".to_string());
        }

        let pk_count = self.fields.iter().filter(|f| f.primary_key).count();
        if pk_count == 0 {
            violations.push("schema must declare a primary key field".to_string());
        } else if pk_count > 1 {
            violations.push(format!(
                "schema declares {pk_count} primary key fields, expected exactly one"
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                violations.push(format!("duplicate field name: {}", field.name));
            }
        }

        for rel in &self.relationships {
            if rel.name.trim().is_empty() {
                violations.push("relationship name is required".to_string());
                continue;
            }
            if rel.target_schema.trim().is_empty() {
                violations.push(format!("relationship {} has no target schema", rel.name));
            }
            if rel.cardinality.is_reference() {
                match &rel.source_field {
                    None => violations.push(format!(
                        "relationship {} requires a source field",
                        rel.name
                    )),
                    Some(source) if self.get_field(source).is_none() => violations.push(format!(
                        "relationship {} references unknown source field {source}",
                        rel.name
                    )),
                    Some(_) => {}
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidSchema { violations })
        }
    }
}

/// Convert a schema name to its snake_case table form.
///
/// Uppercase runs become underscore-separated lowercase segments; spaces and
/// dashes are treated as separators. A leading separator is stripped.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == ' ' || ch == '-' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_matches('_').to_string()
}

/// Convert a snake_case table name to PascalCase.
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind, RelationshipDef};

    fn product_schema() -> SchemaDef {
        SchemaDef::page("Product")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("name", FieldKind::Text).required())
            .with_field(FieldDef::new("category_id", FieldKind::Uuid))
            .with_relationship(RelationshipDef::many_to_one(
                "product_category",
                "category_id",
                "Category",
            ))
    }

    #[test]
    fn test_schema_builder() {
        let schema = product_schema();

        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.relationships.len(), 1);
        assert!(schema.active);
        assert_eq!(schema.version, 1);
    }

    #[test]
    fn test_lookups() {
        let schema = product_schema();

        assert!(schema.get_field("name").is_some());
        assert!(schema.get_field("missing").is_none());
        assert!(schema.get_relationship("product_category").is_some());
        assert_eq!(schema.primary_key_name(), "id");
        assert!(schema
            .relationship_source_fields()
            .contains("category_id"));
    }

    #[test]
    fn test_table_name_derivation() {
        assert_eq!(SchemaDef::page("Product").table_name(), "product");
        assert_eq!(
            SchemaDef::page("ProductCategory").table_name(),
            "product_category"
        );
        assert_eq!(SchemaDef::page("APIKey").table_name(), "apikey");
        assert_eq!(
            SchemaDef::page("Order").with_table("sales_orders").table_name(),
            "sales_orders"
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(SchemaDef::page("ProductCategory").type_name(), "ProductCategory");
        assert_eq!(
            SchemaDef::page("Order").with_table("sales_orders").type_name(),
            "SalesOrders"
        );
    }

    #[test]
    fn test_validate_ok() {
        assert!(product_schema().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_primary_key() {
        let schema = SchemaDef::page("Broken").with_field(FieldDef::new("name", FieldKind::Text));
        let err = schema.validate().unwrap_err();

        match err {
            Error::InvalidSchema { violations } => {
                assert!(violations.iter().any(|v| v.contains("primary key")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_duplicate_fields() {
        let schema = SchemaDef::page("Broken")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("name", FieldKind::Text))
            .with_field(FieldDef::new("name", FieldKind::Text));
        let err = schema.validate().unwrap_err();

        match err {
            Error::InvalidSchema { violations } => {
                assert!(violations.iter().any(|v| v.contains("duplicate field")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_dangling_source_field() {
        let schema = SchemaDef::page("Broken")
            .with_field(FieldDef::primary_key("id"))
            .with_relationship(RelationshipDef::many_to_one(
                "product_category",
                "category_id",
                "Category",
            ));
        let err = schema.validate().unwrap_err();

        match err {
            Error::InvalidSchema { violations } => {
                assert!(violations
                    .iter()
                    .any(|v| v.contains("unknown source field")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let schema = SchemaDef::page("");
        let err = schema.validate().unwrap_err();

        match err {
            Error::InvalidSchema { violations } => {
                assert!(violations.len() >= 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("ProductCategory"), "product_category");
        assert_eq!(snake_case("product"), "product");
        assert_eq!(snake_case("Line Item"), "line_item");
        assert_eq!(snake_case("blog-post"), "blog_post");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("product_category"), "ProductCategory");
        assert_eq!(pascal_case("invoices"), "Invoices");
    }
}
