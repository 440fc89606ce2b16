//! Relationship definitions between schemas.

use super::field::AutoPopulateSource;
use super::schema::SchemaDef;
use serde::{Deserialize, Serialize};

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    /// One-to-one (local foreign key, unique).
    OneToOne,
    /// One-to-many (foreign key on the target schema).
    OneToMany,
    /// Many-to-one (local foreign key).
    ManyToOne,
    /// Many-to-many (through a junction table).
    ManyToMany,
}

impl Cardinality {
    /// Check if the relationship holds a collection of records.
    pub fn is_collection(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    /// Check if the relationship is a single reference held locally.
    pub fn is_reference(&self) -> bool {
        matches!(self, Cardinality::ManyToOne | Cardinality::OneToOne)
    }
}

/// A relationship from one schema to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDef {
    /// Relationship name (unique within the schema; also the form value key).
    pub name: String,
    /// Relationship cardinality.
    #[serde(rename = "type")]
    pub cardinality: Cardinality,
    /// Local field holding the foreign key (many-to-one/one-to-one).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    /// Name of the related schema.
    pub target_schema: String,
    /// Field on the target schema holding the back-reference (one-to-many).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    /// Whether a related record is required.
    #[serde(default)]
    pub required: bool,
    /// Whether deleting the owner should delete related records.
    #[serde(default)]
    pub cascade_delete: bool,
    /// GraphQL field name exposed by the backend, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphql_field: Option<String>,
    /// Junction table description for many-to-many relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction: Option<JunctionSpec>,
    /// Presentation hints.
    #[serde(default, rename = "ui_config", skip_serializing_if = "Option::is_none")]
    pub ui: Option<RelationshipUi>,
}

/// Junction table of a many-to-many relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionSpec {
    /// Junction table name.
    pub table: String,
    /// Junction column referencing the owning schema.
    pub source_field: String,
    /// Junction column referencing the target schema.
    pub target_field: String,
}

/// Presentation hints for a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipUi {
    /// Field of the related record shown as its label (possibly dotted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    /// Allow creating related records inline.
    #[serde(default = "default_true")]
    pub allow_create: bool,
    /// Allow editing related records inline.
    #[serde(default = "default_true")]
    pub allow_edit: bool,
    /// Allow deleting related records inline.
    #[serde(default = "default_true")]
    pub allow_delete: bool,
    /// Allow reordering related records.
    #[serde(default)]
    pub sortable: bool,
    /// Maximum number of related records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    /// Show the relationship as a list-view column.
    #[serde(default)]
    pub display_in_list: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RelationshipUi {
    fn default() -> Self {
        Self {
            display_field: None,
            allow_create: true,
            allow_edit: true,
            allow_delete: true,
            sortable: false,
            max_items: None,
            display_in_list: false,
        }
    }
}

impl RelationshipDef {
    /// Create a many-to-one relationship.
    pub fn many_to_one(
        name: impl Into<String>,
        source_field: impl Into<String>,
        target_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::ManyToOne,
            source_field: Some(source_field.into()),
            target_schema: target_schema.into(),
            target_field: None,
            required: false,
            cascade_delete: false,
            graphql_field: None,
            junction: None,
            ui: None,
        }
    }

    /// Create a one-to-many relationship.
    pub fn one_to_many(
        name: impl Into<String>,
        target_schema: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::OneToMany,
            source_field: None,
            target_schema: target_schema.into(),
            target_field: Some(target_field.into()),
            required: false,
            cascade_delete: false,
            graphql_field: None,
            junction: None,
            ui: None,
        }
    }

    /// Create a one-to-one relationship.
    pub fn one_to_one(
        name: impl Into<String>,
        source_field: impl Into<String>,
        target_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::OneToOne,
            source_field: Some(source_field.into()),
            target_schema: target_schema.into(),
            target_field: None,
            required: false,
            cascade_delete: false,
            graphql_field: None,
            junction: None,
            ui: None,
        }
    }

    /// Create a many-to-many relationship through a junction table.
    pub fn many_to_many(
        name: impl Into<String>,
        target_schema: impl Into<String>,
        junction: JunctionSpec,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::ManyToMany,
            source_field: None,
            target_schema: target_schema.into(),
            target_field: None,
            required: false,
            cascade_delete: true,
            graphql_field: None,
            junction: Some(junction),
            ui: None,
        }
    }

    /// Mark the related record as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Enable cascade delete.
    pub fn with_cascade_delete(mut self) -> Self {
        self.cascade_delete = true;
        self
    }

    /// Set the backend GraphQL field name.
    pub fn with_graphql_field(mut self, field: impl Into<String>) -> Self {
        self.graphql_field = Some(field.into());
        self
    }

    /// Set the presentation hints.
    pub fn with_ui(mut self, ui: RelationshipUi) -> Self {
        self.ui = Some(ui);
        self
    }

    /// GraphQL field name queried on the backend (defaults to the name).
    pub fn graphql_field(&self) -> &str {
        self.graphql_field.as_deref().unwrap_or(&self.name)
    }

    /// Display field of the related record (defaults to `name`).
    pub fn display_field(&self) -> &str {
        self.ui
            .as_ref()
            .and_then(|ui| ui.display_field.as_deref())
            .unwrap_or("name")
    }

    /// Check if the relationship is shown as a list-view column.
    pub fn display_in_list(&self) -> bool {
        self.ui.as_ref().is_some_and(|ui| ui.display_in_list)
    }

    /// Resolve the child-side field that stores the parent's id.
    ///
    /// Resolution order: a child field whose foreign key targets the parent's
    /// table, a child field auto-populated from parent context, the declared
    /// `target_field`, then naming-convention candidates that exist on the
    /// child. Falls back to `parent_id` when nothing matches.
    pub fn resolve_fk_field(&self, parent: &SchemaDef, child: &SchemaDef) -> String {
        let parent_table = parent.table_name();
        if let Some(field) = child
            .fields
            .iter()
            .find(|f| f.foreign_key.as_ref().is_some_and(|fk| fk.table == parent_table))
        {
            return field.name.clone();
        }

        if let Some(field) = child.fields.iter().find(|f| {
            f.auto_populate
                .as_ref()
                .is_some_and(|ap| ap.source == AutoPopulateSource::ParentContext)
        }) {
            return field.name.clone();
        }

        if let Some(target) = &self.target_field {
            if child.get_field(target).is_some() {
                return target.clone();
            }
        }

        let mut candidates = Vec::new();
        if let Some(first) = self.name.split('_').next() {
            candidates.push(format!("{first}_id"));
        }
        candidates.push("parent_id".to_string());
        candidates.push("reference_id".to_string());
        for candidate in candidates {
            if child.get_field(&candidate).is_some() {
                return candidate;
            }
        }

        "parent_id".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind};

    #[test]
    fn test_many_to_one_builder() {
        let rel = RelationshipDef::many_to_one("product_category", "category_id", "Category");

        assert_eq!(rel.cardinality, Cardinality::ManyToOne);
        assert!(rel.cardinality.is_reference());
        assert_eq!(rel.source_field.as_deref(), Some("category_id"));
        assert_eq!(rel.graphql_field(), "product_category");
    }

    #[test]
    fn test_one_to_many_builder() {
        let rel = RelationshipDef::one_to_many("line_items", "LineItem", "invoice_id")
            .with_cascade_delete();

        assert!(rel.cardinality.is_collection());
        assert!(rel.cascade_delete);
        assert_eq!(rel.target_field.as_deref(), Some("invoice_id"));
    }

    #[test]
    fn test_cardinality_serde_names() {
        assert_eq!(
            serde_json::to_string(&Cardinality::ManyToOne).unwrap(),
            "\"many-to-one\""
        );
        assert_eq!(
            serde_json::from_str::<Cardinality>("\"one-to-many\"").unwrap(),
            Cardinality::OneToMany
        );
    }

    #[test]
    fn test_relationship_ui_defaults() {
        let ui: RelationshipUi = serde_json::from_str("{}").unwrap();

        assert!(ui.allow_create);
        assert!(ui.allow_edit);
        assert!(ui.allow_delete);
        assert!(!ui.sortable);
        assert!(!ui.display_in_list);
    }

    fn child_schema(fields: Vec<FieldDef>) -> SchemaDef {
        let mut schema = SchemaDef::component("LineItem");
        schema.fields = fields;
        schema
    }

    #[test]
    fn test_resolve_fk_by_foreign_key_target() {
        let parent = SchemaDef::page("Invoice");
        let child = child_schema(vec![
            FieldDef::primary_key("id"),
            FieldDef::new("invoice_ref", FieldKind::Uuid).with_foreign_key("invoice", "id"),
        ]);
        let rel = RelationshipDef::one_to_many("line_items", "LineItem", "missing_field");

        assert_eq!(rel.resolve_fk_field(&parent, &child), "invoice_ref");
    }

    #[test]
    fn test_resolve_fk_by_target_field() {
        let parent = SchemaDef::page("Invoice");
        let child = child_schema(vec![
            FieldDef::primary_key("id"),
            FieldDef::new("invoice_id", FieldKind::Uuid),
        ]);
        let rel = RelationshipDef::one_to_many("line_items", "LineItem", "invoice_id");

        assert_eq!(rel.resolve_fk_field(&parent, &child), "invoice_id");
    }

    #[test]
    fn test_resolve_fk_by_naming_convention() {
        let parent = SchemaDef::page("Order");
        let child = child_schema(vec![
            FieldDef::primary_key("id"),
            FieldDef::new("order_id", FieldKind::Uuid),
        ]);
        let rel = RelationshipDef::one_to_many("order_lines", "LineItem", "missing_field");

        assert_eq!(rel.resolve_fk_field(&parent, &child), "order_id");
    }

    #[test]
    fn test_resolve_fk_fallback() {
        let parent = SchemaDef::page("Order");
        let child = child_schema(vec![FieldDef::primary_key("id")]);
        let rel = RelationshipDef::one_to_many("order_lines", "LineItem", "missing_field");

        assert_eq!(rel.resolve_fk_field(&parent, &child), "parent_id");
    }
}
