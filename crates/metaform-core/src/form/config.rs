//! Form descriptor generation from schema metadata.

use super::rules::{resolve_rules, ValidationRule};
use crate::catalog::{
    Cardinality, ConditionalDisplay, FieldKind, FormLayout, RelationshipDef, SchemaDef,
    SelectOption, Widget,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    /// Creating a new record.
    Create,
    /// Editing an existing record.
    Edit,
}

impl FormMode {
    /// Check if this is edit mode.
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit)
    }
}

/// Resolved configuration of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field name.
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Display label.
    pub label: String,
    /// Resolved widget.
    pub widget: Widget,
    /// Whether a value is required.
    pub required: bool,
    /// Whether the field is read-only in this mode.
    pub readonly: bool,
    /// Whether the field is hidden.
    pub hidden: bool,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Options for select widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    /// Conditional-display rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_display: Option<ConditionalDisplay>,
    /// Grid columns the field spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_cols: Option<u8>,
    /// Resolved validation rules, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ValidationRule>,
}

/// Resolved configuration of one relationship editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipConfig {
    /// Relationship name.
    pub name: String,
    /// Relationship cardinality.
    #[serde(rename = "type")]
    pub cardinality: Cardinality,
    /// Display label.
    pub label: String,
    /// Resolved widget.
    pub widget: Widget,
    /// Related schema name.
    pub target_schema: String,
    /// Local foreign-key field, for reference relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    /// Back-reference field on the related schema, for collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    /// Whether a related record is required.
    pub required: bool,
    /// Display field of related records.
    pub display_field: String,
    /// Allow creating related records inline.
    pub allow_create: bool,
    /// Allow editing related records inline.
    pub allow_edit: bool,
    /// Allow deleting related records inline.
    pub allow_delete: bool,
    /// Allow reordering related records.
    pub sortable: bool,
    /// Maximum number of related records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
}

/// A generated, UI-agnostic form description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// The resolved schema.
    pub schema: SchemaDef,
    /// Create or edit.
    pub mode: FormMode,
    /// Id of the record being edited, in edit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Per-field configuration, in schema field order.
    pub fields: Vec<FieldConfig>,
    /// Per-relationship configuration, in schema relationship order.
    pub relationships: Vec<RelationshipConfig>,
    /// Layout: declared on the schema, or synthesized.
    pub layout: FormLayout,
    /// Initial values keyed by field/relationship name.
    pub initial_values: Map<String, Value>,
    /// Related schemas keyed by name, as deep as relationships reach.
    pub related_schemas: BTreeMap<String, SchemaDef>,
}

/// Resolve field configurations for a schema in the given mode.
///
/// A field is forced read-only in edit mode when it is the primary key, is
/// auto-generated, or is the foreign key behind some relationship selector.
pub fn generate_field_configs(schema: &SchemaDef, mode: FormMode) -> Vec<FieldConfig> {
    let source_fields = schema.relationship_source_fields();

    schema
        .fields
        .iter()
        .map(|field| {
            let ui = field.ui.as_ref();
            let label = ui
                .and_then(|u| u.label.clone())
                .unwrap_or_else(|| humanize(&field.name));
            let widget = field
                .declared_widget()
                .cloned()
                .unwrap_or_else(|| Widget::default_for(field.kind));
            let forced_readonly = mode.is_edit()
                && (field.primary_key
                    || field.auto_generate
                    || source_fields.contains(field.name.as_str()));

            FieldConfig {
                name: field.name.clone(),
                kind: field.kind,
                rules: resolve_rules(field, &label),
                label,
                widget,
                required: field.required,
                readonly: ui.is_some_and(|u| u.readonly) || forced_readonly,
                hidden: field.is_hidden() || field.auto_generate,
                placeholder: ui.and_then(|u| u.placeholder.clone()),
                help_text: ui.and_then(|u| u.help_text.clone()),
                options: ui.and_then(|u| u.options.clone()),
                conditional_display: ui.and_then(|u| u.conditional_display.clone()),
                grid_cols: ui.and_then(|u| u.grid_cols),
            }
        })
        .collect()
}

/// Resolve relationship configurations for a schema.
pub fn generate_relationship_configs(relationships: &[RelationshipDef]) -> Vec<RelationshipConfig> {
    relationships
        .iter()
        .map(|rel| {
            let ui = rel.ui.clone().unwrap_or_default();
            RelationshipConfig {
                name: rel.name.clone(),
                cardinality: rel.cardinality,
                label: humanize(&rel.name),
                widget: relationship_widget(rel.cardinality),
                target_schema: rel.target_schema.clone(),
                source_field: rel.source_field.clone(),
                target_field: rel.target_field.clone(),
                required: rel.required,
                display_field: rel.display_field().to_string(),
                allow_create: ui.allow_create,
                allow_edit: ui.allow_edit,
                allow_delete: ui.allow_delete,
                sortable: ui.sortable,
                max_items: ui.max_items,
            }
        })
        .collect()
}

/// Default widget for a relationship cardinality.
pub fn relationship_widget(cardinality: Cardinality) -> Widget {
    match cardinality {
        Cardinality::ManyToOne | Cardinality::OneToOne => Widget::RelationshipSelect,
        Cardinality::OneToMany => Widget::InlineEditor,
        Cardinality::ManyToMany => Widget::MultiSelect,
    }
}

/// Humanize a field or relationship name into a display label.
///
/// Underscores become spaces, camelCase boundaries split, and each word is
/// title-cased: `product_name` and `productName` both become `Product Name`.
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == ' ' {
            if !current.is_empty() {
                words.push(current.clone());
                current.clear();
            }
        } else if ch.is_ascii_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
            current.push(ch);
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
