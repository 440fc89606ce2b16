//! Field definitions for schemas.

use super::types::{FieldKind, Widget};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A field definition within a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name (unique within the schema).
    pub name: String,
    /// Field data type.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Whether a value is required on submission.
    #[serde(default)]
    pub required: bool,
    /// Whether this field is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the value is generated by the ID service, not entered by users.
    #[serde(default)]
    pub auto_generate: bool,
    /// Whether the backend maintains the value on every write (e.g. updated_at).
    #[serde(default)]
    pub auto_update: bool,
    /// Default value seeded into new forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Foreign-key target, when this field stores another record's identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
    /// Declared validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    /// Automatic population directive for create-mode defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_populate: Option<AutoPopulate>,
    /// Presentation hints.
    #[serde(default, rename = "ui_config", skip_serializing_if = "Option::is_none")]
    pub ui: Option<FieldUi>,
}

/// Foreign-key target of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// Target table name.
    pub table: String,
    /// Target column name.
    pub column: String,
    /// Declared delete behavior, advisory only (e.g. "CASCADE").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

/// Declared validation constraints on a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Value must look like an email address.
    #[serde(default)]
    pub email: bool,
    /// Value must look like a URL.
    #[serde(default)]
    pub url: bool,
    /// Maximum number of items for array kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    /// Message overriding the generated rule messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// Automatic value population directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoPopulate {
    /// Where the value comes from.
    pub source: AutoPopulateSource,
    /// Source-specific field selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Source of an auto-populated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPopulateSource {
    /// Parent record id supplied when creating a child inline from a parent form.
    ParentContext,
    /// Identity of the submitting user (recognized, not yet implemented).
    CurrentUser,
    /// Submission timestamp (recognized, not yet implemented).
    Timestamp,
}

/// Presentation hints for a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldUi {
    /// Explicit widget, overriding the type default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
    /// Display label, overriding the humanized field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text shown beside the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Hide the field from forms and lists.
    #[serde(default)]
    pub hidden: bool,
    /// Render the field read-only regardless of mode.
    #[serde(default)]
    pub readonly: bool,
    /// Options for select widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    /// Show the field only when another field holds a given value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_display: Option<ConditionalDisplay>,
    /// Dotted path to the label field of a referenced record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    /// Grid columns the field spans in a form layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_cols: Option<u8>,
}

/// One entry of a select widget's options list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored value.
    pub value: Value,
    /// Display label.
    pub label: String,
}

/// Rule for conditionally displaying a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalDisplay {
    /// Field whose value controls visibility.
    pub field: String,
    /// Value that makes this field visible.
    pub value: Value,
}

impl FieldDef {
    /// Create a new optional field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            primary_key: false,
            auto_generate: false,
            auto_update: false,
            default: None,
            foreign_key: None,
            validation: None,
            auto_populate: None,
            ui: None,
        }
    }

    /// Create a uuid primary-key field with auto-generated values.
    pub fn primary_key(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldKind::Uuid);
        field.primary_key = true;
        field.auto_generate = true;
        field
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark the value as generated by the backend on insert.
    pub fn auto_generated(mut self) -> Self {
        self.auto_generate = true;
        self
    }

    /// Mark the value as maintained by the backend on every write.
    pub fn auto_updated(mut self) -> Self {
        self.auto_update = true;
        self
    }

    /// Set the foreign-key target.
    pub fn with_foreign_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
            on_delete: None,
        });
        self
    }

    /// Set the validation rules.
    pub fn with_validation(mut self, validation: ValidationRules) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Set the auto-populate directive.
    pub fn with_auto_populate(mut self, source: AutoPopulateSource) -> Self {
        self.auto_populate = Some(AutoPopulate {
            source,
            field: None,
        });
        self
    }

    /// Set the presentation hints.
    pub fn with_ui(mut self, ui: FieldUi) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Check if the field is hidden from forms and lists.
    pub fn is_hidden(&self) -> bool {
        self.ui.as_ref().is_some_and(|ui| ui.hidden)
    }

    /// Check if the field holds a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    /// Explicitly declared widget, if any.
    pub fn declared_widget(&self) -> Option<&Widget> {
        self.ui.as_ref().and_then(|ui| ui.widget.as_ref())
    }
}
