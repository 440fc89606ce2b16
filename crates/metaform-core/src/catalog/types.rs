//! Field kinds and widget vocabulary.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// UUID identifier.
    Uuid,
    /// Free-form text.
    Text,
    /// Array of text values.
    #[serde(rename = "text[]")]
    TextArray,
    /// Whole number.
    Integer,
    /// Arbitrary-precision decimal.
    Decimal,
    /// Boolean flag.
    Boolean,
    /// Timestamp with timezone.
    Timestamp,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// JSON document.
    Json,
    /// Binary JSON document (storage-level distinction only).
    Jsonb,
    /// Enumerated value drawn from a declared options list.
    Enum,
}

impl FieldKind {
    /// Check if values of this kind are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Decimal)
    }

    /// Check if values of this kind are arrays.
    pub fn is_array(&self) -> bool {
        matches!(self, FieldKind::TextArray)
    }

    /// Check if values of this kind are searchable text.
    pub fn is_text(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// Check if values of this kind are JSON documents.
    pub fn is_json(&self) -> bool {
        matches!(self, FieldKind::Json | FieldKind::Jsonb)
    }

    /// GraphQL scalar type name used for primary-key variables of this kind.
    pub fn graphql_scalar(&self) -> &'static str {
        match self {
            FieldKind::Uuid => "uuid",
            FieldKind::Integer => "Int",
            _ => "String",
        }
    }
}

/// Widget a field or relationship renders as.
///
/// Serialized as a plain snake_case string. Names outside the known set are
/// preserved as [`Widget::Custom`] so presentation-layer extensions round-trip
/// through the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    /// Single-line text input.
    TextInput,
    /// Multi-line text input.
    TextArea,
    /// Repeatable text entry list.
    TextArray,
    /// Numeric input.
    NumberInput,
    /// Currency-formatted numeric input.
    CurrencyInput,
    /// Boolean checkbox.
    Checkbox,
    /// Date + time picker.
    DatetimeInput,
    /// Date picker.
    DateInput,
    /// Time picker.
    TimeInput,
    /// Single-choice dropdown over a declared options list.
    Select,
    /// Multi-choice selector.
    MultiSelect,
    /// Structured JSON editor.
    JsonEditor,
    /// Rich text editor.
    RichText,
    /// File upload control.
    FileUpload,
    /// Not rendered; value carried in form state only.
    Hidden,
    /// Single-reference selector for many-to-one/one-to-one relationships.
    RelationshipSelect,
    /// Inline repeatable editor for one-to-many relationships.
    InlineEditor,
    /// Unknown widget name, passed through verbatim.
    Custom(String),
}

impl Widget {
    /// Default widget for a field kind.
    pub fn default_for(kind: FieldKind) -> Widget {
        match kind {
            FieldKind::Uuid => Widget::Hidden,
            FieldKind::Text => Widget::TextInput,
            FieldKind::TextArray => Widget::TextArray,
            FieldKind::Integer | FieldKind::Decimal => Widget::NumberInput,
            FieldKind::Boolean => Widget::Checkbox,
            FieldKind::Timestamp => Widget::DatetimeInput,
            FieldKind::Date => Widget::DateInput,
            FieldKind::Time => Widget::TimeInput,
            FieldKind::Enum => Widget::Select,
            FieldKind::Json | FieldKind::Jsonb => Widget::JsonEditor,
        }
    }

    /// Widget name as stored in schema metadata.
    pub fn as_str(&self) -> &str {
        match self {
            Widget::TextInput => "text_input",
            Widget::TextArea => "text_area",
            Widget::TextArray => "text_array",
            Widget::NumberInput => "number_input",
            Widget::CurrencyInput => "currency_input",
            Widget::Checkbox => "checkbox",
            Widget::DatetimeInput => "datetime_input",
            Widget::DateInput => "date_input",
            Widget::TimeInput => "time_input",
            Widget::Select => "select",
            Widget::MultiSelect => "multi_select",
            Widget::JsonEditor => "json_editor",
            Widget::RichText => "rich_text",
            Widget::FileUpload => "file_upload",
            Widget::Hidden => "hidden",
            Widget::RelationshipSelect => "relationship_select",
            Widget::InlineEditor => "inline_editor",
            Widget::Custom(name) => name,
        }
    }
}

impl From<&str> for Widget {
    fn from(name: &str) -> Self {
        match name {
            "text_input" => Widget::TextInput,
            "text_area" => Widget::TextArea,
            "text_array" => Widget::TextArray,
            "number_input" => Widget::NumberInput,
            "currency_input" => Widget::CurrencyInput,
            "checkbox" => Widget::Checkbox,
            "datetime_input" => Widget::DatetimeInput,
            "date_input" => Widget::DateInput,
            "time_input" => Widget::TimeInput,
            "select" => Widget::Select,
            "multi_select" => Widget::MultiSelect,
            "json_editor" => Widget::JsonEditor,
            "rich_text" => Widget::RichText,
            "file_upload" => Widget::FileUpload,
            "hidden" => Widget::Hidden,
            "relationship_select" => Widget::RelationshipSelect,
            "inline_editor" => Widget::InlineEditor,
            other => Widget::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Widget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Widget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WidgetVisitor;

        impl Visitor<'_> for WidgetVisitor {
            type Value = Widget;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a widget name string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Widget, E> {
                Ok(Widget::from(v))
            }
        }

        deserializer.deserialize_str(WidgetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_serde_names() {
        assert_eq!(serde_json::to_string(&FieldKind::Text).unwrap(), "\"text\"");
        assert_eq!(
            serde_json::to_string(&FieldKind::TextArray).unwrap(),
            "\"text[]\""
        );
        assert_eq!(
            serde_json::from_str::<FieldKind>("\"timestamp\"").unwrap(),
            FieldKind::Timestamp
        );
    }

    #[test]
    fn test_field_kind_predicates() {
        assert!(FieldKind::Integer.is_numeric());
        assert!(FieldKind::Decimal.is_numeric());
        assert!(!FieldKind::Text.is_numeric());
        assert!(FieldKind::TextArray.is_array());
        assert!(FieldKind::Jsonb.is_json());
    }

    #[test]
    fn test_default_widgets() {
        assert_eq!(Widget::default_for(FieldKind::Text), Widget::TextInput);
        assert_eq!(Widget::default_for(FieldKind::Uuid), Widget::Hidden);
        assert_eq!(Widget::default_for(FieldKind::Integer), Widget::NumberInput);
        assert_eq!(Widget::default_for(FieldKind::Decimal), Widget::NumberInput);
        assert_eq!(Widget::default_for(FieldKind::Boolean), Widget::Checkbox);
        assert_eq!(Widget::default_for(FieldKind::Enum), Widget::Select);
        assert_eq!(Widget::default_for(FieldKind::Json), Widget::JsonEditor);
        assert_eq!(
            Widget::default_for(FieldKind::Timestamp),
            Widget::DatetimeInput
        );
    }

    #[test]
    fn test_widget_roundtrip() {
        let known: Widget = serde_json::from_str("\"json_editor\"").unwrap();
        assert_eq!(known, Widget::JsonEditor);

        let custom: Widget = serde_json::from_str("\"color_picker\"").unwrap();
        assert_eq!(custom, Widget::Custom("color_picker".to_string()));
        assert_eq!(serde_json::to_string(&custom).unwrap(), "\"color_picker\"");
    }

    #[test]
    fn test_graphql_scalar() {
        assert_eq!(FieldKind::Uuid.graphql_scalar(), "uuid");
        assert_eq!(FieldKind::Text.graphql_scalar(), "String");
        assert_eq!(FieldKind::Integer.graphql_scalar(), "Int");
    }
}
