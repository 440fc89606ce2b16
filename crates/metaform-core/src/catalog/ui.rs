//! Schema-level presentation hints: list views and form layouts.

use serde::{Deserialize, Serialize};

/// Presentation hints declared on a schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// List-view configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_view: Option<ListView>,
    /// Declared form layout, overriding the synthesized default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_layout: Option<FormLayout>,
}

/// Configuration of a schema's list view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListView {
    /// Columns to display, in order. Dotted names project into related records.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Columns included in free-text search.
    #[serde(default)]
    pub searchable_columns: Vec<String>,
    /// Default sort order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<SortSpec>,
}

/// A sort directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort by.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Hasura order_by keyword for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Form layout: a flat list of sections, or a set of tabs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormLayout {
    /// Top-level sections (flat layout).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<FormSection>,
    /// Tabs (tabbed layout). Takes precedence over `sections` when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<FormTab>,
}

/// A titled group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    /// Section title.
    pub title: String,
    /// Field names shown in this section.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Grid columns for the section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
}

/// A tab grouping sections and relationship editors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTab {
    /// Tab identifier.
    pub name: String,
    /// Tab title.
    pub title: String,
    /// Sections within this tab.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<FormSection>,
    /// Relationship names edited within this tab.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<String>,
}

impl FormLayout {
    /// Check if the layout declares neither sections nor tabs.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.tabs.is_empty()
    }
}

impl FormSection {
    /// Create a section over the given field names.
    pub fn new(title: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            title: title.into(),
            fields,
            columns: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_view_deserialize() {
        let raw = r#"{
            "columns": ["name", "category.name", "price"],
            "searchable_columns": ["name"],
            "default_sort": {"field": "name", "direction": "asc"}
        }"#;
        let view: ListView = serde_json::from_str(raw).unwrap();

        assert_eq!(view.columns.len(), 3);
        assert_eq!(view.default_sort.unwrap().direction, SortDirection::Asc);
    }

    #[test]
    fn test_form_layout_empty() {
        let layout = FormLayout::default();
        assert!(layout.is_empty());

        let with_section = FormLayout {
            sections: vec![FormSection::new("General", vec!["name".to_string()])],
            tabs: Vec::new(),
        };
        assert!(!with_section.is_empty());
    }

    #[test]
    fn test_sort_direction_keyword() {
        assert_eq!(SortDirection::Desc.as_str(), "desc");
        assert_eq!(
            serde_json::to_string(&SortDirection::Desc).unwrap(),
            "\"desc\""
        );
    }
}
