//! Form layout synthesis.

use super::config::humanize;
use crate::catalog::{FormLayout, FormSection, FormTab, SchemaDef};

/// Resolve a schema's form layout: the declared one, or a synthesized default.
pub fn resolve_layout(schema: &SchemaDef) -> FormLayout {
    if let Some(declared) = schema.ui.as_ref().and_then(|ui| ui.form_layout.as_ref()) {
        if !declared.is_empty() {
            return declared.clone();
        }
    }
    default_layout(schema)
}

/// Synthesize the fallback layout for a schema without a declared one.
///
/// Schemas without relationships get a single flat section; schemas with
/// relationships get a basic-information tab plus one tab per relationship.
pub fn default_layout(schema: &SchemaDef) -> FormLayout {
    let field_names: Vec<String> = schema
        .fields
        .iter()
        .filter(|f| !f.is_hidden() && !f.auto_generate)
        .map(|f| f.name.clone())
        .collect();

    if schema.relationships.is_empty() {
        return FormLayout {
            sections: vec![FormSection::new("General Information", field_names)],
            tabs: Vec::new(),
        };
    }

    let mut tabs = vec![FormTab {
        name: "basic".to_string(),
        title: "Basic Information".to_string(),
        sections: vec![FormSection::new("General Information", field_names)],
        relationships: Vec::new(),
    }];
    for rel in &schema.relationships {
        tabs.push(FormTab {
            name: rel.name.clone(),
            title: humanize(&rel.name),
            sections: Vec::new(),
            relationships: vec![rel.name.clone()],
        });
    }

    FormLayout {
        sections: Vec::new(),
        tabs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldDef, FieldKind, RelationshipDef, UiConfig};

    #[test]
    fn test_flat_layout_without_relationships() {
        let schema = SchemaDef::page("Note")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("title", FieldKind::Text))
            .with_field(FieldDef::new("body", FieldKind::Text));
        let layout = default_layout(&schema);

        assert!(layout.tabs.is_empty());
        assert_eq!(layout.sections.len(), 1);
        assert_eq!(layout.sections[0].title, "General Information");
        // id is auto-generated and excluded.
        assert_eq!(layout.sections[0].fields, vec!["title", "body"]);
    }

    #[test]
    fn test_tabbed_layout_with_relationships() {
        let schema = SchemaDef::page("Invoice")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("total", FieldKind::Decimal))
            .with_relationship(RelationshipDef::one_to_many(
                "line_items",
                "LineItem",
                "invoice_id",
            ));
        let layout = default_layout(&schema);

        assert!(layout.sections.is_empty());
        assert_eq!(layout.tabs.len(), 2);
        assert_eq!(layout.tabs[0].name, "basic");
        assert_eq!(layout.tabs[1].name, "line_items");
        assert_eq!(layout.tabs[1].title, "Line Items");
        assert_eq!(layout.tabs[1].relationships, vec!["line_items"]);
    }

    #[test]
    fn test_declared_layout_wins() {
        let declared = FormLayout {
            sections: vec![FormSection::new("Custom", vec!["title".to_string()])],
            tabs: Vec::new(),
        };
        let schema = SchemaDef::page("Note")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("title", FieldKind::Text))
            .with_ui(UiConfig {
                form_layout: Some(declared.clone()),
                ..Default::default()
            });

        assert_eq!(resolve_layout(&schema), declared);
    }

    #[test]
    fn test_empty_declared_layout_falls_back() {
        let schema = SchemaDef::page("Note")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("title", FieldKind::Text))
            .with_ui(UiConfig {
                form_layout: Some(FormLayout::default()),
                ..Default::default()
            });
        let layout = resolve_layout(&schema);

        assert_eq!(layout.sections.len(), 1);
    }
}
