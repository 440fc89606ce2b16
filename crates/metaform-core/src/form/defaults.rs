//! Default value seeding for new forms.

use crate::catalog::{AutoPopulateSource, FieldDef, FieldKind};
use serde_json::{Map, Value};

/// Contextual values available when a form is opened from a parent record.
#[derive(Debug, Clone, Default)]
pub struct FormContext {
    /// Parent record id, when creating a child inline from a parent form.
    pub parent_id: Option<String>,
}

impl FormContext {
    /// Context carrying a parent record id.
    pub fn with_parent(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
        }
    }
}

/// Seed initial values for a create-mode form.
///
/// Declared defaults win; otherwise booleans start false, numerics start at
/// their validation minimum (or zero), and array kinds start empty. Fields
/// auto-populated from parent context receive the supplied parent id last,
/// overriding any declared default.
pub fn default_values(fields: &[FieldDef], context: Option<&FormContext>) -> Map<String, Value> {
    let mut values = Map::new();

    for field in fields {
        if let Some(default) = &field.default {
            values.insert(field.name.clone(), default.clone());
        } else if field.kind == FieldKind::Boolean {
            values.insert(field.name.clone(), Value::Bool(false));
        } else if field.kind.is_numeric() {
            let min = field.validation.as_ref().and_then(|v| v.min);
            let seed = match field.kind {
                FieldKind::Integer => Value::from(min.unwrap_or(0.0) as i64),
                _ => Value::from(min.unwrap_or(0.0)),
            };
            values.insert(field.name.clone(), seed);
        } else if field.kind.is_array() {
            values.insert(field.name.clone(), Value::Array(Vec::new()));
        }
    }

    if let Some(parent_id) = context.and_then(|c| c.parent_id.as_deref()) {
        for field in fields {
            let from_parent = field
                .auto_populate
                .as_ref()
                .is_some_and(|ap| ap.source == AutoPopulateSource::ParentContext);
            if from_parent {
                values.insert(field.name.clone(), Value::String(parent_id.to_string()));
            }
        }
    }

    values
}
