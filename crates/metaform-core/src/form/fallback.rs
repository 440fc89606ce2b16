//! Degraded-mode fallback schema.

use crate::catalog::{FieldDef, FieldKind, SchemaDef};

/// Identity of the fallback schema; callers compare against this to detect
/// degraded mode.
pub const FALLBACK_SCHEMA_ID: &str = "default";

/// Minimal schema used when the requested one cannot be resolved.
///
/// Form generation never fails outright on an unresolvable schema name; it
/// degrades to this descriptor so a caller still gets a usable form.
pub fn fallback_schema() -> SchemaDef {
    let mut schema = SchemaDef::page(FALLBACK_SCHEMA_ID)
        .with_field(FieldDef::primary_key("id"))
        .with_field(FieldDef::new("name", FieldKind::Text).required())
        .with_field(FieldDef::new("description", FieldKind::Text));
    schema.id = Some(FALLBACK_SCHEMA_ID.to_string());
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_schema_is_valid() {
        let schema = fallback_schema();

        assert!(schema.validate().is_ok());
        assert_eq!(schema.id.as_deref(), Some(FALLBACK_SCHEMA_ID));
        assert_eq!(schema.primary_key_name(), "id");
    }
}
