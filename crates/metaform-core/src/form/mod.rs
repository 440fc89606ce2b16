//! Form descriptor generation.
//!
//! Resolves schema metadata into a UI-agnostic form description: per-field
//! widgets and validation rules, per-relationship editor configuration, a
//! layout, and seeded default values. Widget and rule dispatch happens once
//! here, not at render time.

mod config;
mod defaults;
mod fallback;
mod layout;
mod rules;

pub use config::{
    generate_field_configs, generate_relationship_configs, humanize, relationship_widget,
    FieldConfig, FormDescriptor, FormMode, RelationshipConfig,
};
pub use defaults::{default_values, FormContext};
pub use fallback::{fallback_schema, FALLBACK_SCHEMA_ID};
pub use layout::{default_layout, resolve_layout};
pub use rules::{resolve_rules, validate_record, ValidationRule};
