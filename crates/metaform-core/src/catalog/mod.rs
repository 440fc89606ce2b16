//! Typed schema catalog.
//!
//! Schemas are database-stored metadata records describing an entity's
//! fields, relationships, and presentation hints. Everything downstream
//! (form descriptors, GraphQL text, change detection, delete planning) is
//! derived from these types.

mod field;
mod relation;
mod schema;
mod types;
mod ui;

pub use field::{
    AutoPopulate, AutoPopulateSource, ConditionalDisplay, FieldDef, FieldUi, ForeignKeyRef,
    SelectOption, ValidationRules,
};
pub use relation::{Cardinality, JunctionSpec, RelationshipDef, RelationshipUi};
pub use schema::{pascal_case, snake_case, SchemaDef, SchemaKind};
pub use types::{FieldKind, Widget};
pub use ui::{FormLayout, FormSection, FormTab, ListView, SortDirection, SortSpec, UiConfig};
