//! Metaform Core - Schema catalog, form generation, and change reconciliation.
//!
//! Everything in this crate is pure: schema definitions in, generated
//! operation text, form descriptors, change sets and delete plans out. The
//! crates that own network connections build on these types.

pub mod cascade;
pub mod catalog;
pub mod diff;
pub mod error;
pub mod form;
pub mod graphql;

pub use cascade::{DeletePlan, DeleteStep, FkEdge};
pub use catalog::{
    Cardinality, FieldDef, FieldKind, FieldUi, JunctionSpec, ListView, RelationshipDef,
    RelationshipUi, SchemaDef, SchemaKind, SortDirection, SortSpec, UiConfig, Widget,
};
pub use diff::{detect_changes, item_id, ChangeSet, RelationshipChanges};
pub use error::Error;
pub use form::{FieldConfig, FormContext, FormDescriptor, FormMode, RelationshipConfig};
