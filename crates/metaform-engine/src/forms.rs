//! Form descriptor orchestration.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use metaform_core::form::{
    default_values, fallback_schema, generate_field_configs, generate_relationship_configs,
    resolve_layout,
};
use metaform_core::{FormContext, FormDescriptor, FormMode};

use crate::error::Error;
use crate::loader::DataLoader;
use crate::store::SchemaStore;

/// Builds complete form descriptors from stored schemas.
pub struct FormEngine {
    store: Arc<SchemaStore>,
    loader: DataLoader,
}

impl FormEngine {
    /// Create a form engine over the given store and loader.
    pub fn new(store: Arc<SchemaStore>, loader: DataLoader) -> Self {
        Self { store, loader }
    }

    /// Build the form descriptor for a schema, in edit mode when
    /// `entity_id` is given.
    ///
    /// When the schema is not configured, a minimal fallback descriptor is
    /// returned instead of an error; callers can detect this by comparing
    /// the descriptor's schema name against
    /// [`FALLBACK_SCHEMA_ID`](metaform_core::form::FALLBACK_SCHEMA_ID).
    pub async fn generate_form_config(
        &self,
        schema_name: &str,
        entity_id: Option<&str>,
        context: Option<&FormContext>,
    ) -> Result<FormDescriptor, Error> {
        let resolved = self.store.get_schema_with_related(schema_name, None).await?;
        let (schema, related) = match resolved {
            Some(resolved) => (resolved.schema, resolved.related),
            None => {
                warn!(schema = schema_name, "schema not configured, serving fallback form");
                (fallback_schema(), BTreeMap::new())
            }
        };

        let mode = if entity_id.is_some() {
            FormMode::Edit
        } else {
            FormMode::Create
        };
        let initial_values = match entity_id {
            Some(id) => self.loader.fetch_initial_data(&schema, id, &related).await,
            None => default_values(&schema.fields, context),
        };

        Ok(FormDescriptor {
            mode,
            entity_id: entity_id.map(str::to_string),
            fields: generate_field_configs(&schema, mode),
            relationships: generate_relationship_configs(&schema.relationships),
            layout: resolve_layout(&schema),
            initial_values,
            related_schemas: related,
            schema,
        })
    }
}
