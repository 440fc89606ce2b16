//! Schema store client: versioned schema rows behind a TTL cache.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use metaform_client::{DataBackend, SchemaCache};
use metaform_core::{FieldDef, RelationshipDef, SchemaDef, SchemaKind, UiConfig};

use crate::error::Error;

/// Default table holding schema metadata rows.
pub const DEFAULT_SCHEMA_TABLE: &str = "cms_schemas";

/// Default time-to-live for cached schema entries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default depth of the related-schema closure.
pub const DEFAULT_RELATED_DEPTH: usize = 2;

const ROW_COLUMNS: [&str; 12] = [
    "id",
    "name",
    "kind",
    "version",
    "table_name",
    "display_field",
    "definition",
    "relationships",
    "ui_config",
    "active",
    "created_at",
    "updated_at",
];

/// Stored row shape of the schema metadata table.
///
/// Field definitions live in the `definition` JSON column; decoding them
/// through the typed catalog rejects malformed schemas at load time instead
/// of letting untyped maps leak into the generators.
#[derive(Debug, Clone, Deserialize)]
struct SchemaRow {
    id: String,
    name: String,
    kind: SchemaKind,
    version: u32,
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    display_field: Option<String>,
    definition: Vec<FieldDef>,
    #[serde(default)]
    relationships: Vec<RelationshipDef>,
    #[serde(default)]
    ui_config: Option<UiConfig>,
    active: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<SchemaRow> for SchemaDef {
    fn from(row: SchemaRow) -> Self {
        SchemaDef {
            id: Some(row.id),
            name: row.name,
            kind: row.kind,
            version: row.version,
            table: row.table_name,
            display_field: row.display_field,
            fields: row.definition,
            relationships: row.relationships,
            ui: row.ui_config,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A schema together with the related schemas its relationships reference.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// The requested schema.
    pub schema: SchemaDef,
    /// Related schemas keyed by name, resolved to the closure depth.
    pub related: BTreeMap<String, SchemaDef>,
}

/// Database-backed schema catalog with a cache in front.
///
/// Reads degrade to `None` when the backend is unreachable or the schema
/// table does not exist, so a misconfigured installation renders as "schema
/// not configured" instead of failing every request. Writes always propagate
/// errors and invalidate every cached entry for the affected name before
/// returning.
pub struct SchemaStore {
    backend: Arc<dyn DataBackend>,
    cache: Arc<dyn SchemaCache>,
    table: String,
    cache_ttl: Duration,
}

impl SchemaStore {
    /// Create a store over the given backend and cache.
    pub fn new(backend: Arc<dyn DataBackend>, cache: Arc<dyn SchemaCache>) -> Self {
        Self {
            backend,
            cache,
            table: DEFAULT_SCHEMA_TABLE.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Override the schema metadata table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Override the cache time-to-live.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Fetch a schema by name, latest active version unless an exact
    /// version is given.
    ///
    /// Returns `Ok(None)` when no row matches or when the backend reports
    /// an unknown-table or connection-class error.
    pub async fn get_schema(
        &self,
        name: &str,
        version: Option<u32>,
    ) -> Result<Option<SchemaDef>, Error> {
        let key = cache_key(name, version);
        if let Some(value) = self.cache.get(&key).await {
            if let Ok(schema) = serde_json::from_value::<SchemaDef>(value) {
                debug!(schema = name, "schema served from cache");
                return Ok(Some(schema));
            }
            self.cache.invalidate(&key).await;
        }

        let (operation, variables) = match version {
            Some(version) => (
                versioned_schema_query(&self.table),
                json!({ "name": name, "version": version }),
            ),
            None => (latest_schema_query(&self.table), json!({ "name": name })),
        };

        let data = match self.backend.query(&operation, variables).await {
            Ok(data) => data,
            Err(e) if e.is_degradable() => {
                warn!(schema = name, error = %e, "schema lookup degraded to none");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(row) = self.decode_rows(name, &data)?.into_iter().next() else {
            return Ok(None);
        };
        let schema = SchemaDef::from(row);

        if let Ok(value) = serde_json::to_value(&schema) {
            self.cache.set(&key, value, self.cache_ttl).await;
        }
        Ok(Some(schema))
    }

    /// Fetch a schema plus the schemas its relationships reference, to the
    /// default closure depth.
    pub async fn get_schema_with_related(
        &self,
        name: &str,
        version: Option<u32>,
    ) -> Result<Option<ResolvedSchema>, Error> {
        self.get_schema_with_related_depth(name, version, DEFAULT_RELATED_DEPTH)
            .await
    }

    /// Fetch a schema plus related schemas to an explicit closure depth.
    ///
    /// The walk keeps a flat map keyed by schema name, so a relationship
    /// cycle stops expanding as soon as a name is already resolved; targets
    /// deeper than `max_depth` are not loaded. Unresolvable targets are
    /// skipped rather than failing the whole form.
    pub async fn get_schema_with_related_depth(
        &self,
        name: &str,
        version: Option<u32>,
        max_depth: usize,
    ) -> Result<Option<ResolvedSchema>, Error> {
        let Some(schema) = self.get_schema(name, version).await? else {
            return Ok(None);
        };

        let mut related = BTreeMap::new();
        let mut frontier: Vec<String> = schema
            .relationships
            .iter()
            .map(|r| r.target_schema.clone())
            .collect();

        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for target in frontier {
                if target == schema.name || related.contains_key(&target) {
                    continue;
                }
                let Some(target_schema) = self.get_schema(&target, None).await? else {
                    debug!(schema = %target, "related schema not configured, skipping");
                    continue;
                };
                next.extend(
                    target_schema
                        .relationships
                        .iter()
                        .map(|r| r.target_schema.clone()),
                );
                related.insert(target, target_schema);
            }
            frontier = next;
        }

        Ok(Some(ResolvedSchema { schema, related }))
    }

    /// Validate and upsert a schema, keyed by (name, version).
    ///
    /// Returns the stored row so callers see the assigned id and timestamps.
    pub async fn save_schema(&self, schema: &SchemaDef) -> Result<SchemaDef, Error> {
        schema.validate().map_err(|e| match e {
            metaform_core::Error::InvalidSchema { violations } => Error::Validation { violations },
            other => Error::Core(other),
        })?;

        let operation = upsert_schema_mutation(&self.table);
        let variables = json!({ "object": row_object(schema) });
        let data = self.backend.mutate(&operation, variables).await?;

        let field = format!("insert_{}_one", self.table);
        let row = data
            .get(&field)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                metaform_client::Error::MalformedResponse(format!(
                    "upsert returned no {field} row"
                ))
            })?;
        let row: SchemaRow = serde_json::from_value(row).map_err(|source| Error::SchemaDecode {
            name: schema.name.clone(),
            source,
        })?;

        self.invalidate_name(&schema.name).await;
        debug!(schema = %schema.name, version = schema.version, "schema saved");
        Ok(row.into())
    }

    /// List active schemas ordered by name, optionally filtered by kind.
    ///
    /// Degrades to an empty list when the backend is unreachable or the
    /// schema table does not exist.
    pub async fn list_schemas(&self, kind: Option<SchemaKind>) -> Result<Vec<SchemaDef>, Error> {
        let (operation, variables) = match kind {
            Some(kind) => (
                list_schemas_by_kind_query(&self.table),
                json!({ "kind": kind }),
            ),
            None => (list_schemas_query(&self.table), json!({})),
        };

        let data = match self.backend.query(&operation, variables).await {
            Ok(data) => data,
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "schema list degraded to empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let rows = self.decode_rows("<list>", &data)?;
        Ok(rows.into_iter().map(SchemaDef::from).collect())
    }

    /// Soft-delete a schema by name (all versions unless one is given).
    pub async fn delete_schema(&self, name: &str, version: Option<u32>) -> Result<(), Error> {
        let (operation, variables) = match version {
            Some(version) => (
                deactivate_version_mutation(&self.table),
                json!({ "name": name, "version": version }),
            ),
            None => (deactivate_mutation(&self.table), json!({ "name": name })),
        };
        let data = self.backend.mutate(&operation, variables).await?;

        let affected = data
            .get(format!("update_{}", self.table))
            .and_then(|v| v.get("affected_rows"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if affected == 0 {
            return Err(Error::NotFound(format!("schema '{name}' not found")));
        }

        self.invalidate_name(name).await;
        debug!(schema = name, affected, "schema deactivated");
        Ok(())
    }

    async fn invalidate_name(&self, name: &str) {
        self.cache.invalidate_pattern(&format!("schema:{name}:*")).await;
    }

    fn decode_rows(&self, name: &str, data: &Value) -> Result<Vec<SchemaRow>, Error> {
        let rows = data
            .get(&self.table)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(rows).map_err(|source| Error::SchemaDecode {
            name: name.to_string(),
            source,
        })
    }
}

fn cache_key(name: &str, version: Option<u32>) -> String {
    match version {
        Some(version) => format!("schema:{name}:{version}"),
        None => format!("schema:{name}:latest"),
    }
}

fn row_selection() -> String {
    ROW_COLUMNS
        .iter()
        .map(|column| format!("    {column}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn latest_schema_query(table: &str) -> String {
    [
        "query GetLatestSchema($name: String!) {".to_string(),
        format!(
            "  {table}(where: {{name: {{_eq: $name}}, active: {{_eq: true}}}}, \
             order_by: {{version: desc}}, limit: 1) {{"
        ),
        row_selection(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn versioned_schema_query(table: &str) -> String {
    [
        "query GetSchemaVersion($name: String!, $version: Int!) {".to_string(),
        format!(
            "  {table}(where: {{name: {{_eq: $name}}, version: {{_eq: $version}}, \
             active: {{_eq: true}}}}, limit: 1) {{"
        ),
        row_selection(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn list_schemas_query(table: &str) -> String {
    [
        "query ListSchemas {".to_string(),
        format!("  {table}(where: {{active: {{_eq: true}}}}, order_by: {{name: asc}}) {{"),
        row_selection(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn list_schemas_by_kind_query(table: &str) -> String {
    [
        "query ListSchemasByKind($kind: String!) {".to_string(),
        format!(
            "  {table}(where: {{active: {{_eq: true}}, kind: {{_eq: $kind}}}}, \
             order_by: {{name: asc}}) {{"
        ),
        row_selection(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn upsert_schema_mutation(table: &str) -> String {
    [
        format!("mutation UpsertSchema($object: {table}_insert_input!) {{"),
        format!(
            "  insert_{table}_one(object: $object, on_conflict: {{constraint: \
             {table}_name_version_key, update_columns: [kind, table_name, display_field, \
             definition, relationships, ui_config, active]}}) {{"
        ),
        row_selection(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn deactivate_mutation(table: &str) -> String {
    [
        "mutation DeactivateSchema($name: String!) {".to_string(),
        format!("  update_{table}(where: {{name: {{_eq: $name}}}}, _set: {{active: false}}) {{"),
        "    affected_rows".to_string(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn deactivate_version_mutation(table: &str) -> String {
    [
        "mutation DeactivateSchemaVersion($name: String!, $version: Int!) {".to_string(),
        format!(
            "  update_{table}(where: {{name: {{_eq: $name}}, version: {{_eq: $version}}}}, \
             _set: {{active: false}}) {{"
        ),
        "    affected_rows".to_string(),
        "  }".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

fn row_object(schema: &SchemaDef) -> Value {
    json!({
        "name": schema.name,
        "kind": schema.kind,
        "version": schema.version,
        "table_name": schema.table,
        "display_field": schema.display_field,
        "definition": schema.fields,
        "relationships": schema.relationships,
        "ui_config": schema.ui,
        "active": schema.active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaform_core::{FieldKind, RelationshipDef};

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("Product", None), "schema:Product:latest");
        assert_eq!(cache_key("Product", Some(3)), "schema:Product:3");
    }

    #[test]
    fn test_latest_schema_query_shape() {
        let query = latest_schema_query("cms_schemas");

        assert!(query.starts_with("query GetLatestSchema($name: String!) {"));
        assert!(query.contains(
            "cms_schemas(where: {name: {_eq: $name}, active: {_eq: true}}, \
             order_by: {version: desc}, limit: 1) {"
        ));
        assert!(query.contains("definition"));
        assert!(query.contains("relationships"));
    }

    #[test]
    fn test_upsert_mutation_targets_name_version_constraint() {
        let mutation = upsert_schema_mutation("cms_schemas");

        assert!(mutation.contains("insert_cms_schemas_one(object: $object"));
        assert!(mutation.contains("constraint: cms_schemas_name_version_key"));
        assert!(mutation.contains("update_columns: [kind, table_name, display_field, \
             definition, relationships, ui_config, active]"));
    }

    #[test]
    fn test_row_object_uses_storage_column_names() {
        let schema = SchemaDef::page("Product")
            .with_field(FieldDef::primary_key("id"))
            .with_field(FieldDef::new("name", FieldKind::Text))
            .with_relationship(RelationshipDef::many_to_one(
                "product_category",
                "category_id",
                "Category",
            ));
        let object = row_object(&schema);

        assert_eq!(object["name"], "Product");
        assert_eq!(object["kind"], "page");
        assert_eq!(object["version"], 1);
        assert_eq!(object["active"], true);
        assert!(object["definition"].is_array());
        assert_eq!(object["definition"].as_array().unwrap().len(), 2);
        assert_eq!(object["relationships"][0]["type"], "many-to-one");
    }

    #[test]
    fn test_schema_row_round_trip() {
        let row: SchemaRow = serde_json::from_value(serde_json::json!({
            "id": "row-1",
            "name": "Product",
            "kind": "page",
            "version": 2,
            "table_name": "products",
            "definition": [
                { "name": "id", "type": "uuid", "primary_key": true },
                { "name": "name", "type": "text", "required": true },
            ],
            "relationships": [],
            "active": true,
        }))
        .unwrap();
        let schema = SchemaDef::from(row);

        assert_eq!(schema.id.as_deref(), Some("row-1"));
        assert_eq!(schema.version, 2);
        assert_eq!(schema.table_name(), "products");
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.fields[0].primary_key);
    }

    #[test]
    fn test_schema_row_rejects_unknown_field_kind() {
        let result: Result<SchemaRow, _> = serde_json::from_value(serde_json::json!({
            "id": "row-1",
            "name": "Broken",
            "kind": "page",
            "version": 1,
            "definition": [{ "name": "id", "type": "hologram" }],
            "active": true,
        }));

        assert!(result.is_err());
    }
}
