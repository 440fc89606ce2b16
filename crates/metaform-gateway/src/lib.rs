//! Metaform HTTP Gateway.
//!
//! Thin axum surface over the engine services: schema catalog CRUD, record
//! CRUD with optional cascading deletes, and form descriptor generation
//! with orchestrated form submission.

pub mod config;
pub mod error;
pub mod json;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::ApiError;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use metaform_client::{DataBackend, IdProvider, MemoryCache};
use metaform_core::SchemaDef;
use metaform_engine::{
    CascadeDeleter, DataLoader, FormEngine, RecordService, ResolvedSchema, SchemaStore,
};

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Data backend, probed directly by the health endpoint.
    pub backend: Arc<dyn DataBackend>,
    /// Schema cache, held concretely for its counters.
    pub cache: Arc<MemoryCache>,
    /// Schema catalog store.
    pub store: Arc<SchemaStore>,
    /// Form descriptor generation.
    pub forms: Arc<FormEngine>,
    /// Record CRUD.
    pub records: Arc<RecordService>,
    /// Cascading deletes.
    pub cascade: Arc<CascadeDeleter>,
    /// Initial-data loading for edit submissions without a snapshot.
    pub loader: Arc<DataLoader>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Wire the engine services over the given collaborators.
    pub fn new(
        backend: Arc<dyn DataBackend>,
        ids: Arc<dyn IdProvider>,
        config: GatewayConfig,
    ) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(
            SchemaStore::new(Arc::clone(&backend), cache.clone())
                .with_table(config.schema_table.clone())
                .with_cache_ttl(config.schema_cache_ttl),
        );
        let forms = Arc::new(FormEngine::new(
            Arc::clone(&store),
            DataLoader::new(Arc::clone(&backend)),
        ));
        let records = Arc::new(RecordService::new(Arc::clone(&backend), ids));
        let cascade = Arc::new(CascadeDeleter::new(Arc::clone(&backend)));
        let loader = Arc::new(DataLoader::new(Arc::clone(&backend)));

        Self {
            backend,
            cache,
            store,
            forms,
            records,
            cascade,
            loader,
            config,
        }
    }

    /// Resolve a schema by name, or fail with a not-found error.
    pub async fn require_schema(&self, name: &str) -> Result<SchemaDef, ApiError> {
        self.store
            .get_schema(name, None)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("schema '{name}' is not configured")))
    }

    /// Resolve a schema and its relationship closure, or fail with a
    /// not-found error.
    pub async fn require_schema_with_related(
        &self,
        name: &str,
    ) -> Result<ResolvedSchema, ApiError> {
        self.store
            .get_schema_with_related(name, None)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("schema '{name}' is not configured")))
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::schemas::routes())
        .merge(routes::data::routes())
        .merge(routes::forms::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
