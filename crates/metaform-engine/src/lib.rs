//! Metaform Engine - async services combining the schema catalog with the
//! backend clients.
//!
//! Each service takes its collaborators (backend, cache, id provider) at
//! construction, so process wiring owns exactly one instance of each and
//! tests can substitute doubles.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use metaform_client::{HttpBackend, LocalIdProvider, MemoryCache};
//! use metaform_engine::{DataLoader, FormEngine, RecordService, SchemaStore};
//!
//! let backend = Arc::new(HttpBackend::localhost()?);
//! let cache = Arc::new(MemoryCache::new());
//! let store = Arc::new(SchemaStore::new(backend.clone(), cache));
//! let forms = FormEngine::new(store.clone(), DataLoader::new(backend.clone()));
//! let records = RecordService::new(backend, Arc::new(LocalIdProvider));
//!
//! let descriptor = forms.generate_form_config("Invoice", Some("INV1"), None).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cascade;
pub mod error;
pub mod forms;
pub mod loader;
pub mod records;
pub mod store;
pub mod writes;

pub use cascade::{CascadeDeleter, CascadeResult, DELETE_BATCH_SIZE};
pub use error::Error;
pub use forms::FormEngine;
pub use loader::DataLoader;
pub use records::{ListPage, ListParams, RecordService, DEFAULT_PAGE_SIZE};
pub use store::{
    ResolvedSchema, SchemaStore, DEFAULT_CACHE_TTL, DEFAULT_RELATED_DEPTH, DEFAULT_SCHEMA_TABLE,
};
pub use writes::{MutationOrchestrator, RelationshipWrites, SaveReport};
