//! Metaform Client - Clients for the collaborators Metaform depends on.
//!
//! Three contracts live here, each with a production implementation: the
//! GraphQL data backend ([`DataBackend`]/[`HttpBackend`]), the schema cache
//! ([`SchemaCache`]/[`MemoryCache`]), and the id-generation service
//! ([`IdProvider`]/[`RemoteIdProvider`] with [`LocalIdProvider`] fallback).
//!
//! # Quick Start
//!
//! ```ignore
//! use metaform_client::{BackendConfig, DataBackend, HttpBackend};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::new(BackendConfig::localhost())?;
//!
//!     let data = backend
//!         .query(
//!             "query GetProduct($id: uuid!) { product_by_pk(id: $id) { id name } }",
//!             json!({ "id": "prod-1" }),
//!         )
//!         .await?;
//!
//!     println!("{data}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod idgen;

pub use backend::{operation_name, DataBackend, HttpBackend};
pub use cache::{glob_match, CacheStats, MemoryCache, SchemaCache};
pub use config::BackendConfig;
pub use error::Error;
pub use idgen::{random_id, IdProvider, LocalIdProvider, RemoteIdProvider, ID_LENGTH};
