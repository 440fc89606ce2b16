//! Metaform HTTP gateway binary.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metaform_client::{BackendConfig, HttpBackend, IdProvider, LocalIdProvider, RemoteIdProvider};
use metaform_gateway::{create_router, AppState, Args, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr(),
        backend = %config.backend_url,
        "Starting Metaform gateway"
    );

    // Connect the backend clients
    let mut backend_config =
        BackendConfig::new(config.backend_url.clone()).with_timeout(config.request_timeout);
    if let Some(secret) = &config.backend_secret {
        backend_config = backend_config.with_admin_secret(secret.clone());
    }
    let backend = Arc::new(HttpBackend::new(backend_config)?);

    let ids: Arc<dyn IdProvider> = match &config.id_service_url {
        Some(url) => Arc::new(RemoteIdProvider::new(url.clone(), config.request_timeout)?),
        None => Arc::new(LocalIdProvider),
    };
    info!(
        id_service = config.id_service_url.as_deref().unwrap_or("local"),
        schema_table = %config.schema_table,
        cache_ttl_secs = config.schema_cache_ttl.as_secs(),
        "Backend clients ready"
    );

    // Create application state
    let state = AppState::new(backend, ids, config.clone());

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!("Gateway listening on {}", config.listen_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
