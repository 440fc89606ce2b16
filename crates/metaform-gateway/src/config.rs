//! Gateway configuration.

use std::time::Duration;

use clap::Parser;

/// Metaform HTTP gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "metaform-gateway")]
#[command(about = "HTTP gateway for Metaform schemas, records, and forms")]
pub struct Args {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "METAFORM_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP listener to.
    #[arg(long, env = "METAFORM_PORT", default_value_t = 8080)]
    pub port: u16,

    /// GraphQL endpoint of the data backend.
    #[arg(
        long,
        env = "METAFORM_BACKEND_URL",
        default_value = "http://127.0.0.1:8081/v1/graphql"
    )]
    pub backend_url: String,

    /// Admin secret sent with every backend request.
    #[arg(long, env = "METAFORM_BACKEND_SECRET")]
    pub backend_secret: Option<String>,

    /// ID service endpoint. Ids are generated locally when unset.
    #[arg(long, env = "METAFORM_ID_SERVICE_URL")]
    pub id_service_url: Option<String>,

    /// Timeout (seconds) for backend and ID service requests.
    #[arg(long, env = "METAFORM_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Time-to-live (seconds) for cached schema definitions.
    #[arg(long, env = "METAFORM_SCHEMA_CACHE_TTL_SECS", default_value_t = 300)]
    pub schema_cache_ttl_secs: u64,

    /// Table the schema definitions are persisted in.
    #[arg(long, env = "METAFORM_SCHEMA_TABLE", default_value = "cms_schemas")]
    pub schema_table: String,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to bind the HTTP listener to.
    pub host: String,
    /// Port to bind the HTTP listener to.
    pub port: u16,
    /// GraphQL endpoint of the data backend.
    pub backend_url: String,
    /// Admin secret sent with every backend request.
    pub backend_secret: Option<String>,
    /// ID service endpoint; ids are generated locally when unset.
    pub id_service_url: Option<String>,
    /// Timeout for backend and ID service requests.
    pub request_timeout: Duration,
    /// Time-to-live for cached schema definitions.
    pub schema_cache_ttl: Duration,
    /// Table the schema definitions are persisted in.
    pub schema_table: String,
}

impl GatewayConfig {
    /// Socket address string the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            backend_url: args.backend_url.clone(),
            backend_secret: args.backend_secret.clone(),
            id_service_url: args.id_service_url.clone(),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            schema_cache_ttl: Duration::from_secs(args.schema_cache_ttl_secs),
            schema_table: args.schema_table.clone(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backend_url: "http://127.0.0.1:8081/v1/graphql".to_string(),
            backend_secret: None,
            id_service_url: None,
            request_timeout: Duration::from_secs(10),
            schema_cache_ttl: Duration::from_secs(300),
            schema_table: "cms_schemas".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_convert_to_config() {
        let args = Args {
            host: "0.0.0.0".to_string(),
            port: 9090,
            backend_url: "http://backend:8081/v1/graphql".to_string(),
            backend_secret: Some("s3cret".to_string()),
            id_service_url: None,
            request_timeout_secs: 5,
            schema_cache_ttl_secs: 60,
            schema_table: "admin_schemas".to_string(),
        };

        let config = GatewayConfig::from(&args);

        assert_eq!(config.listen_addr(), "0.0.0.0:9090");
        assert_eq!(config.backend_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.schema_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.schema_table, "admin_schemas");
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();

        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert!(config.backend_secret.is_none());
        assert!(config.id_service_url.is_none());
        assert_eq!(config.schema_table, "cms_schemas");
    }
}
