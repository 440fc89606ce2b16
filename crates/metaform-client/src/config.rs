//! Backend connection configuration.

use std::time::Duration;

/// Default GraphQL endpoint of the data backend.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8081/v1/graphql";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the GraphQL data backend connection.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,

    /// Admin secret sent with every request, when the backend requires one.
    pub admin_secret: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    /// Create a new configuration for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            admin_secret: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a configuration for a backend on localhost's default port.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Set the admin secret.
    pub fn with_admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.admin_secret = Some(secret.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::localhost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.admin_secret.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = BackendConfig::new("http://10.0.0.5:8080/v1/graphql")
            .with_admin_secret("s3cret")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.endpoint, "http://10.0.0.5:8080/v1/graphql");
        assert_eq!(config.admin_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
