//! GraphQL data backend client.

use crate::config::BackendConfig;
use crate::error::{classify_backend_error, Error};
use async_trait::async_trait;
use serde_json::{json, Value};

/// A GraphQL-style request/response backend.
///
/// The backend is assumed capable of by-primary-key fetch/update/delete,
/// filtered and paginated lists with `_ilike` and `_in` predicates,
/// aggregate counts, and bulk inserts returning per-row ids. Operation text
/// always comes from the generators; runtime values travel as variables.
#[async_trait]
pub trait DataBackend: Send + Sync {
    /// Execute a read operation, returning the response `data` value.
    async fn query(&self, operation: &str, variables: Value) -> Result<Value, Error>;

    /// Execute a write operation, returning the response `data` value.
    async fn mutate(&self, operation: &str, variables: Value) -> Result<Value, Error>;
}

/// HTTP implementation of [`DataBackend`] against a Hasura-style endpoint.
pub struct HttpBackend {
    http: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Build a backend client from the given configuration.
    pub fn new(config: BackendConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Unavailable(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Build a backend client for localhost's default endpoint.
    pub fn localhost() -> Result<Self, Error> {
        Self::new(BackendConfig::localhost())
    }

    async fn execute(&self, operation: &str, variables: Value) -> Result<Value, Error> {
        let name = operation_name(operation).unwrap_or("anonymous");
        tracing::debug!(operation = name, "executing backend operation");

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .json(&json!({ "query": operation, "variables": variables }));
        if let Some(secret) = &self.config.admin_secret {
            request = request.header("x-hasura-admin-secret", secret);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Unavailable(format!("request timed out after {:?}", self.config.timeout))
            } else {
                Error::Unavailable(e.to_string())
            }
        })?;
        let status = response.status();
        if status.is_server_error() {
            return Err(Error::Unavailable(format!("backend returned {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;
        if let Some(first) = body
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
        {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown backend error");
            let code = first.pointer("/extensions/code").and_then(Value::as_str);
            tracing::warn!(operation = name, code, error = message, "backend rejected operation");
            return Err(classify_backend_error(message, code));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| Error::MalformedResponse("response carries no data".to_string()))
    }
}

#[async_trait]
impl DataBackend for HttpBackend {
    async fn query(&self, operation: &str, variables: Value) -> Result<Value, Error> {
        self.execute(operation, variables).await
    }

    async fn mutate(&self, operation: &str, variables: Value) -> Result<Value, Error> {
        self.execute(operation, variables).await
    }
}

/// Operation name from generated GraphQL text, for log context.
pub fn operation_name(operation: &str) -> Option<&str> {
    let rest = operation
        .trim_start()
        .strip_prefix("query")
        .or_else(|| operation.trim_start().strip_prefix("mutation"))?;
    let name = rest
        .trim_start()
        .split(|c: char| c == '(' || c == '{' || c.is_whitespace())
        .next()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_name() {
        assert_eq!(
            operation_name("query GetProduct($id: uuid!) { product_by_pk }"),
            Some("GetProduct")
        );
        assert_eq!(
            operation_name("mutation DeleteInvoice($id: uuid!) { delete_invoice_by_pk }"),
            Some("DeleteInvoice")
        );
        assert_eq!(operation_name("query { product }"), None);
        assert_eq!(operation_name("subscription Watch { product }"), None);
    }

    #[test]
    fn test_backend_construction() {
        let backend = HttpBackend::localhost();
        assert!(backend.is_ok());
    }
}
