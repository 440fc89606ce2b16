//! Id generation: remote service with local fallback.

use crate::error::Error;
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;

/// Length of locally generated ids.
pub const ID_LENGTH: usize = 16;

/// Generate a random alphanumeric id.
pub fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Source of unique record ids.
///
/// Infallible by contract: record creation must never block on id-service
/// availability, so implementations degrade to local generation instead of
/// returning errors.
#[async_trait]
pub trait IdProvider: Send + Sync {
    /// Produce the next unique id.
    async fn next_id(&self) -> String;
}

/// Local random id generation.
pub struct LocalIdProvider;

#[async_trait]
impl IdProvider for LocalIdProvider {
    async fn next_id(&self) -> String {
        random_id()
    }
}

/// Id provider backed by an HTTP id-generation service, falling back to
/// local generation on any failure.
pub struct RemoteIdProvider {
    http: reqwest::Client,
    url: String,
}

impl RemoteIdProvider {
    /// Build a provider fetching ids from the given URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn fetch_id(&self) -> Option<String> {
        let response = self.http.get(&self.url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;
        parse_id_body(&body)
    }
}

#[async_trait]
impl IdProvider for RemoteIdProvider {
    async fn next_id(&self) -> String {
        match self.fetch_id().await {
            Some(id) => id,
            None => {
                // Degraded, not failed: callers never see this.
                tracing::debug!(url = %self.url, "id service unavailable, using local fallback");
                random_id()
            }
        }
    }
}

/// Extract an id from a service response body: either a JSON object with an
/// `id` key, a JSON string, or bare text.
fn parse_id_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Object(obj) => obj
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string),
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = random_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(random_id(), random_id());
    }

    #[tokio::test]
    async fn test_local_provider() {
        let provider = LocalIdProvider;
        let id = provider.next_id().await;
        assert_eq!(id.len(), ID_LENGTH);
    }

    #[test]
    fn test_parse_id_body() {
        assert_eq!(parse_id_body("abc123"), Some("abc123".to_string()));
        assert_eq!(parse_id_body("  abc123\n"), Some("abc123".to_string()));
        assert_eq!(
            parse_id_body(r#"{"id": "svc-42"}"#),
            Some("svc-42".to_string())
        );
        assert_eq!(parse_id_body(r#""quoted-id""#), Some("quoted-id".to_string()));
        assert_eq!(parse_id_body(""), None);
        assert_eq!(parse_id_body(r#"{"error": "oops"}"#), None);
    }

    #[tokio::test]
    async fn test_remote_provider_falls_back() {
        // Nothing listens here; the provider must still produce an id.
        let provider =
            RemoteIdProvider::new("http://127.0.0.1:9/generate", Duration::from_millis(50))
                .unwrap();
        let id = provider.next_id().await;
        assert_eq!(id.len(), ID_LENGTH);
    }
}
