//! JSON response types for the HTTP gateway.

use serde::Serialize;

use metaform_client::CacheStats;

/// Generic success response wrapper.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    /// Success flag.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    /// Create a new success response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Service name.
    pub name: String,
    /// Gateway version.
    pub version: String,
    /// Whether the data backend answered a probe query.
    pub backend_connected: bool,
    /// Schema cache counters.
    pub cache: CacheStats,
}

/// Acknowledgement for a delete that needs no result payload.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Success flag.
    pub success: bool,
}
