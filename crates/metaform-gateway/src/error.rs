//! Error handling for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use metaform_engine::SaveReport;

/// Application error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested schema or record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// The submitted data failed schema validation.
    #[error("validation failed: {}", violations.join("; "))]
    Validation {
        /// Per-field validation messages.
        violations: Vec<String>,
    },

    /// The request conflicts with existing backend state.
    #[error("{0}")]
    Conflict(String),

    /// A multi-step save aborted partway through.
    #[error("save aborted at step '{failed_step}': {message}")]
    PartialWrite {
        /// Writes that completed before the failure.
        report: SaveReport,
        /// The step that failed.
        failed_step: String,
        /// The backend failure that aborted the save.
        message: String,
    },

    /// The data backend failed or answered with an unusable response.
    #[error("{0}")]
    Backend(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Structured detail, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PartialWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_FAILED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PartialWrite { .. } => "PARTIAL_WRITE",
            ApiError::Backend(_) => "BACKEND_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();
        let detail = match &self {
            ApiError::PartialWrite { report, .. } => serde_json::to_value(report).ok(),
            _ => None,
        };

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message,
            detail,
        };

        (status, Json(body)).into_response()
    }
}

impl From<metaform_engine::Error> for ApiError {
    fn from(err: metaform_engine::Error) -> Self {
        use metaform_engine::Error as EngineError;

        match err {
            EngineError::NotFound(msg) => ApiError::NotFound(msg),
            EngineError::Validation { violations } => ApiError::Validation { violations },
            EngineError::Client(e) => e.into(),
            EngineError::Core(e) => e.into(),
            EngineError::PartialWrite {
                report,
                failed_step,
                source,
            } => ApiError::PartialWrite {
                report,
                failed_step,
                message: source.to_string(),
            },
            err @ EngineError::SchemaDecode { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<metaform_client::Error> for ApiError {
    fn from(err: metaform_client::Error) -> Self {
        match err {
            metaform_client::Error::ReferentialIntegrity(_) => ApiError::Conflict(err.to_string()),
            _ => ApiError::Backend(err.to_string()),
        }
    }
}

impl From<metaform_core::Error> for ApiError {
    fn from(err: metaform_core::Error) -> Self {
        match err {
            metaform_core::Error::InvalidSchema { violations } => {
                ApiError::Validation { violations }
            }
            err @ metaform_core::Error::CyclicDependency { .. } => {
                ApiError::Conflict(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("JSON error: {}", err))
    }
}
