//! Engine error types.

use thiserror::Error;

use crate::writes::SaveReport;

/// Engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested schema or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Record data failed schema validation.
    #[error("validation failed: {}", violations.join("; "))]
    Validation {
        /// Per-field validation messages.
        violations: Vec<String>,
    },

    /// A stored schema row could not be decoded.
    #[error("failed to decode stored schema '{name}': {source}")]
    SchemaDecode {
        /// Name of the schema row that failed to decode.
        name: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// Backend client error.
    #[error("backend error: {0}")]
    Client(#[from] metaform_client::Error),

    /// Core schema or planning error.
    #[error("core error: {0}")]
    Core(#[from] metaform_core::Error),

    /// A multi-step save aborted partway through.
    ///
    /// Steps completed before the failure are recorded in `report` and
    /// are not rolled back.
    #[error("save aborted at step '{failed_step}': {source}")]
    PartialWrite {
        /// Writes that completed before the failure.
        report: SaveReport,
        /// Human-readable name of the step that failed.
        failed_step: String,
        /// The backend error that aborted the save.
        source: metaform_client::Error,
    },
}

impl Error {
    /// True when the error indicates the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when the error was caused by a foreign-key constraint on the backend.
    pub fn is_referential_integrity(&self) -> bool {
        match self {
            Error::Client(e) => matches!(e, metaform_client::Error::ReferentialIntegrity(_)),
            Error::PartialWrite { source, .. } => {
                matches!(source, metaform_client::Error::ReferentialIntegrity(_))
            }
            _ => false,
        }
    }
}
