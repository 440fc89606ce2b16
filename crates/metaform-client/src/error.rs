//! Client error types and backend error classification.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend unreachable, timed out, or returned a server error.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A table or relation referenced by the operation does not exist.
    #[error("unknown table or relation: {0}")]
    UnknownTable(String),

    /// A delete was blocked by an existing foreign-key reference.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// The backend rejected the operation for any other reason.
    #[error("backend error: {message}")]
    Backend {
        /// The backend's error message.
        message: String,
        /// Structured error code, when the backend supplied one.
        code: Option<String>,
    },

    /// Response body was not the shape the operation expects.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// Check if the error means the backing table is missing or the backend
    /// is unreachable. Schema reads degrade to "not configured" on these.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Error::UnknownTable(_) | Error::Unavailable(_))
    }
}

/// Classify a backend GraphQL error into the client taxonomy.
///
/// Structured codes are consulted first (Hasura-style `extensions.code`
/// values); message substring sniffing is the fallback for backends that
/// supply no code. Substring matching is fragile, so it only ever widens
/// classification toward the more actionable variants.
pub(crate) fn classify_backend_error(message: &str, code: Option<&str>) -> Error {
    let lowered = message.to_lowercase();
    match code {
        Some("constraint-violation") => {
            if lowered.contains("foreign key") {
                return Error::ReferentialIntegrity(message.to_string());
            }
        }
        Some("validation-failed") | Some("not-exists") => {
            return Error::UnknownTable(message.to_string());
        }
        _ => {
            if lowered.contains("foreign key") {
                return Error::ReferentialIntegrity(message.to_string());
            }
            if lowered.contains("table") || lowered.contains("relation") {
                return Error::UnknownTable(message.to_string());
            }
        }
    }
    Error::Backend {
        message: message.to_string(),
        code: code.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_code() {
        let err = classify_backend_error(
            "Foreign key violation. update or delete on table \"invoice\"",
            Some("constraint-violation"),
        );
        assert!(matches!(err, Error::ReferentialIntegrity(_)));

        let err = classify_backend_error(
            "field 'missing_table' not found in type: 'query_root'",
            Some("validation-failed"),
        );
        assert!(matches!(err, Error::UnknownTable(_)));
    }

    #[test]
    fn test_classify_by_message_fallback() {
        let err = classify_backend_error("relation \"products\" does not exist", None);
        assert!(matches!(err, Error::UnknownTable(_)));

        let err = classify_backend_error("foreign key constraint fails", None);
        assert!(matches!(err, Error::ReferentialIntegrity(_)));
    }

    #[test]
    fn test_classify_generic() {
        let err = classify_backend_error("something odd happened", Some("unexpected"));
        match err {
            Error::Backend { message, code } => {
                assert_eq!(message, "something odd happened");
                assert_eq!(code.as_deref(), Some("unexpected"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_degradable() {
        assert!(Error::UnknownTable("x".to_string()).is_degradable());
        assert!(Error::Unavailable("timeout".to_string()).is_degradable());
        assert!(!Error::ReferentialIntegrity("x".to_string()).is_degradable());
    }
}
