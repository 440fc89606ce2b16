//! Core error types.

use thiserror::Error;

/// Errors from catalog validation and plan construction.
#[derive(Debug, Error)]
pub enum Error {
    /// A schema violates one or more structural invariants.
    #[error("schema validation failed: {}", violations.join("; "))]
    InvalidSchema {
        /// Every violated invariant, collected in declaration order.
        violations: Vec<String>,
    },

    /// Discovered delete dependencies form a cycle.
    #[error("cyclic delete dependency among schemas: {}", cycle.join(", "))]
    CyclicDependency {
        /// Schemas participating in the unresolvable cycle.
        cycle: Vec<String>,
    },
}
