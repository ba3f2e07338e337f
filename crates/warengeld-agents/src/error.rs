//! Error types for the warengeld-agents crate.
//!
//! Degenerate inputs (empty pools, zero capacity, non-positive amounts)
//! resolve to zero-effect outcomes and are never errors. The variants here
//! cover configuration mistakes and lookups of agents that do not exist.

use warengeld_types::AgentId;

/// Errors that can occur during agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// An operation that needs a collaborator was invoked without one.
    #[error("{operation} requires a {collaborator}, but none is configured")]
    MissingCollaborator {
        /// The operation that was attempted.
        operation: &'static str,
        /// The collaborator it needs.
        collaborator: &'static str,
    },

    /// Worker with the given ID is not in the workforce.
    #[error("worker not found: {0}")]
    WorkerNotFound(AgentId),

    /// Household with the given ID is not in the population.
    #[error("household not found: {0}")]
    HouseholdNotFound(AgentId),

    /// A parameter is outside its valid range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
