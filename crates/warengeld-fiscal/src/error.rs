//! Error types for the warengeld-fiscal crate.

use rust_decimal::Decimal;

/// Errors raised by fiscal configuration and collaborator wiring.
#[derive(Debug, thiserror::Error)]
pub enum FiscalError {
    /// The agency's state share is outside `[0, 1]`.
    #[error("environmental tax state share must be within [0, 1], got {0}")]
    InvalidShare(Decimal),

    /// Recycling efficiency is outside `[0, 1]`.
    #[error("recycling efficiency must be within [0, 1], got {0}")]
    InvalidEfficiency(Decimal),

    /// Budget splits are negative or do not sum to one.
    #[error("tax allocation must be non-negative and sum to 1, got {sum}")]
    InvalidAllocation {
        /// Sum of the three splits.
        sum: Decimal,
    },

    /// An operation that needs a collaborator was invoked without one.
    #[error("{operation} requires a {collaborator}, but none was supplied")]
    MissingCollaborator {
        /// The operation that was attempted.
        operation: &'static str,
        /// The collaborator it needs.
        collaborator: &'static str,
    },
}
