//! Money-flow ledger and conservation audit for the Warengeld simulation.
//!
//! Money in the modeled economy is neither created nor destroyed except
//! through a small set of named channels. Every movement the tick cycle
//! performs is booked here, and the ledger checks after each tick that the
//! observed change in money supply is fully explained by those channels.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: append-only log with recording methods.
//! - [`transaction`] -- The [`TransactionBuilder`] for validated entry construction.
//! - [`conservation`] -- Internal-balance and money-supply verification.
//!
//! # Flow directions
//!
//! | Flow | From | To |
//! |------|------|----|
//! | `Wage` | Company | Household |
//! | `Sale` | outside | Company |
//! | `Consumption` | Household | outside |
//! | `Tax`, `Confiscation`, `Penalty` | Agent | State / Agency |
//! | `PaperTax` | outside | State / Agency |
//! | `Transfer` | Agency | State |
//! | `Deposit`, `LoanRepayment` | Household | Bank |
//! | `Withdrawal`, `Credit` | Bank | Household |
//! | `Estate` | Household | Household / State |
//! | `WriteOff` | Bank | outside |
//! | `Investment` | Company | outside |
//! | `Endowment` | Household / Company | its child / spinoff |
//!
//! # Money-supply law
//!
//! For every tick T:
//!
//! ```text
//! supply_after(T) - supply_before(T) == inflows(T) - outflows(T)
//! ```
//!
//! A violation produces a [`LedgerAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! # Usage
//!
//! ```
//! use warengeld_ledger::{Ledger, ConservationResult};
//! use warengeld_types::{AgentId, AgentKind, Party};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = Ledger::new();
//! let company = Party::new(AgentId::new(), AgentKind::Company);
//! let household = Party::new(AgentId::new(), AgentKind::Household);
//!
//! ledger.record_sale(1, Decimal::new(50, 0), company).ok();
//! ledger.record_wage(1, Decimal::new(10, 0), company, household).ok();
//!
//! let before = Decimal::new(100, 0);
//! let after = Decimal::new(150, 0);
//! assert_eq!(ledger.verify_money_supply(1, before, after), ConservationResult::Balanced);
//! ```

pub mod conservation;
pub mod ledger;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::{Ledger, TransferParams};
pub use transaction::TransactionBuilder;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use warengeld_types::FlowKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording ledger entries.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("ledger entry amount must be non-zero")]
    ZeroAmount,

    /// Amount must not be negative.
    #[error("ledger entry amount must be positive, got {amount}")]
    NegativeAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A party is present where the flow forbids one, or missing where
    /// the flow requires one.
    #[error("invalid {side} party for {flow:?}: {reason}")]
    InvalidParty {
        /// The flow being validated.
        flow: FlowKind,
        /// Which side of the entry ("from" or "to").
        side: &'static str,
        /// What was wrong.
        reason: &'static str,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation violation detected during tick verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// The change the ledger explains.
    pub expected: Decimal,
    /// The change actually observed.
    pub actual: Decimal,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
