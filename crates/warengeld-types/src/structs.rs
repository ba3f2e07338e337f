//! Plain data records shared between the fiscal cycle, the ledger, and the
//! orchestrator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{AgentKind, FlowKind, LevyKind};
use crate::ids::{AgentId, LedgerEntryId};

/// Receipt for one amount levied from one agent.
///
/// Fiscal operations return these so the orchestrator can book the
/// movement in the money ledger without the fiscal crate knowing about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Levy {
    /// The agent assessed.
    pub payer: AgentId,
    /// The payer's role.
    pub payer_kind: AgentKind,
    /// The collecting agent.
    pub collector: AgentId,
    /// The collector's role.
    pub collector_kind: AgentKind,
    /// The fiscal channel.
    pub kind: LevyKind,
    /// Amount assessed.
    pub amount: Decimal,
    /// `true` when the amount was deducted from the payer's balance,
    /// `false` when it was booked on paper only.
    pub billed: bool,
}

/// Outcome of routing waste to the recycler during environmental tax
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteDelivery {
    /// The agent whose impact produced the waste.
    pub source: AgentId,
    /// Waste units accepted by the recycler.
    pub amount: Decimal,
}

/// One side of a money movement: who, and in what role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// The agent.
    pub id: AgentId,
    /// The agent's role.
    pub kind: AgentKind,
}

impl Party {
    /// Build a party from an id and role.
    pub const fn new(id: AgentId, kind: AgentKind) -> Self {
        Self { id, kind }
    }
}

/// A single money movement in the ledger.
///
/// Inflows have no `from` party (money arrives from outside the modeled
/// economy); outflows have no `to` party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// The tick when the movement occurred.
    pub tick: u64,
    /// The category of movement.
    pub flow: FlowKind,
    /// Paying party, if any.
    pub from: Option<Party>,
    /// Receiving party, if any.
    pub to: Option<Party>,
    /// Amount moved (always positive).
    pub amount: Decimal,
    /// Human-readable reason (e.g. `"LAND_TAX"`, `"WAGE"`).
    pub reason: String,
    /// Real-world timestamp.
    pub created_at: DateTime<Utc>,
}
