//! The money ledger: an append-only log of every money movement.
//!
//! The [`Ledger`] holds all [`MoneyEntry`] values for the current run and
//! provides recording helpers per flow, balance queries, and the
//! conservation checks.
//!
//! # Design
//!
//! - **Append-only**: entries are never modified or deleted.
//! - **Double-entry**: internal movements name a payer and a receiver.
//! - **Explained supply**: money only enters via `Sale`/`PaperTax` and only
//!   leaves via `Consumption`/`WriteOff`.
//! - **Precision**: all amounts use [`Decimal`].

use rust_decimal::Decimal;
use tracing::{debug, warn};

use warengeld_types::{AgentId, FlowKind, Levy, LevyKind, MoneyEntry, Party};

use crate::conservation::{ConservationResult, verify_conservation, verify_money_supply};
use crate::{LedgerError, TransactionBuilder};

// ---------------------------------------------------------------------------
// Transfer parameters
// ---------------------------------------------------------------------------

/// Parameters for recording a general ledger entry.
///
/// Packs the arguments of a movement into a single struct to keep
/// call sites readable.
pub struct TransferParams {
    /// The tick number.
    pub tick: u64,
    /// The category of movement.
    pub flow: FlowKind,
    /// Paying party, if the flow has one.
    pub from: Option<Party>,
    /// Receiving party, if the flow has one.
    pub to: Option<Party>,
    /// Amount moved.
    pub amount: Decimal,
    /// Human-readable reason.
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The ledger tracking all money movements in the simulation.
///
/// The ledger enforces two invariants at recording time (positive amounts,
/// parties matching the flow direction) and exposes the per-tick
/// conservation checks.
#[derive(Debug, Default)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<MoneyEntry>,
}

impl Ledger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Return the number of entries in the ledger.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a money movement.
    ///
    /// This is the general-purpose recording method. It builds and
    /// validates a [`MoneyEntry`] via the [`TransactionBuilder`] and
    /// appends it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_transfer(&mut self, params: TransferParams) -> Result<&MoneyEntry, LedgerError> {
        let mut builder = TransactionBuilder::new(params.tick, params.flow)
            .amount(params.amount)
            .reason(params.reason);

        if let Some(from) = params.from {
            builder = builder.from(from);
        }
        if let Some(to) = params.to {
            builder = builder.to(to);
        }

        let entry = builder.build().inspect_err(|e| {
            warn!(tick = params.tick, flow = ?params.flow, error = %e, "Rejected ledger entry");
        })?;
        debug!(
            tick = entry.tick,
            flow = ?entry.flow,
            amount = %entry.amount,
            reason = %entry.reason,
            "Ledger entry recorded"
        );
        self.entries.push(entry);

        self.entries.last().ok_or(LedgerError::InternalError(
            "failed to retrieve entry after append",
        ))
    }

    /// Record a wage payment (company to household).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_wage(
        &mut self,
        tick: u64,
        amount: Decimal,
        company: Party,
        household: Party,
    ) -> Result<&MoneyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            flow: FlowKind::Wage,
            from: Some(company),
            to: Some(household),
            amount,
            reason: "WAGE".to_owned(),
        })
    }

    /// Record sales revenue arriving from outside the economy.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_sale(
        &mut self,
        tick: u64,
        amount: Decimal,
        company: Party,
    ) -> Result<&MoneyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            flow: FlowKind::Sale,
            from: None,
            to: Some(company),
            amount,
            reason: "SALE".to_owned(),
        })
    }

    /// Record household consumption leaving the economy.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_consumption(
        &mut self,
        tick: u64,
        amount: Decimal,
        household: Party,
    ) -> Result<&MoneyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            flow: FlowKind::Consumption,
            from: Some(household),
            to: None,
            amount,
            reason: "CONSUMPTION".to_owned(),
        })
    }

    /// Record research spending leaving the economy.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_rd_investment(
        &mut self,
        tick: u64,
        amount: Decimal,
        company: Party,
    ) -> Result<&MoneyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            flow: FlowKind::Investment,
            from: Some(company),
            to: None,
            amount,
            reason: "RD_INVESTMENT".to_owned(),
        })
    }

    /// Record a movement between two agents.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if `flow` is not internal or the entry fails
    /// validation.
    pub fn record_internal(
        &mut self,
        tick: u64,
        flow: FlowKind,
        amount: Decimal,
        from: Party,
        to: Party,
    ) -> Result<&MoneyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            flow,
            from: Some(from),
            to: Some(to),
            amount,
            reason: flow_reason(flow).to_owned(),
        })
    }

    /// Record savings removed by the bank above the per-account cap.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_write_off(
        &mut self,
        tick: u64,
        amount: Decimal,
        bank: Party,
    ) -> Result<&MoneyEntry, LedgerError> {
        self.record_transfer(TransferParams {
            tick,
            flow: FlowKind::WriteOff,
            from: Some(bank),
            to: None,
            amount,
            reason: "SAVINGS_LIMIT".to_owned(),
        })
    }

    /// Record a fiscal levy receipt.
    ///
    /// Billed levies move money from payer to collector. Unbilled levies
    /// were assessed against an agent without a balance and enter the
    /// economy as `PaperTax`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the entry fails validation.
    pub fn record_levy(&mut self, tick: u64, levy: &Levy) -> Result<&MoneyEntry, LedgerError> {
        let payer = Party::new(levy.payer, levy.payer_kind);
        let collector = Party::new(levy.collector, levy.collector_kind);
        let reason = levy_reason(levy.kind).to_owned();

        if levy.billed {
            let flow = match levy.kind {
                LevyKind::LandTax
                | LevyKind::StateEnvironmentalTax
                | LevyKind::AgencyEnvironmentalTax => FlowKind::Tax,
                LevyKind::Confiscation => FlowKind::Confiscation,
                LevyKind::Penalty => FlowKind::Penalty,
                LevyKind::Estate => FlowKind::Estate,
            };
            self.record_transfer(TransferParams {
                tick,
                flow,
                from: Some(payer),
                to: Some(collector),
                amount: levy.amount,
                reason,
            })
        } else {
            self.record_transfer(TransferParams {
                tick,
                flow: FlowKind::PaperTax,
                from: None,
                to: Some(collector),
                amount: levy.amount,
                reason,
            })
        }
    }

    /// Verify that internal movements balance for a given tick.
    pub fn verify_conservation(&self, tick: u64) -> ConservationResult {
        verify_conservation(tick, &self.entries)
    }

    /// Verify that the observed change in money supply for `tick` equals
    /// the booked inflows minus outflows.
    pub fn verify_money_supply(
        &self,
        tick: u64,
        supply_before: Decimal,
        supply_after: Decimal,
    ) -> ConservationResult {
        verify_money_supply(tick, &self.entries, supply_before, supply_after)
    }

    /// Return all entries for a given tick.
    pub fn entries_for_tick(&self, tick: u64) -> Vec<&MoneyEntry> {
        self.entries.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all entries, in insertion order.
    pub fn all_entries(&self) -> &[MoneyEntry] {
        &self.entries
    }

    /// Net amount received by an agent across the whole ledger.
    ///
    /// Positive means the agent received more than it paid.
    pub fn agent_balance(&self, agent: AgentId) -> Decimal {
        let mut balance = Decimal::ZERO;

        for entry in &self.entries {
            if entry.to.is_some_and(|p| p.id == agent) {
                balance = balance.saturating_add(entry.amount);
            }
            if entry.from.is_some_and(|p| p.id == agent) {
                balance = balance.saturating_sub(entry.amount);
            }
        }

        balance
    }

    /// Net money entering the economy in a tick (inflows minus outflows).
    pub fn net_flow_for_tick(&self, tick: u64) -> Decimal {
        let mut net = Decimal::ZERO;

        for entry in &self.entries {
            if entry.tick != tick {
                continue;
            }
            if entry.flow.is_inflow() {
                net = net.saturating_add(entry.amount);
            } else if entry.flow.is_outflow() {
                net = net.saturating_sub(entry.amount);
            }
        }

        net
    }

    /// Total booked for a flow across all ticks.
    pub fn total_for_flow(&self, flow: FlowKind) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.flow == flow)
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
    }
}

/// Default reason string for an internal flow.
const fn flow_reason(flow: FlowKind) -> &'static str {
    match flow {
        FlowKind::Wage => "WAGE",
        FlowKind::Sale => "SALE",
        FlowKind::Consumption => "CONSUMPTION",
        FlowKind::Tax => "TAX",
        FlowKind::PaperTax => "PAPER_TAX",
        FlowKind::Confiscation => "HYPERWEALTH",
        FlowKind::Penalty => "ENV_PENALTY",
        FlowKind::Transfer => "ENV_TAX_TRANSFER",
        FlowKind::Deposit => "SAVINGS_DEPOSIT",
        FlowKind::Withdrawal => "SAVINGS_WITHDRAWAL",
        FlowKind::LoanRepayment => "LOAN_REPAYMENT",
        FlowKind::Credit => "CREDIT",
        FlowKind::Estate => "ESTATE",
        FlowKind::WriteOff => "SAVINGS_LIMIT",
        FlowKind::Investment => "RD_INVESTMENT",
        FlowKind::Endowment => "SPLIT_ENDOWMENT",
    }
}

/// Reason string for a levy channel.
const fn levy_reason(kind: LevyKind) -> &'static str {
    match kind {
        LevyKind::LandTax => "LAND_TAX",
        LevyKind::StateEnvironmentalTax => "STATE_ENV_TAX",
        LevyKind::AgencyEnvironmentalTax => "AGENCY_ENV_TAX",
        LevyKind::Confiscation => "HYPERWEALTH",
        LevyKind::Penalty => "ENV_PENALTY",
        LevyKind::Estate => "ESTATE",
    }
}
