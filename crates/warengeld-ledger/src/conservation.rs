//! Conservation law verification for the money ledger.
//!
//! Two checks run after every tick:
//!
//! 1. **Internal balance**: every internal movement (wage, tax, deposit,
//!    estate, ...) debits one agent and credits another by the same amount.
//!    For each internal flow F in tick T:
//!
//!    ```text
//!    sum(credits for F in T) == sum(debits for F in T)
//!    ```
//!
//!    Well-formed entries satisfy this by construction; an entry missing
//!    a side (corruption, or a record built without the builder) breaks it.
//!
//! 2. **Money supply**: the observed change in money supply over tick T
//!    equals booked inflows minus booked outflows.
//!
//! A violation produces a [`LedgerAnomaly`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use warengeld_types::{FlowKind, MoneyEntry};

use crate::LedgerAnomaly;

/// The result of a conservation check for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The ledger is balanced for this tick.
    Balanced,
    /// The books do not explain the money movements.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify that internal movements balance for all entries in a tick.
///
/// Inflows (`Sale`, `PaperTax`) and outflows (`Consumption`, `WriteOff`)
/// are excluded; they legitimately change the money supply.
pub fn verify_conservation(tick: u64, entries: &[MoneyEntry]) -> ConservationResult {
    let mut credit: BTreeMap<FlowKind, Decimal> = BTreeMap::new();
    let mut debit: BTreeMap<FlowKind, Decimal> = BTreeMap::new();

    for entry in entries {
        if entry.tick != tick || !entry.flow.is_internal() {
            continue;
        }

        if entry.to.is_some() {
            let c = credit.entry(entry.flow).or_insert(Decimal::ZERO);
            *c = match c.checked_add(entry.amount) {
                Some(val) => val,
                None => return overflow_anomaly(tick, entry.flow),
            };
        }

        if entry.from.is_some() {
            let d = debit.entry(entry.flow).or_insert(Decimal::ZERO);
            *d = match d.checked_add(entry.amount) {
                Some(val) => val,
                None => return overflow_anomaly(tick, entry.flow),
            };
        }
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut unbalanced: Vec<FlowKind> = Vec::new();

    for flow in credit.keys().chain(debit.keys()) {
        if unbalanced.contains(flow) {
            continue;
        }
        let c = credit.get(flow).copied().unwrap_or(Decimal::ZERO);
        let d = debit.get(flow).copied().unwrap_or(Decimal::ZERO);
        if c != d {
            unbalanced.push(*flow);
            total_credit = total_credit.saturating_add(c);
            total_debit = total_debit.saturating_add(d);
        }
    }

    if unbalanced.is_empty() {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            tick,
            expected: total_debit,
            actual: total_credit,
            message: format!(
                "LEDGER_ANOMALY at tick {tick}: internal flows unbalanced for {unbalanced:?}",
            ),
        })
    }
}

/// Verify that the money supply moved exactly as the ledger explains.
///
/// `supply_before` and `supply_after` are measured by the caller at the
/// start and end of `tick`.
pub fn verify_money_supply(
    tick: u64,
    entries: &[MoneyEntry],
    supply_before: Decimal,
    supply_after: Decimal,
) -> ConservationResult {
    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;

    for entry in entries {
        if entry.tick != tick {
            continue;
        }
        if entry.flow.is_inflow() {
            inflow = match inflow.checked_add(entry.amount) {
                Some(val) => val,
                None => return overflow_anomaly(tick, entry.flow),
            };
        } else if entry.flow.is_outflow() {
            outflow = match outflow.checked_add(entry.amount) {
                Some(val) => val,
                None => return overflow_anomaly(tick, entry.flow),
            };
        }
    }

    let (Some(expected), Some(actual)) = (
        inflow.checked_sub(outflow),
        supply_after.checked_sub(supply_before),
    ) else {
        return overflow_anomaly(tick, FlowKind::Sale);
    };

    if expected == actual {
        ConservationResult::Balanced
    } else {
        ConservationResult::Anomaly(LedgerAnomaly {
            tick,
            expected,
            actual,
            message: format!(
                "LEDGER_ANOMALY at tick {tick}: money supply changed by {actual}, ledger explains {expected}",
            ),
        })
    }
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(tick: u64, flow: FlowKind) -> ConservationResult {
    ConservationResult::Anomaly(LedgerAnomaly {
        tick,
        expected: Decimal::ZERO,
        actual: Decimal::ZERO,
        message: format!("LEDGER_ANOMALY at tick {tick}: arithmetic overflow while summing {flow:?}"),
    })
}
