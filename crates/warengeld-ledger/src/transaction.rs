//! Transaction builder and validation for the money ledger.
//!
//! Provides a [`TransactionBuilder`] that enforces the flow-direction
//! contract: internal flows name both parties, inflows name only the
//! receiver, outflows name only the payer. Builders validate inputs before
//! producing a [`MoneyEntry`].

use chrono::Utc;
use rust_decimal::Decimal;

use warengeld_types::{FlowKind, LedgerEntryId, MoneyEntry, Party};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`MoneyEntry`] values.
///
/// # Examples
///
/// ```
/// use warengeld_ledger::TransactionBuilder;
/// use warengeld_types::{AgentId, AgentKind, FlowKind, Party};
/// use rust_decimal::Decimal;
///
/// let entry = TransactionBuilder::new(1, FlowKind::Wage)
///     .from(Party::new(AgentId::new(), AgentKind::Company))
///     .to(Party::new(AgentId::new(), AgentKind::Household))
///     .amount(Decimal::new(60, 0))
///     .reason("WAGE".to_owned())
///     .build();
///
/// assert!(entry.is_ok());
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    tick: u64,
    flow: FlowKind,
    from: Option<Party>,
    to: Option<Party>,
    amount: Option<Decimal>,
    reason: Option<String>,
}

impl TransactionBuilder {
    /// Start building an entry for the given tick and flow.
    pub const fn new(tick: u64, flow: FlowKind) -> Self {
        Self {
            tick,
            flow,
            from: None,
            to: None,
            amount: None,
            reason: None,
        }
    }

    /// Set the paying party (debit side).
    #[must_use]
    pub const fn from(mut self, party: Party) -> Self {
        self.from = Some(party);
        self
    }

    /// Set the receiving party (credit side).
    #[must_use]
    pub const fn to(mut self, party: Party) -> Self {
        self.to = Some(party);
        self
    }

    /// Set the amount moved.
    #[must_use]
    pub const fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the human-readable reason.
    #[must_use]
    pub fn reason(mut self, reason: String) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Validate inputs and produce a [`MoneyEntry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] if the amount is zero,
    /// [`LedgerError::NegativeAmount`] if it is negative,
    /// [`LedgerError::MissingField`] if amount or reason are unset, and
    /// [`LedgerError::InvalidParty`] if the parties do not match the flow.
    pub fn build(self) -> Result<MoneyEntry, LedgerError> {
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let reason = self.reason.ok_or(LedgerError::MissingField("reason"))?;

        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount.is_sign_negative() {
            return Err(LedgerError::NegativeAmount { amount });
        }

        validate_parties(self.flow, self.from.as_ref(), self.to.as_ref())?;

        Ok(MoneyEntry {
            id: LedgerEntryId::new(),
            tick: self.tick,
            flow: self.flow,
            from: self.from,
            to: self.to,
            amount,
            reason,
            created_at: Utc::now(),
        })
    }
}

/// Validate that the parties present match the direction of `flow`.
fn validate_parties(
    flow: FlowKind,
    from: Option<&Party>,
    to: Option<&Party>,
) -> Result<(), LedgerError> {
    let (needs_from, needs_to) = expected_parties(flow);

    match (needs_from, from.is_some()) {
        (true, false) => {
            return Err(LedgerError::InvalidParty {
                flow,
                side: "from",
                reason: "flow requires a paying party",
            });
        }
        (false, true) => {
            return Err(LedgerError::InvalidParty {
                flow,
                side: "from",
                reason: "inflows arrive from outside the economy",
            });
        }
        _ => {}
    }

    match (needs_to, to.is_some()) {
        (true, false) => Err(LedgerError::InvalidParty {
            flow,
            side: "to",
            reason: "flow requires a receiving party",
        }),
        (false, true) => Err(LedgerError::InvalidParty {
            flow,
            side: "to",
            reason: "outflows leave the economy",
        }),
        _ => Ok(()),
    }
}

/// Return whether (from, to) parties are required for each [`FlowKind`].
const fn expected_parties(flow: FlowKind) -> (bool, bool) {
    if flow.is_inflow() {
        (false, true)
    } else if flow.is_outflow() {
        (true, false)
    } else {
        (true, true)
    }
}
