//! The savings bank collaborator.
//!
//! Households talk to banks only through the [`SavingsBank`] trait. Every
//! operation returns the amount actually processed, which may be less than
//! requested; callers must use the returned value.
//!
//! [`Sparkasse`] is the concrete bank: a per-account savings cap, credit
//! bounded by liquidity, and repayments capped by outstanding principal.
//! Deposits and repayments add to liquidity; withdrawals and credit draw
//! from it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warengeld_types::{AgentId, AgentKind, Identified};

use crate::config::BankParams;

/// Deposit, withdrawal, and loan service keyed by account holder.
pub trait SavingsBank {
    /// Deposit up to `amount`; returns the amount accepted.
    fn deposit(&mut self, account: AgentId, amount: Decimal) -> Decimal;

    /// Withdraw `amount`; returns the amount paid out.
    fn withdraw(&mut self, account: AgentId, amount: Decimal) -> Decimal;

    /// Apply up to `amount` to the borrower's loan; returns the amount
    /// applied.
    fn receive_loan_repayment(&mut self, borrower: AgentId, amount: Decimal) -> Decimal;

    /// Outstanding principal for `borrower`.
    fn outstanding_loan(&self, borrower: AgentId) -> Decimal;

    /// Savings held for `account`.
    fn savings_of(&self, account: AgentId) -> Decimal;
}

/// Savings removed from one account by the cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsWriteOff {
    /// The capped account.
    pub account: AgentId,
    /// Amount removed.
    pub amount: Decimal,
}

/// A savings bank with capped accounts and liquidity-bounded credit.
#[derive(Debug, Clone)]
pub struct Sparkasse {
    id: AgentId,
    max_savings_per_account: Decimal,
    savings_accounts: BTreeMap<AgentId, Decimal>,
    active_loans: BTreeMap<AgentId, Decimal>,
    total_savings: Decimal,
    liquidity: Decimal,
}

impl Sparkasse {
    /// Open a bank with the configured cap and starting liquidity.
    pub fn new(params: &BankParams) -> Self {
        Self {
            id: AgentId::new(),
            max_savings_per_account: params.max_savings_per_account,
            savings_accounts: BTreeMap::new(),
            active_loans: BTreeMap::new(),
            total_savings: Decimal::ZERO,
            liquidity: params.initial_liquidity,
        }
    }

    /// The bank's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Money the bank holds and can lend.
    pub const fn liquidity(&self) -> Decimal {
        self.liquidity
    }

    /// Sum of all savings accounts.
    pub const fn total_savings(&self) -> Decimal {
        self.total_savings
    }

    /// Sum of all outstanding loans.
    pub fn total_loans(&self) -> Decimal {
        self.active_loans
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }

    /// Per-account savings cap.
    pub const fn max_savings_per_account(&self) -> Decimal {
        self.max_savings_per_account
    }

    /// Change the per-account cap. Existing excess is removed on the next
    /// [`Sparkasse::step`].
    pub const fn set_savings_cap(&mut self, cap: Decimal) {
        self.max_savings_per_account = cap;
    }

    /// Lend `amount` to `borrower` if liquidity covers it in full.
    ///
    /// Returns the amount lent (all or nothing); the caller credits the
    /// borrower.
    pub fn allocate_credit(&mut self, borrower: AgentId, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            warn!(borrower = %borrower, amount = %amount, "Invalid credit request");
            return Decimal::ZERO;
        }
        if self.liquidity < amount {
            warn!(
                borrower = %borrower,
                amount = %amount,
                liquidity = %self.liquidity,
                "Insufficient liquidity for credit"
            );
            return Decimal::ZERO;
        }
        let loan = self.active_loans.entry(borrower).or_insert(Decimal::ZERO);
        *loan = loan.saturating_add(amount);
        self.liquidity = self.liquidity.saturating_sub(amount);
        info!(borrower = %borrower, amount = %amount, "Credit allocated");
        amount
    }

    /// Cut an account back to the cap. Returns the excess removed.
    pub fn enforce_savings_limit(&mut self, account: AgentId) -> Decimal {
        let Some(balance) = self.savings_accounts.get_mut(&account) else {
            return Decimal::ZERO;
        };
        if *balance <= self.max_savings_per_account {
            return Decimal::ZERO;
        }
        let excess = balance.saturating_sub(self.max_savings_per_account);
        *balance = self.max_savings_per_account;
        self.total_savings = self.total_savings.saturating_sub(excess);
        self.liquidity = self.liquidity.saturating_sub(excess);
        info!(account = %account, excess = %excess, "Savings limit enforced");
        excess
    }

    /// Move an account and its loan to a new holder, e.g. an heir.
    pub fn reassign_account(&mut self, from: AgentId, to: AgentId) {
        if from == to {
            return;
        }
        if let Some(savings) = self.savings_accounts.remove(&from) {
            let slot = self.savings_accounts.entry(to).or_insert(Decimal::ZERO);
            *slot = slot.saturating_add(savings);
        }
        if let Some(loan) = self.active_loans.remove(&from) {
            let slot = self.active_loans.entry(to).or_insert(Decimal::ZERO);
            *slot = slot.saturating_add(loan);
        }
        debug!(from = %from, to = %to, "Account reassigned");
    }

    /// Enforce the cap on every account.
    pub fn step(&mut self, current_step: u64) -> Vec<SavingsWriteOff> {
        let accounts: Vec<AgentId> = self.savings_accounts.keys().copied().collect();
        let mut write_offs = Vec::new();
        for account in accounts {
            let amount = self.enforce_savings_limit(account);
            if amount > Decimal::ZERO {
                write_offs.push(SavingsWriteOff { account, amount });
            }
        }
        debug!(
            step = current_step,
            liquidity = %self.liquidity,
            total_savings = %self.total_savings,
            "Savings bank step complete"
        );
        write_offs
    }
}

impl SavingsBank for Sparkasse {
    fn deposit(&mut self, account: AgentId, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let current = self.savings_of(account);
        let room = self
            .max_savings_per_account
            .saturating_sub(current)
            .max(Decimal::ZERO);
        let accepted = amount.min(room);
        if accepted <= Decimal::ZERO {
            debug!(account = %account, amount = %amount, "Deposit rejected: savings cap reached");
            return Decimal::ZERO;
        }
        self.savings_accounts
            .insert(account, current.saturating_add(accepted));
        self.total_savings = self.total_savings.saturating_add(accepted);
        self.liquidity = self.liquidity.saturating_add(accepted);
        debug!(
            account = %account,
            accepted = %accepted,
            rejected = %amount.saturating_sub(accepted),
            "Savings deposited"
        );
        accepted
    }

    fn withdraw(&mut self, account: AgentId, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let current = self.savings_of(account);
        if current < amount {
            warn!(
                account = %account,
                requested = %amount,
                available = %current,
                "Withdrawal exceeds savings"
            );
            return Decimal::ZERO;
        }
        self.savings_accounts
            .insert(account, current.saturating_sub(amount));
        self.total_savings = self.total_savings.saturating_sub(amount);
        self.liquidity = self.liquidity.saturating_sub(amount);
        debug!(account = %account, amount = %amount, "Savings withdrawn");
        amount
    }

    fn receive_loan_repayment(&mut self, borrower: AgentId, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let Some(outstanding) = self.active_loans.get_mut(&borrower) else {
            return Decimal::ZERO;
        };
        let repaid = amount.min(*outstanding);
        if repaid <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        *outstanding = outstanding.saturating_sub(repaid);
        let remaining = *outstanding;
        if remaining <= Decimal::ZERO {
            self.active_loans.remove(&borrower);
        }
        self.liquidity = self.liquidity.saturating_add(repaid);
        debug!(borrower = %borrower, repaid = %repaid, remaining = %remaining, "Loan repayment received");
        repaid
    }

    fn outstanding_loan(&self, borrower: AgentId) -> Decimal {
        self.active_loans
            .get(&borrower)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn savings_of(&self, account: AgentId) -> Decimal {
        self.savings_accounts
            .get(&account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl Identified for Sparkasse {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::SavingsBank
    }
}
