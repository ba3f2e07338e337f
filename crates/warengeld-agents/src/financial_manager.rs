//! Per-step financial decisions of a household.
//!
//! [`FinancialManager`] is a borrowing view over a [`Household`]: it holds
//! no money of its own and writes every decision into the household's
//! bounded history for diagnostics.
//!
//! Child-rearing accounting: `child_cost_paid` accumulates across calls and
//! each call withdraws at most `child_rearing_cost - child_cost_paid`, so the
//! cumulative withdrawal for one child never exceeds its cost.
//!
//! A split endows the child household with a share of the parent's total
//! savings, drawn from the bank first and then from local savings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use warengeld_types::AgentId;

use crate::config::HealthThresholds;
use crate::household::Household;
use crate::savings_bank::SavingsBank;

/// Maximum number of history entries kept per household.
pub const MAX_HISTORY: usize = 100;

/// The kind of financial decision recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialActivity {
    /// Income credited.
    Income,
    /// Cash consumed.
    Consumption,
    /// Cash swept into savings.
    SavingsSweep,
    /// Savings withdrawn toward child-rearing.
    ChildRearing,
    /// Loan repayment paid.
    LoanRepayment,
    /// Savings handed to a child household.
    Split,
}

/// One entry in a household's financial history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// What happened.
    pub kind: FinancialActivity,
    /// Amount involved.
    pub amount: Decimal,
    /// Checking account afterwards.
    pub checking_after: Decimal,
    /// Local savings afterwards.
    pub savings_after: Decimal,
}

/// Snapshot of a household's finances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// The household.
    pub household: AgentId,
    /// Checking account.
    pub checking_account: Decimal,
    /// Local savings.
    pub local_savings: Decimal,
    /// Savings held at the bank.
    pub bank_savings: Decimal,
    /// Outstanding bank loan.
    pub outstanding_loan: Decimal,
    /// Whether the household is in its growth phase.
    pub growth_phase: bool,
}

/// Where the endowment of a child household came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitFunding {
    /// Withdrawn from the bank.
    pub from_bank: Decimal,
    /// Taken from local savings.
    pub from_local: Decimal,
}

impl SplitFunding {
    /// The whole endowment.
    pub fn total(&self) -> Decimal {
        self.from_bank.saturating_add(self.from_local)
    }
}

/// Financial operations on one household.
pub struct FinancialManager<'a> {
    household: &'a mut Household,
}

impl<'a> FinancialManager<'a> {
    /// Wrap a household.
    pub const fn new(household: &'a mut Household) -> Self {
        Self { household }
    }

    /// Credit `amount`, or the household's reference income when `None`.
    pub fn process_income(&mut self, amount: Option<Decimal>) -> Decimal {
        let amount = amount.unwrap_or(self.household.income);
        self.household.checking_account = self.household.checking_account.saturating_add(amount);
        self.record(FinancialActivity::Income, amount);
        amount
    }

    /// Consume `fraction` of the checking account. Returns the amount
    /// consumed; a non-positive account consumes nothing.
    pub fn manage_consumption(&mut self, fraction: Decimal) -> Decimal {
        let base = self.household.checking_account.max(Decimal::ZERO);
        let consumed = base.saturating_mul(fraction);
        if consumed <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.household.checking_account = self.household.checking_account.saturating_sub(consumed);
        self.record(FinancialActivity::Consumption, consumed);
        consumed
    }

    /// Sweep the whole checking account into savings.
    ///
    /// Without a bank everything goes to local savings. With a bank the
    /// deposit goes to the bank, and whatever it rejects stays in local
    /// savings. An overdrawn account is carried into local savings, so
    /// checking always ends at zero. Returns the amount swept.
    pub fn optimize_savings(&mut self, bank: Option<&mut dyn SavingsBank>) -> Decimal {
        let amount = self.household.checking_account;
        if amount.is_zero() {
            return Decimal::ZERO;
        }
        self.household.checking_account = Decimal::ZERO;

        let deposited = match bank {
            Some(bank) if amount > Decimal::ZERO => bank.deposit(self.household.id(), amount),
            _ => Decimal::ZERO,
        };
        let kept = amount.saturating_sub(deposited);
        self.household.local_savings = self.household.local_savings.saturating_add(kept);

        debug!(
            household = %self.household.id(),
            swept = %amount,
            deposited = %deposited,
            kept_locally = %kept,
            "Savings sweep"
        );
        self.record(FinancialActivity::SavingsSweep, amount);
        amount
    }

    /// Withdraw savings toward the child-rearing cost while in the growth
    /// phase.
    ///
    /// Draws from the bank first, then local savings, never more than the
    /// cost still outstanding. Withdrawals are credited to checking.
    /// Returns the amount withdrawn on this call.
    pub fn handle_childrearing_costs(&mut self, bank: Option<&mut dyn SavingsBank>) -> Decimal {
        let h = &mut *self.household;
        if !h.growth_phase || h.child_cost_covered {
            return Decimal::ZERO;
        }
        let mut need = h.child_rearing_cost.saturating_sub(h.child_cost_paid);
        if need <= Decimal::ZERO {
            h.child_cost_covered = true;
            return Decimal::ZERO;
        }

        let mut withdrawn = Decimal::ZERO;
        if let Some(bank) = bank {
            let request = need.min(bank.savings_of(h.id()));
            if request > Decimal::ZERO {
                let from_bank = bank.withdraw(h.id(), request);
                withdrawn = withdrawn.saturating_add(from_bank);
                need = need.saturating_sub(from_bank);
            }
        }

        let from_local = need.min(h.local_savings.max(Decimal::ZERO));
        if from_local > Decimal::ZERO {
            h.local_savings = h.local_savings.saturating_sub(from_local);
            withdrawn = withdrawn.saturating_add(from_local);
        }

        h.checking_account = h.checking_account.saturating_add(withdrawn);
        h.child_cost_paid = h.child_cost_paid.saturating_add(withdrawn);
        if h.child_cost_paid >= h.child_rearing_cost {
            h.child_cost_covered = true;
            info!(household = %h.id(), cost = %h.child_rearing_cost, "Child-rearing cost covered");
        }

        if withdrawn > Decimal::ZERO {
            self.record(FinancialActivity::ChildRearing, withdrawn);
        }
        withdrawn
    }

    /// Withdraw `share` of total savings to endow a child household.
    ///
    /// Draws from the bank first, then local savings. Nothing moves when
    /// total savings are not positive. The endowment leaves the household;
    /// checking is untouched.
    pub fn fund_split(
        &mut self,
        share: Decimal,
        bank: Option<&mut dyn SavingsBank>,
    ) -> SplitFunding {
        let id = self.household.id();
        let at_bank = bank.as_ref().map_or(Decimal::ZERO, |b| b.savings_of(id));
        let local = self.household.local_savings.max(Decimal::ZERO);
        let target = at_bank.saturating_add(local).saturating_mul(share);
        if target <= Decimal::ZERO {
            return SplitFunding::default();
        }

        let mut funding = SplitFunding::default();
        if let Some(bank) = bank {
            let request = target.min(at_bank);
            if request > Decimal::ZERO {
                funding.from_bank = bank.withdraw(id, request);
            }
        }
        funding.from_local = target.saturating_sub(funding.from_bank).min(local);
        self.household.local_savings = self
            .household
            .local_savings
            .saturating_sub(funding.from_local);

        debug!(
            household = %id,
            from_bank = %funding.from_bank,
            from_local = %funding.from_local,
            "Split funded"
        );
        let total = funding.total();
        if total > Decimal::ZERO {
            self.record(FinancialActivity::Split, total);
        }
        funding
    }

    /// Offer `checking × loan_repayment_rate` to the bank when a loan is
    /// outstanding. Returns the amount the bank applied.
    pub fn repay_savings_loans(&mut self, bank: &mut dyn SavingsBank) -> Decimal {
        let id = self.household.id();
        if bank.outstanding_loan(id) <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let budget = self
            .household
            .checking_account
            .max(Decimal::ZERO)
            .saturating_mul(self.household.loan_repayment_rate);
        if budget <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let paid = bank.receive_loan_repayment(id, budget);
        if paid <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.household.checking_account = self.household.checking_account.saturating_sub(paid);
        debug!(household = %id, paid = %paid, "Loan repayment");
        self.record(FinancialActivity::LoanRepayment, paid);
        paid
    }

    /// Local savings plus what the bank holds for this household.
    pub fn total_savings(&self, bank: Option<&dyn SavingsBank>) -> Decimal {
        let at_bank = bank.map_or(Decimal::ZERO, |b| b.savings_of(self.household.id()));
        self.household.local_savings.saturating_add(at_bank)
    }

    /// Score in `[0, 1]`: 60% assets (checking plus local savings) and 40%
    /// income, each saturating at its threshold.
    pub fn financial_health_score(&self, thresholds: &HealthThresholds) -> Decimal {
        let assets = self.household.cash().max(Decimal::ZERO);
        let asset_part = ratio(assets, thresholds.assets);
        let income_part = ratio(self.household.income.max(Decimal::ZERO), thresholds.income);
        asset_part
            .saturating_mul(Decimal::new(6, 1))
            .saturating_add(income_part.saturating_mul(Decimal::new(4, 1)))
    }

    /// Snapshot for reporting.
    pub fn financial_summary(&self, bank: Option<&dyn SavingsBank>) -> FinancialSummary {
        let id = self.household.id();
        FinancialSummary {
            household: id,
            checking_account: self.household.checking_account,
            local_savings: self.household.local_savings,
            bank_savings: bank.map_or(Decimal::ZERO, |b| b.savings_of(id)),
            outstanding_loan: bank.map_or(Decimal::ZERO, |b| b.outstanding_loan(id)),
            growth_phase: self.household.growth_phase,
        }
    }

    /// The most recent `limit` history entries, oldest first.
    pub fn financial_history(&self, limit: usize) -> &[FinancialRecord] {
        let history = &self.household.history;
        let start = history.len().saturating_sub(limit);
        history.get(start..).unwrap_or_default()
    }

    fn record(&mut self, kind: FinancialActivity, amount: Decimal) {
        let h = &mut *self.household;
        h.history.push(FinancialRecord {
            kind,
            amount,
            checking_after: h.checking_account,
            savings_after: h.local_savings,
        });
        if h.history.len() > MAX_HISTORY {
            let excess = h.history.len().saturating_sub(MAX_HISTORY);
            h.history.drain(..excess);
        }
    }
}

/// `value / threshold` clamped to `[0, 1]`; a non-positive threshold
/// saturates immediately.
fn ratio(value: Decimal, threshold: Decimal) -> Decimal {
    if threshold <= Decimal::ZERO {
        return if value > Decimal::ZERO {
            Decimal::ONE
        } else {
            Decimal::ZERO
        };
    }
    value
        .checked_div(threshold)
        .unwrap_or(Decimal::ONE)
        .clamp(Decimal::ZERO, Decimal::ONE)
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::{BankParams, HouseholdParams};
    use crate::household::HouseholdSeed;
    use crate::savings_bank::Sparkasse;

    fn household(checking: Decimal) -> Household {
        Household::new(
            &HouseholdParams::default(),
            &HouseholdSeed {
                income: dec!(100),
                land_area: dec!(10),
                environmental_impact: dec!(1),
                checking_account: checking,
            },
        )
    }

    fn bank(liquidity: Decimal) -> Sparkasse {
        Sparkasse::new(&BankParams {
            max_savings_per_account: dec!(1000),
            initial_liquidity: liquidity,
        })
    }

    #[test]
    fn income_defaults_to_reference_income() {
        let mut h = household(Decimal::ZERO);
        assert_eq!(h.finances().process_income(None), dec!(100));
        assert_eq!(h.finances().process_income(Some(dec!(60))), dec!(60));
        assert_eq!(h.checking_account, dec!(160));
    }

    #[test]
    fn consumption_is_fraction_of_cash() {
        let mut h = household(dec!(200));
        assert_eq!(h.finances().manage_consumption(dec!(0.7)), dec!(140));
        assert_eq!(h.checking_account, dec!(60));

        let mut broke = household(dec!(-10));
        assert_eq!(broke.finances().manage_consumption(dec!(0.7)), Decimal::ZERO);
        assert_eq!(broke.checking_account, dec!(-10));
    }

    #[test]
    fn sweep_without_bank_goes_local() {
        let mut h = household(dec!(80));
        assert_eq!(h.finances().optimize_savings(None), dec!(80));
        assert_eq!(h.checking_account, Decimal::ZERO);
        assert_eq!(h.local_savings, dec!(80));
    }

    #[test]
    fn sweep_carries_overdraft_into_local_savings() {
        let mut h = household(dec!(-40));
        let mut b = bank(Decimal::ZERO);
        h.local_savings = dec!(25);

        assert_eq!(h.finances().optimize_savings(Some(&mut b)), dec!(-40));
        assert_eq!(h.checking_account, Decimal::ZERO);
        assert_eq!(h.local_savings, dec!(-15));
        assert_eq!(b.savings_of(h.id()), Decimal::ZERO);
        assert_eq!(h.cash(), dec!(-15));
    }

    #[test]
    fn sweep_with_bank_skips_local_savings() {
        let mut h = household(dec!(80));
        let mut b = bank(Decimal::ZERO);
        assert_eq!(h.finances().optimize_savings(Some(&mut b)), dec!(80));
        assert_eq!(h.checking_account, Decimal::ZERO);
        assert_eq!(h.local_savings, Decimal::ZERO);
        assert_eq!(b.savings_of(h.id()), dec!(80));
    }

    #[test]
    fn sweep_overflow_above_cap_stays_local() {
        let mut h = household(dec!(1200));
        let mut b = bank(Decimal::ZERO);
        h.finances().optimize_savings(Some(&mut b));
        assert_eq!(b.savings_of(h.id()), dec!(1000));
        assert_eq!(h.local_savings, dec!(200));
    }

    #[test]
    fn childrearing_only_in_growth_phase() {
        let mut h = household(Decimal::ZERO);
        h.local_savings = dec!(500);
        assert_eq!(h.finances().handle_childrearing_costs(None), Decimal::ZERO);
        assert_eq!(h.local_savings, dec!(500));
    }

    #[test]
    fn childrearing_withdrawal_never_exceeds_cost() {
        let mut h = household(Decimal::ZERO);
        h.growth_phase = true;
        h.local_savings = dec!(120);

        // First call: only 120 available of 200.
        assert_eq!(h.finances().handle_childrearing_costs(None), dec!(120));
        assert!(!h.child_cost_covered);
        assert_eq!(h.checking_account, dec!(120));

        // Later call withdraws only the remaining 80.
        h.local_savings = dec!(500);
        assert_eq!(h.finances().handle_childrearing_costs(None), dec!(80));
        assert!(h.child_cost_covered);
        assert_eq!(h.child_cost_paid, dec!(200));
        assert_eq!(h.local_savings, dec!(420));

        // Covered: nothing more.
        assert_eq!(h.finances().handle_childrearing_costs(None), Decimal::ZERO);
    }

    #[test]
    fn childrearing_draws_bank_before_local() {
        let mut h = household(Decimal::ZERO);
        let mut b = bank(Decimal::ZERO);
        b.deposit(h.id(), dec!(150));
        h.growth_phase = true;
        h.local_savings = dec!(100);

        let withdrawn = h.finances().handle_childrearing_costs(Some(&mut b));
        assert_eq!(withdrawn, dec!(200));
        assert_eq!(b.savings_of(h.id()), Decimal::ZERO);
        assert_eq!(h.local_savings, dec!(50));
        assert_eq!(h.checking_account, dec!(200));
        assert!(h.child_cost_covered);
    }

    #[test]
    fn split_takes_share_of_savings_bank_first() {
        let mut h = household(dec!(30));
        let mut b = bank(Decimal::ZERO);
        b.deposit(h.id(), dec!(300));
        h.local_savings = dec!(200);

        // 80% of 500: all 300 from the bank, 100 from local savings.
        let funding = h.finances().fund_split(dec!(0.8), Some(&mut b));
        assert_eq!(funding.from_bank, dec!(300));
        assert_eq!(funding.from_local, dec!(100));
        assert_eq!(funding.total(), dec!(400));
        assert_eq!(b.savings_of(h.id()), Decimal::ZERO);
        assert_eq!(h.local_savings, dec!(100));
        assert_eq!(h.checking_account, dec!(30));
    }

    #[test]
    fn split_without_savings_moves_nothing() {
        let mut h = household(dec!(30));
        h.local_savings = dec!(-10);
        assert_eq!(h.finances().fund_split(dec!(0.8), None), SplitFunding::default());
        assert_eq!(h.local_savings, dec!(-10));
    }

    #[test]
    fn loan_repayment_requires_outstanding_loan() {
        let mut h = household(dec!(100));
        let mut b = bank(dec!(50));
        assert_eq!(h.finances().repay_savings_loans(&mut b), Decimal::ZERO);

        b.allocate_credit(h.id(), dec!(5));
        // Offers 10, bank applies 5.
        assert_eq!(h.finances().repay_savings_loans(&mut b), dec!(5));
        assert_eq!(h.checking_account, dec!(95));
        assert_eq!(b.outstanding_loan(h.id()), Decimal::ZERO);
    }

    #[test]
    fn health_score_is_bounded_and_monotone() {
        let thresholds = HealthThresholds::default();
        let mut poor = household(dec!(100));
        let mut rich = household(dec!(900));
        let poor_score = poor.finances().financial_health_score(&thresholds);
        let rich_score = rich.finances().financial_health_score(&thresholds);
        assert_eq!(poor_score, dec!(0.46));
        assert!(rich_score > poor_score);

        let mut richest = household(dec!(5000));
        assert_eq!(richest.finances().financial_health_score(&thresholds), Decimal::ONE);
    }

    #[test]
    fn history_is_capped() {
        let mut h = household(Decimal::ZERO);
        for _ in 0..(MAX_HISTORY + 20) {
            h.finances().process_income(Some(dec!(1)));
        }
        let fm = h.finances();
        assert_eq!(fm.financial_history(usize::MAX).len(), MAX_HISTORY);
        assert_eq!(fm.financial_history(3).len(), 3);
        assert_eq!(
            fm.financial_history(1).first().map(|r| r.checking_after),
            Some(dec!(120))
        );
    }

    #[test]
    fn summary_reports_bank_positions() {
        let mut h = household(dec!(40));
        let mut b = bank(dec!(10));
        b.deposit(h.id(), dec!(30));
        b.allocate_credit(h.id(), dec!(15));
        let summary = h.finances().financial_summary(Some(&b));
        assert_eq!(summary.bank_savings, dec!(30));
        assert_eq!(summary.outstanding_loan, dec!(15));
        assert_eq!(h.finances().total_savings(Some(&b)), dec!(30));
    }
}
