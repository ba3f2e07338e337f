//! The state treasury.
//!
//! Each step runs three phases in strict order:
//!
//! 1. [`State::collect_taxes`] -- land tax and environmental tax.
//! 2. [`State::oversee_hyperwealth`] -- confiscate balances above the ceiling.
//! 3. [`State::distribute_funds`] -- split revenue across the budgets.
//!
//! Agents without a balance are taxed on paper: the amount still counts as
//! revenue but nothing is deducted. Every assessment is returned as a
//! [`Levy`] receipt.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use warengeld_types::{AgentId, AgentKind, FiscalSubject, Identified, Levy, LevyKind};

use crate::config::TaxParams;

/// The state treasury.
#[derive(Debug, Clone)]
pub struct State {
    id: AgentId,
    params: TaxParams,
    tax_revenue: Decimal,
    infrastructure_budget: Decimal,
    social_budget: Decimal,
    environment_budget: Decimal,
}

impl State {
    /// Create a treasury with empty accounts.
    pub fn new(params: TaxParams) -> Self {
        Self {
            id: AgentId::new(),
            params,
            tax_revenue: Decimal::ZERO,
            infrastructure_budget: Decimal::ZERO,
            social_budget: Decimal::ZERO,
            environment_budget: Decimal::ZERO,
        }
    }

    /// The state's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Revenue awaiting distribution.
    pub const fn tax_revenue(&self) -> Decimal {
        self.tax_revenue
    }

    /// Infrastructure budget.
    pub const fn infrastructure_budget(&self) -> Decimal {
        self.infrastructure_budget
    }

    /// Social budget.
    pub const fn social_budget(&self) -> Decimal {
        self.social_budget
    }

    /// Environment budget.
    pub const fn environment_budget(&self) -> Decimal {
        self.environment_budget
    }

    /// Sum of the three budgets.
    pub fn total_budgets(&self) -> Decimal {
        self.infrastructure_budget
            .saturating_add(self.social_budget)
            .saturating_add(self.environment_budget)
    }

    /// All money the state holds: undistributed revenue plus budgets.
    pub fn holdings(&self) -> Decimal {
        self.tax_revenue.saturating_add(self.total_budgets())
    }

    /// Add to undistributed revenue.
    pub fn receive_tax_revenue(&mut self, amount: Decimal) {
        self.tax_revenue = self.tax_revenue.saturating_add(amount);
    }

    /// Add directly to the environment budget.
    pub fn receive_environment_funds(&mut self, amount: Decimal) {
        self.environment_budget = self.environment_budget.saturating_add(amount);
    }

    /// Accept the cash of a household that left without an heir.
    pub fn receive_estate(&mut self, from: AgentId, amount: Decimal) -> Option<Levy> {
        if amount <= Decimal::ZERO {
            return None;
        }
        self.receive_tax_revenue(amount);
        info!(household = %from, amount = %amount, "State received estate");
        Some(Levy {
            payer: from,
            payer_kind: AgentKind::Household,
            collector: self.id,
            collector_kind: AgentKind::State,
            kind: LevyKind::Estate,
            amount,
            billed: true,
        })
    }

    /// Settle the debt of a household that left without an heir.
    ///
    /// The deficit is charged against undistributed revenue, which may go
    /// negative. Returns the amount settled.
    pub fn cover_estate_deficit(&mut self, from: AgentId, deficit: Decimal) -> Decimal {
        if deficit <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.tax_revenue = self.tax_revenue.saturating_sub(deficit);
        warn!(household = %from, deficit = %deficit, "State settled estate deficit");
        deficit
    }

    /// Assess land tax and environmental tax on every agent.
    pub fn collect_taxes(&mut self, agents: &mut [&mut dyn FiscalSubject]) -> Vec<Levy> {
        let mut levies = Vec::new();

        for agent in agents.iter_mut() {
            let land_tax = agent
                .as_land_holding()
                .map_or(Decimal::ZERO, |l| l.land_area().saturating_mul(self.params.land_tax_rate));
            let env_tax = agent.as_impact().map_or(Decimal::ZERO, |i| {
                i.environmental_impact()
                    .saturating_mul(self.params.environmental_tax_rate)
            });

            for (kind, tax) in [
                (LevyKind::LandTax, land_tax),
                (LevyKind::StateEnvironmentalTax, env_tax),
            ] {
                if tax <= Decimal::ZERO {
                    continue;
                }
                let levy = self.levy(&mut **agent, kind, tax);
                levies.push(levy);
            }
        }

        let total = levies
            .iter()
            .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.amount));
        debug!(
            agents = agents.len(),
            collected = %total,
            revenue = %self.tax_revenue,
            "State collected taxes"
        );
        levies
    }

    /// Confiscate every balance above the hyperwealth threshold.
    pub fn oversee_hyperwealth(&mut self, agents: &mut [&mut dyn FiscalSubject]) -> Vec<Levy> {
        let threshold = self.params.hyperwealth_threshold;
        let mut levies = Vec::new();

        for agent in agents.iter_mut() {
            let id = agent.agent_id();
            let kind = agent.agent_kind();
            let Some(billable) = agent.as_billable() else {
                continue;
            };
            let balance = billable.balance();
            if balance <= threshold {
                continue;
            }
            let excess = balance.saturating_sub(threshold);
            billable.set_balance(threshold);
            self.receive_tax_revenue(excess);
            warn!(agent = %id, excess = %excess, "Hyperwealth confiscated");
            levies.push(Levy {
                payer: id,
                payer_kind: kind,
                collector: self.id,
                collector_kind: AgentKind::State,
                kind: LevyKind::Confiscation,
                amount: excess,
                billed: true,
            });
        }

        levies
    }

    /// Split revenue across the budgets and reset it to zero.
    ///
    /// Non-positive revenue is left untouched. Returns the amount
    /// distributed.
    pub fn distribute_funds(&mut self) -> Decimal {
        let revenue = self.tax_revenue;
        if revenue <= Decimal::ZERO {
            warn!(revenue = %revenue, "No tax revenue to distribute");
            return Decimal::ZERO;
        }

        let allocation = self.params.allocation;
        let infrastructure = revenue.saturating_mul(allocation.infrastructure());
        let social = revenue.saturating_mul(allocation.social());
        // Remainder, so the three parts always add up to the revenue.
        let environment = revenue.saturating_sub(infrastructure).saturating_sub(social);

        self.infrastructure_budget = self.infrastructure_budget.saturating_add(infrastructure);
        self.social_budget = self.social_budget.saturating_add(social);
        self.environment_budget = self.environment_budget.saturating_add(environment);
        self.tax_revenue = Decimal::ZERO;

        info!(
            distributed = %revenue,
            infrastructure = %infrastructure,
            social = %social,
            environment = %environment,
            "State distributed funds"
        );
        revenue
    }

    /// Run the three fiscal phases in order.
    pub fn step(&mut self, current_step: u64, agents: &mut [&mut dyn FiscalSubject]) -> Vec<Levy> {
        let mut levies = self.collect_taxes(agents);
        levies.extend(self.oversee_hyperwealth(agents));
        let distributed = self.distribute_funds();
        debug!(
            step = current_step,
            levies = levies.len(),
            distributed = %distributed,
            "State step complete"
        );
        levies
    }

    fn levy(&mut self, agent: &mut dyn FiscalSubject, kind: LevyKind, tax: Decimal) -> Levy {
        let payer = agent.agent_id();
        let payer_kind = agent.agent_kind();
        let (amount, billed) = match agent.as_billable() {
            Some(billable) => (billable.bill(tax), true),
            None => (tax, false),
        };
        self.receive_tax_revenue(amount);
        debug!(agent = %payer, kind = ?kind, amount = %amount, billed, "Tax assessed");
        Levy {
            payer,
            payer_kind,
            collector: self.id,
            collector_kind: AgentKind::State,
            kind,
            amount,
            billed,
        }
    }
}

impl Identified for State {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::State
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
pub(crate) mod tests {
    use rust_decimal_macros::dec;

    use warengeld_types::{Balance, Billable, EnvironmentalImpact, LandHolding};

    use super::*;

    /// Test agent with configurable capabilities.
    pub(crate) struct TestAgent {
        pub id: AgentId,
        pub land: Option<Decimal>,
        pub impact: Option<Decimal>,
        pub balance: Option<Decimal>,
    }

    impl TestAgent {
        pub fn new(land: Option<Decimal>, impact: Option<Decimal>, balance: Option<Decimal>) -> Self {
            Self {
                id: AgentId::new(),
                land,
                impact,
                balance,
            }
        }
    }

    impl LandHolding for TestAgent {
        fn land_area(&self) -> Decimal {
            self.land.unwrap_or(Decimal::ZERO)
        }
    }

    impl EnvironmentalImpact for TestAgent {
        fn environmental_impact(&self) -> Decimal {
            self.impact.unwrap_or(Decimal::ZERO)
        }
    }

    impl Balance for TestAgent {
        fn balance(&self) -> Decimal {
            self.balance.unwrap_or(Decimal::ZERO)
        }

        fn set_balance(&mut self, balance: Decimal) {
            self.balance = Some(balance);
        }
    }

    impl Identified for TestAgent {
        fn agent_id(&self) -> AgentId {
            self.id
        }

        fn agent_kind(&self) -> AgentKind {
            AgentKind::Company
        }
    }

    impl FiscalSubject for TestAgent {
        fn as_land_holding(&self) -> Option<&dyn LandHolding> {
            self.land.map(|_| self as &dyn LandHolding)
        }

        fn as_impact(&self) -> Option<&dyn EnvironmentalImpact> {
            self.impact.map(|_| self as &dyn EnvironmentalImpact)
        }

        fn as_billable(&mut self) -> Option<&mut dyn Billable> {
            if self.balance.is_some() {
                Some(self)
            } else {
                None
            }
        }
    }

    fn state() -> State {
        State::new(TaxParams {
            hyperwealth_threshold: dec!(1000),
            ..TaxParams::default()
        })
    }

    #[test]
    fn taxes_deducted_from_billable_agents() {
        let mut s = state();
        let mut a = TestAgent::new(Some(dec!(100)), Some(dec!(10)), Some(dec!(50)));
        let levies = s.collect_taxes(&mut [&mut a]);

        // 100 * 0.05 + 10 * 0.02
        assert_eq!(s.tax_revenue(), dec!(5.2));
        assert_eq!(a.balance(), dec!(44.8));
        assert_eq!(levies.len(), 2);
        assert!(levies.iter().all(|l| l.billed));
    }

    #[test]
    fn deeply_indebted_agent_is_taxed_without_overflow() {
        let mut s = state();
        let mut a = TestAgent::new(Some(dec!(100)), None, Some(Decimal::MIN));
        let levies = s.collect_taxes(&mut [&mut a]);

        // Nothing can be debited below the minimum, so nothing is collected.
        assert_eq!(levies.len(), 1);
        assert!(levies.iter().all(|l| l.billed && l.amount.is_zero()));
        assert_eq!(a.balance(), Decimal::MIN);
        assert_eq!(s.tax_revenue(), Decimal::ZERO);
    }

    #[test]
    fn agents_without_balance_taxed_on_paper() {
        let mut s = state();
        let mut a = TestAgent::new(Some(dec!(100)), None, None);
        let levies = s.collect_taxes(&mut [&mut a]);

        assert_eq!(s.tax_revenue(), dec!(5));
        assert_eq!(levies.len(), 1);
        assert!(levies.iter().all(|l| !l.billed && l.kind == LevyKind::LandTax));
    }

    #[test]
    fn agents_without_capabilities_are_skipped() {
        let mut s = state();
        let mut a = TestAgent::new(None, None, Some(dec!(50)));
        assert!(s.collect_taxes(&mut [&mut a]).is_empty());
        assert_eq!(a.balance(), dec!(50));
    }

    #[test]
    fn hyperwealth_excess_confiscated() {
        let mut s = state();
        let mut rich = TestAgent::new(None, None, Some(dec!(1500)));
        let mut modest = TestAgent::new(None, None, Some(dec!(1000)));
        let levies = s.oversee_hyperwealth(&mut [&mut rich, &mut modest]);

        assert_eq!(rich.balance(), dec!(1000));
        assert_eq!(modest.balance(), dec!(1000));
        assert_eq!(s.tax_revenue(), dec!(500));
        assert_eq!(levies.len(), 1);
        assert_eq!(levies.first().map(|l| l.kind), Some(LevyKind::Confiscation));
    }

    #[test]
    fn distribution_conserves_revenue() {
        let mut s = state();
        s.receive_tax_revenue(dec!(123.457));
        let before_budgets = s.total_budgets();
        let revenue = s.tax_revenue();

        assert_eq!(s.distribute_funds(), revenue);
        assert_eq!(s.tax_revenue(), Decimal::ZERO);
        assert_eq!(s.total_budgets() - before_budgets, revenue);
    }

    #[test]
    fn distribution_uses_configured_split() {
        let mut s = state();
        s.receive_tax_revenue(dec!(100));
        s.distribute_funds();
        assert_eq!(s.infrastructure_budget(), dec!(50));
        assert_eq!(s.social_budget(), dec!(30));
        assert_eq!(s.environment_budget(), dec!(20));
    }

    #[test]
    fn empty_revenue_is_noop() {
        let mut s = state();
        assert_eq!(s.distribute_funds(), Decimal::ZERO);
        assert_eq!(s.total_budgets(), Decimal::ZERO);
    }

    #[test]
    fn step_runs_all_phases() {
        let mut s = state();
        let mut a = TestAgent::new(Some(dec!(20)), None, Some(dec!(2001)));
        let levies = s.step(1, &mut [&mut a]);

        // Land tax 1, then 1000 above the ceiling.
        assert_eq!(levies.len(), 2);
        assert_eq!(a.balance(), dec!(1000));
        assert_eq!(s.tax_revenue(), Decimal::ZERO);
        assert_eq!(s.total_budgets(), dec!(1001));
    }

    #[test]
    fn estate_adds_to_revenue() {
        let mut s = state();
        let from = AgentId::new();
        let levy = s.receive_estate(from, dec!(40));
        assert!(levy.is_some_and(|l| l.payer == from && l.kind == LevyKind::Estate));
        assert_eq!(s.tax_revenue(), dec!(40));
        assert!(s.receive_estate(from, Decimal::ZERO).is_none());
    }

    #[test]
    fn estate_deficit_reduces_revenue() {
        let mut s = state();
        let from = AgentId::new();
        s.receive_tax_revenue(dec!(10));
        assert_eq!(s.cover_estate_deficit(from, dec!(25)), dec!(25));
        assert_eq!(s.tax_revenue(), dec!(-15));
        assert_eq!(s.cover_estate_deficit(from, dec!(-3)), Decimal::ZERO);
    }
}
