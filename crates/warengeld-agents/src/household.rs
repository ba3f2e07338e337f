//! Households: consumers, savers, and workers.
//!
//! A [`Household`] owns its money. Per-step financial decisions go
//! through the [`FinancialManager`] view returned by
//! [`Household::finances`]; lifecycle (aging, growth phase, splitting,
//! succession) is handled here.
//!
//! A household reaching `max_age` is either succeeded by an heir (a new
//! identity that inherits its cash) or, in the last generation, exits.
//!
//! # Growth
//!
//! Savings at the trigger start the growth phase. While growing, the
//! household consumes at the higher growth rate and pays for raising a
//! child. After `growth_threshold` steps the child splits off as a new
//! household of the next generation, funded from the parent's savings.
//! A household born past `max_generation` stagnates and leaves unless it
//! is itself growing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use warengeld_types::{
    AgentId, AgentKind, Balance, Billable, EnvironmentalImpact, FiscalSubject, Identified,
    LandHolding,
};

use crate::config::HouseholdParams;
use crate::financial_manager::{FinancialManager, FinancialRecord};

/// Initial values for a new household.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdSeed {
    /// Reference income.
    pub income: Decimal,
    /// Land occupied, for land tax.
    pub land_area: Decimal,
    /// Environmental impact, for environmental tax and audits.
    pub environmental_impact: Decimal,
    /// Starting cash.
    pub checking_account: Decimal,
}

/// Where a household stands in its life cycle after aging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeStage {
    /// Still within its lifespan.
    Active,
    /// Reached the end of its lifespan; an heir takes over.
    Succession,
    /// Reached the end of its lifespan in the last generation.
    Exit,
}

/// A household.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    id: AgentId,
    /// Reference income, credited when income arrives without an amount.
    pub income: Decimal,
    /// Immediately available cash. May be negative.
    pub checking_account: Decimal,
    /// Savings kept outside a bank.
    pub local_savings: Decimal,
    /// Whether the household is raising a child.
    pub growth_phase: bool,
    /// Steps spent in the current growth phase.
    pub growth_counter: u32,
    /// Whether the current child's cost has been met.
    pub child_cost_covered: bool,
    /// Cumulative amount withdrawn toward the current child's cost.
    pub child_cost_paid: Decimal,
    /// Cost of raising one child.
    pub child_rearing_cost: Decimal,
    /// Fraction of cash offered for loan repayment.
    pub loan_repayment_rate: Decimal,
    /// Fraction of cash consumed each step.
    pub consumption_rate: Decimal,
    /// Fraction of cash consumed each step while growing.
    pub growth_consumption_rate: Decimal,
    /// Land occupied.
    pub land_area: Decimal,
    /// Environmental impact.
    pub environmental_impact: Decimal,
    /// Age in steps.
    pub age: u32,
    /// Generation, starting at 0.
    pub generation: u32,
    pub(crate) history: Vec<FinancialRecord>,
}

impl Household {
    /// Create a first-generation household.
    pub fn new(params: &HouseholdParams, seed: &HouseholdSeed) -> Self {
        Self {
            id: AgentId::new(),
            income: seed.income,
            checking_account: seed.checking_account,
            local_savings: Decimal::ZERO,
            growth_phase: false,
            growth_counter: 0,
            child_cost_covered: false,
            child_cost_paid: Decimal::ZERO,
            child_rearing_cost: params.child_rearing_cost,
            loan_repayment_rate: params.loan_repayment_rate,
            consumption_rate: params.consumption_rate,
            growth_consumption_rate: params.growth_consumption_rate,
            land_area: seed.land_area,
            environmental_impact: seed.environmental_impact,
            age: 0,
            generation: 0,
            history: Vec::new(),
        }
    }

    /// The household's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Financial operations on this household.
    pub const fn finances(&mut self) -> FinancialManager<'_> {
        FinancialManager::new(self)
    }

    /// Checking account plus local savings.
    pub fn cash(&self) -> Decimal {
        self.checking_account.saturating_add(self.local_savings)
    }

    /// Advance age by one step.
    pub const fn age_one_step(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Whether the household has reached `max_age`.
    pub const fn is_exhausted(&self, max_age: u32) -> bool {
        self.age >= max_age
    }

    /// Consumption rate for this step.
    pub const fn current_consumption_rate(&self) -> Decimal {
        if self.growth_phase {
            self.growth_consumption_rate
        } else {
            self.consumption_rate
        }
    }

    /// Classify the household after aging.
    pub const fn life_stage(&self, params: &HouseholdParams) -> LifeStage {
        if self.generation > params.max_generation && !self.growth_phase {
            LifeStage::Exit
        } else if !self.is_exhausted(params.max_age) {
            LifeStage::Active
        } else if self.generation < params.max_generation {
            LifeStage::Succession
        } else {
            LifeStage::Exit
        }
    }

    /// Count a step of the growth phase, or enter it once total savings
    /// reach the trigger.
    ///
    /// `bank_savings` is what a bank holds for this household. Returns
    /// `true` when the household entered the growth phase on this call.
    pub fn update_growth_state(&mut self, bank_savings: Decimal, trigger: Decimal) -> bool {
        if self.growth_phase {
            self.growth_counter = self.growth_counter.saturating_add(1);
            return false;
        }
        let total = self.local_savings.saturating_add(bank_savings);
        if total < trigger {
            return false;
        }
        self.growth_phase = true;
        self.growth_counter = 0;
        self.child_cost_covered = false;
        self.child_cost_paid = Decimal::ZERO;
        info!(household = %self.id, savings = %total, "Household entered growth phase");
        true
    }

    /// Whether the growth phase has lasted long enough for a split.
    pub const fn ready_to_split(&self, growth_threshold: u32) -> bool {
        self.growth_phase && self.growth_counter >= growth_threshold
    }

    /// Found a child household with `endowment` as its opening checking
    /// balance and end this household's growth phase.
    ///
    /// The child has a new identity, the next generation, and the
    /// parent's income, land, impact, and rates. The caller moves the
    /// endowment out of the parent's savings first.
    pub fn spawn_child(&mut self, endowment: Decimal) -> Self {
        let child = Self {
            id: AgentId::new(),
            checking_account: endowment,
            local_savings: Decimal::ZERO,
            growth_phase: false,
            growth_counter: 0,
            child_cost_covered: false,
            child_cost_paid: Decimal::ZERO,
            age: 0,
            generation: self.generation.saturating_add(1),
            history: Vec::new(),
            ..self.clone()
        };
        self.growth_phase = false;
        self.growth_counter = 0;
        self.child_cost_covered = false;
        self.child_cost_paid = Decimal::ZERO;
        info!(
            parent = %self.id,
            child = %child.id,
            generation = child.generation,
            endowment = %endowment,
            "Household split"
        );
        child
    }

    /// Hand the household over to an heir.
    ///
    /// The heir gets a new identity and the next generation, inherits all
    /// cash, and starts at age 0 outside the growth phase.
    pub fn into_successor(self) -> Self {
        let heir = Self {
            id: AgentId::new(),
            growth_phase: false,
            growth_counter: 0,
            child_cost_covered: false,
            child_cost_paid: Decimal::ZERO,
            age: 0,
            generation: self.generation.saturating_add(1),
            history: Vec::new(),
            ..self
        };
        info!(
            predecessor = %self.id,
            heir = %heir.id,
            generation = heir.generation,
            inherited = %heir.cash(),
            "Household succeeded by heir"
        );
        heir
    }

    /// Remove and return all cash, leaving both accounts at zero.
    pub fn take_estate(&mut self) -> Decimal {
        let estate = self.cash();
        self.checking_account = Decimal::ZERO;
        self.local_savings = Decimal::ZERO;
        estate
    }
}

impl Identified for Household {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::Household
    }
}

impl Balance for Household {
    fn balance(&self) -> Decimal {
        self.checking_account
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.checking_account = balance;
    }
}

impl LandHolding for Household {
    fn land_area(&self) -> Decimal {
        self.land_area
    }
}

impl EnvironmentalImpact for Household {
    fn environmental_impact(&self) -> Decimal {
        self.environmental_impact
    }
}

impl FiscalSubject for Household {
    fn as_land_holding(&self) -> Option<&dyn LandHolding> {
        Some(self)
    }

    fn as_impact(&self) -> Option<&dyn EnvironmentalImpact> {
        Some(self)
    }

    fn as_billable(&mut self) -> Option<&mut dyn Billable> {
        Some(self)
    }
}
