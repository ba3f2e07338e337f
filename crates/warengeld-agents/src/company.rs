//! Employer lifecycle.
//!
//! A [`Company`] sizes its workforce from production capacity, produces and
//! sells goods, pays wages, and goes bankrupt when its sight balance falls
//! below the configured threshold.
//!
//! # Staffing
//!
//! [`Company::adjust_employees`] runs in four phases:
//!
//! 1. Prune employee handles no longer in the registry's pool.
//! 2. Compute `needed = floor(capacity / ratio)`, clamped to
//!    `[0, max_employees]`.
//! 3. Fire the surplus (most recent hires first).
//! 4. Request the shortfall as a job offer. Hiring only happens on the
//!    registry's next matching pass; [`Company::absorb_matches`] then takes
//!    the matched workers on.
//!
//! # Lifecycle
//!
//! `Active -> Bankrupt`. Bankruptcy is terminal: every employee is
//! released and [`CompanyOutcome::Bankrupt`] tells the caller to remove the
//! company. Released workers stay registered.
//!
//! # Growth
//!
//! Part of any balance above the R&D trigger is spent on research each
//! step. Once accumulated research reaches the innovation threshold,
//! capacity rises by the bonus rate and the research stock decays.
//!
//! A balance at the growth trigger starts the growth phase. After
//! `growth_threshold` steps in it, [`Company::split_company`] founds a
//! spinoff of the next generation that takes `split_ratio` of the
//! balance along.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warengeld_types::{
    AgentId, AgentKind, Balance, Billable, CompanyStatus, EnvironmentalImpact, FiscalSubject,
    Identified, LandHolding,
};

use crate::config::CompanyParams;
use crate::labor_market::{Registry, WorkerMatch};
use crate::worker::Workforce;

/// Result of a company step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyOutcome {
    /// The company keeps operating.
    Continue,
    /// The company is bankrupt and must be removed.
    Bankrupt,
}

/// A wage owed to one worker this step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagePayment {
    /// The paying company.
    pub company: AgentId,
    /// The paid worker.
    pub worker: AgentId,
    /// Amount debited from the company's sight balance.
    pub amount: Decimal,
}

/// What [`Company::adjust_employees`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffingChange {
    /// Stale handles dropped.
    pub pruned: Vec<AgentId>,
    /// Workers fired.
    pub fired: Vec<AgentId>,
    /// Positions requested from the registry.
    pub requested: usize,
}

/// Initial values for a new company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanySeed {
    /// Maximum production per step at full staffing.
    pub production_capacity: Decimal,
    /// Headcount ceiling.
    pub max_employees: usize,
    /// Land occupied, for land tax.
    pub land_area: Decimal,
    /// Environmental impact, for environmental tax and audits.
    pub environmental_impact: Decimal,
    /// Starting sight balance.
    pub sight_balance: Decimal,
}

/// An employer.
#[derive(Debug, Clone)]
pub struct Company {
    id: AgentId,
    params: CompanyParams,
    status: CompanyStatus,
    production_capacity: Decimal,
    max_employees: usize,
    employees: Vec<AgentId>,
    pending_hires: usize,
    sight_balance: Decimal,
    inventory: Decimal,
    land_area: Decimal,
    environmental_impact: Decimal,
    generation: u32,
    growth_phase: bool,
    growth_counter: u32,
    rd_investment: Decimal,
    innovation_index: u32,
}

impl Company {
    /// Create an active company with no employees.
    pub fn new(params: CompanyParams, seed: &CompanySeed) -> Self {
        Self {
            id: AgentId::new(),
            params,
            status: CompanyStatus::Active,
            production_capacity: seed.production_capacity,
            max_employees: seed.max_employees,
            employees: Vec::new(),
            pending_hires: 0,
            sight_balance: seed.sight_balance,
            inventory: Decimal::ZERO,
            land_area: seed.land_area,
            environmental_impact: seed.environmental_impact,
            generation: 0,
            growth_phase: false,
            growth_counter: 0,
            rd_investment: Decimal::ZERO,
            innovation_index: 0,
        }
    }

    /// The company's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Lifecycle state.
    pub const fn status(&self) -> CompanyStatus {
        self.status
    }

    /// Current employees, in hiring order.
    pub fn employees(&self) -> &[AgentId] {
        &self.employees
    }

    /// Positions requested from the registry and not yet matched.
    pub const fn pending_hires(&self) -> usize {
        self.pending_hires
    }

    /// Immediately available cash. May be negative.
    pub const fn sight_balance(&self) -> Decimal {
        self.sight_balance
    }

    /// Unsold goods.
    pub const fn inventory(&self) -> Decimal {
        self.inventory
    }

    /// Production capacity.
    pub const fn production_capacity(&self) -> Decimal {
        self.production_capacity
    }

    /// Headcount ceiling.
    pub const fn max_employees(&self) -> usize {
        self.max_employees
    }

    /// Generation, starting at 0; spinoffs are one above their parent.
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether the company is in its growth phase.
    pub const fn growth_phase(&self) -> bool {
        self.growth_phase
    }

    /// Research spending not yet turned into an innovation.
    pub const fn rd_investment(&self) -> Decimal {
        self.rd_investment
    }

    /// Innovations so far.
    pub const fn innovation_index(&self) -> u32 {
        self.innovation_index
    }

    /// Headcount the current capacity calls for.
    ///
    /// Zero or negative capacity, or a non-positive ratio, needs nobody.
    pub fn needed_employees(&self) -> usize {
        let ratio = self.params.employee_capacity_ratio;
        if self.production_capacity <= Decimal::ZERO || ratio <= Decimal::ZERO {
            return 0;
        }
        self.production_capacity
            .checked_div(ratio)
            .map_or(usize::MAX, |n| n.floor().to_usize().unwrap_or(usize::MAX))
            .min(self.max_employees)
    }

    /// Reconcile the headcount with the production target.
    pub fn adjust_employees(
        &mut self,
        registry: &mut Registry,
        workforce: &mut Workforce,
    ) -> StaffingChange {
        let mut change = StaffingChange::default();

        // Phase 1: drop handles the registry no longer knows.
        let (kept, stale): (Vec<AgentId>, Vec<AgentId>) = self
            .employees
            .iter()
            .copied()
            .partition(|id| registry.is_registered(*id) && workforce.contains(*id));
        if !stale.is_empty() {
            for id in &stale {
                workforce.release(*id);
            }
            warn!(
                company = %self.id,
                pruned = stale.len(),
                "Pruned stale employee references"
            );
        }
        self.employees = kept;
        change.pruned = stale;

        // Phase 2: target.
        let needed = self.needed_employees();
        let current = self.employees.len();

        // Phase 3: fire surplus, most recent hires first.
        if current > needed {
            let fired = self.employees.split_off(needed);
            for id in &fired {
                workforce.release(*id);
            }
            self.pending_hires = 0;
            info!(
                company = %self.id,
                fired = fired.len(),
                remaining = self.employees.len(),
                "Company fired employees"
            );
            change.fired = fired;
        }
        // Phase 4: request the shortfall.
        else if needed > current {
            let shortfall = needed.saturating_sub(current);
            let wage = registry.default_wage().unwrap_or(self.params.base_wage);
            self.pending_hires = shortfall;
            registry.register_job_offer(self.id, wage, shortfall);
            debug!(
                company = %self.id,
                positions = shortfall,
                wage = %wage,
                "Company requested workers"
            );
            change.requested = shortfall;
        }

        change
    }

    /// Take on workers matched to this company.
    ///
    /// Matches beyond the headcount ceiling are released again. Resets
    /// `pending_hires`.
    pub fn absorb_matches(&mut self, matches: &[WorkerMatch], workforce: &mut Workforce) -> usize {
        let mut hired: usize = 0;
        for m in matches.iter().filter(|m| m.employer == self.id) {
            if self.employees.len() < self.max_employees && !self.employees.contains(&m.worker) {
                self.employees.push(m.worker);
                hired = hired.saturating_add(1);
            } else {
                workforce.release(m.worker);
            }
        }
        self.pending_hires = 0;
        if hired > 0 {
            info!(
                company = %self.id,
                hired,
                employees = self.employees.len(),
                "Company hired employees"
            );
        }
        hired
    }

    /// Spend part of the balance above the R&D trigger on research.
    ///
    /// Returns the amount spent, which leaves the economy.
    pub fn invest_in_rd(&mut self) -> Decimal {
        let excess = self
            .sight_balance
            .saturating_sub(self.params.rd_investment_trigger);
        if excess <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let investment = excess.saturating_mul(self.params.rd_investment_rate);
        if investment <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.sight_balance = self.sight_balance.saturating_sub(investment);
        self.rd_investment = self.rd_investment.saturating_add(investment);
        debug!(
            company = %self.id,
            invested = %investment,
            rd_total = %self.rd_investment,
            "Company invested in R&D"
        );
        investment
    }

    /// Turn accumulated research into capacity once it reaches the
    /// innovation threshold. Returns `true` when an innovation landed.
    pub fn innovate(&mut self) -> bool {
        let threshold = self.params.innovation_threshold;
        if threshold <= Decimal::ZERO || self.rd_investment < threshold {
            return false;
        }
        let bonus = self
            .production_capacity
            .saturating_mul(self.params.innovation_bonus_rate);
        self.production_capacity = self.production_capacity.saturating_add(bonus);
        self.innovation_index = self.innovation_index.saturating_add(1);
        self.rd_investment = self.rd_investment.saturating_mul(self.params.rd_decay_factor);
        info!(
            company = %self.id,
            bonus = %bonus,
            capacity = %self.production_capacity,
            innovations = self.innovation_index,
            "Company innovated"
        );
        true
    }

    /// Produce goods in proportion to staffing. Returns units produced.
    pub fn produce(&mut self) -> Decimal {
        if self.max_employees == 0 {
            return Decimal::ZERO;
        }
        let staffing = Decimal::from(self.employees.len())
            .checked_div(Decimal::from(self.max_employees))
            .unwrap_or(Decimal::ZERO);
        let produced = self.production_capacity.saturating_mul(staffing);
        self.inventory = self.inventory.saturating_add(produced);
        debug!(
            company = %self.id,
            produced = %produced,
            inventory = %self.inventory,
            "Company produced goods"
        );
        produced
    }

    /// Sell up to `demand` units (configured default when `None`) at the
    /// base price. Returns revenue, which enters from outside the economy.
    pub fn sell_goods(&mut self, demand: Option<Decimal>) -> Decimal {
        let demand = demand
            .unwrap_or(self.params.demand_default)
            .max(Decimal::ZERO);
        let sold = self.inventory.min(demand);
        if sold <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let revenue = sold.saturating_mul(self.params.production_base_price);
        self.inventory = self.inventory.saturating_sub(sold);
        self.sight_balance = self.sight_balance.saturating_add(revenue);
        debug!(
            company = %self.id,
            sold = %sold,
            revenue = %revenue,
            balance = %self.sight_balance,
            "Company sold goods"
        );
        revenue
    }

    /// Debit each employee's wage and return the payments owed.
    pub fn pay_wages(&mut self, workforce: &Workforce) -> Vec<WagePayment> {
        let mut payments = Vec::new();
        for id in &self.employees {
            let Some(wage) = workforce
                .get(*id)
                .filter(|w| w.is_employed())
                .and_then(crate::worker::Worker::current_wage)
            else {
                continue;
            };
            if wage <= Decimal::ZERO {
                continue;
            }
            self.sight_balance = self.sight_balance.saturating_sub(wage);
            payments.push(WagePayment {
                company: self.id,
                worker: *id,
                amount: wage,
            });
        }
        if !payments.is_empty() {
            debug!(
                company = %self.id,
                paid = payments.len(),
                balance = %self.sight_balance,
                "Company paid wages"
            );
        }
        payments
    }

    /// Enter the growth phase at the balance trigger and count the steps
    /// spent in it. Returns `true` once the company is due to split.
    pub fn update_growth_state(&mut self) -> bool {
        if self.status == CompanyStatus::Bankrupt {
            return false;
        }
        if !self.growth_phase && self.sight_balance >= self.params.growth_balance_trigger {
            self.growth_phase = true;
            info!(company = %self.id, balance = %self.sight_balance, "Company entered growth phase");
        }
        if self.growth_phase {
            self.growth_counter = self.growth_counter.saturating_add(1);
        }
        self.growth_phase && self.growth_counter >= self.params.growth_threshold
    }

    /// Found a spinoff that takes `split_ratio` of the sight balance, and
    /// end the growth phase.
    ///
    /// The spinoff copies capacity, headcount ceiling, land, and impact,
    /// starts without employees, and belongs to the next generation.
    pub fn split_company(&mut self) -> Self {
        let share = self.sight_balance.saturating_mul(self.params.split_ratio);
        self.sight_balance = self.sight_balance.saturating_sub(share);
        self.growth_phase = false;
        self.growth_counter = 0;

        let mut spinoff = Self::new(
            self.params.clone(),
            &CompanySeed {
                production_capacity: self.production_capacity,
                max_employees: self.max_employees,
                land_area: self.land_area,
                environmental_impact: self.environmental_impact,
                sight_balance: share,
            },
        );
        spinoff.generation = self.generation.saturating_add(1);
        info!(
            company = %self.id,
            spinoff = %spinoff.id,
            generation = spinoff.generation,
            balance = %share,
            "Company split"
        );
        spinoff
    }

    /// Whether the sight balance is below the bankruptcy threshold.
    pub fn check_bankruptcy(&self) -> bool {
        self.sight_balance < self.params.bankruptcy_threshold
    }

    /// Evaluate solvency.
    ///
    /// On bankruptcy every employee is released and the company signals
    /// [`CompanyOutcome::Bankrupt`].
    pub fn step(&mut self, current_step: u64, workforce: &mut Workforce) -> CompanyOutcome {
        if self.status == CompanyStatus::Bankrupt {
            return CompanyOutcome::Bankrupt;
        }
        if !self.check_bankruptcy() {
            return CompanyOutcome::Continue;
        }

        let released = std::mem::take(&mut self.employees);
        for id in &released {
            workforce.release(*id);
        }
        self.pending_hires = 0;
        self.status = CompanyStatus::Bankrupt;
        warn!(
            step = current_step,
            company = %self.id,
            balance = %self.sight_balance,
            released = released.len(),
            "Company declared bankrupt"
        );
        CompanyOutcome::Bankrupt
    }
}

impl Identified for Company {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::Company
    }
}

impl Balance for Company {
    fn balance(&self) -> Decimal {
        self.sight_balance
    }

    fn set_balance(&mut self, balance: Decimal) {
        self.sight_balance = balance;
    }
}

impl LandHolding for Company {
    fn land_area(&self) -> Decimal {
        self.land_area
    }
}

impl EnvironmentalImpact for Company {
    fn environmental_impact(&self) -> Decimal {
        self.environmental_impact
    }
}

impl FiscalSubject for Company {
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
