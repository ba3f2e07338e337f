//! The mutable economy passed through the tick cycle.
//!
//! [`Economy`] bundles every agent, the worker table, and the ledger. It is
//! built from a [`SimulationConfig`] with [`Economy::from_config`], or empty
//! with [`Economy::new`] and populated through [`Economy::add_household`]
//! and [`Economy::add_company`].
//!
//! The money supply is everything agents hold: household cash, employer
//! sight balances, the state's revenue and budgets, the agency's retained
//! tax and penalties, and the bank's liquidity. Savings claims on the bank
//! are not counted separately; deposited money is already in its liquidity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use warengeld_agents::{
    AgentError, Company, CompanyParams, CompanySeed, FinancialSummary, Household, HouseholdParams,
    HouseholdSeed, Registry, SavingsBank, Sparkasse, Worker, Workforce,
};
use warengeld_fiscal::{EnvironmentalAgency, RecyclingCompany, State};
use warengeld_ledger::Ledger;
use warengeld_types::{AgentId, AgentKind, FlowKind, Party};

use crate::config::{ConfigError, SimulationConfig};

/// The whole simulated economy.
#[derive(Debug)]
pub struct Economy {
    /// The labor market. Required while any employer is active.
    pub registry: Option<Registry>,
    /// The authoritative worker table.
    pub workforce: Workforce,
    /// Active employers.
    pub companies: Vec<Company>,
    /// Bankrupt employers. Their balances stay on the books.
    pub closed_companies: Vec<Company>,
    /// Living households.
    pub households: Vec<Household>,
    /// The state treasury.
    pub state: State,
    /// The environmental agency, which owns the recycler.
    pub agency: EnvironmentalAgency,
    /// The savings bank, if the economy has one.
    pub bank: Option<Sparkasse>,
    /// Every money movement so far.
    pub ledger: Ledger,
    /// Last completed tick; 0 before the first.
    pub tick: u64,
    /// Household parameters, consulted each tick.
    pub household_params: HouseholdParams,
    /// Parameters for employers created later.
    pub company_params: CompanyParams,
}

impl Economy {
    /// Create an empty economy around the given collaborators.
    ///
    /// The agency is attached to `state`.
    pub fn new(
        registry: Option<Registry>,
        state: State,
        mut agency: EnvironmentalAgency,
        bank: Option<Sparkasse>,
        household_params: HouseholdParams,
        company_params: CompanyParams,
    ) -> Self {
        agency.attach_state(&state);
        Self {
            registry,
            workforce: Workforce::new(),
            companies: Vec::new(),
            closed_companies: Vec::new(),
            households: Vec::new(),
            state,
            agency,
            bank,
            ledger: Ledger::new(),
            tick: 0,
            household_params,
            company_params,
        }
    }

    /// Build and populate an economy from configuration.
    ///
    /// Initial loans are granted only while the bank has the liquidity;
    /// refused requests are logged by the bank and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let invalid_environment = |e: warengeld_fiscal::FiscalError| ConfigError::Invalid {
            field: "environment",
            reason: e.to_string(),
        };
        let mut agency =
            EnvironmentalAgency::new(config.environment_params()).map_err(invalid_environment)?;
        let recycler = RecyclingCompany::new(config.environment.recycling_efficiency)
            .map_err(invalid_environment)?;
        agency.attach_recycler(recycler);

        let bank = config
            .savings_bank
            .enabled
            .then(|| Sparkasse::new(&config.bank_params()));

        let mut economy = Self::new(
            Some(Registry::new(&config.labor_params())),
            State::new(config.tax_params()?),
            agency,
            bank,
            config.household_params(),
            config.company_params(),
        );

        for cohort in &config.population.households {
            let seed = HouseholdSeed {
                income: cohort.income,
                land_area: cohort.land_area,
                environmental_impact: cohort.environmental_impact,
                checking_account: cohort.checking_account,
            };
            for _ in 0..cohort.count {
                let id = economy.add_household(&seed);
                if cohort.initial_loan > Decimal::ZERO && economy.bank.is_some() {
                    economy
                        .extend_credit(id, cohort.initial_loan)
                        .map_err(|e| ConfigError::Invalid {
                            field: "population.households.initial_loan",
                            reason: e.to_string(),
                        })?;
                }
            }
        }

        for cohort in &config.population.companies {
            let seed = CompanySeed {
                production_capacity: cohort.production_capacity,
                max_employees: cohort.max_employees,
                land_area: cohort.land_area,
                environmental_impact: cohort.environmental_impact,
                sight_balance: cohort.sight_balance,
            };
            for _ in 0..cohort.count {
                economy.add_company(&seed);
            }
        }

        info!(
            households = economy.households.len(),
            companies = economy.companies.len(),
            bank = economy.bank.is_some(),
            money_supply = %economy.money_supply(),
            "Economy seeded"
        );
        Ok(economy)
    }

    /// Add a household, enroll it as a worker, and register it with the
    /// labor market.
    pub fn add_household(&mut self, seed: &HouseholdSeed) -> AgentId {
        let household = Household::new(&self.household_params, seed);
        let id = household.id();
        self.workforce.enroll(id);
        if let Some(registry) = self.registry.as_mut() {
            registry.register_worker(id);
        }
        self.households.push(household);
        id
    }

    /// Add an employer.
    pub fn add_company(&mut self, seed: &CompanySeed) -> AgentId {
        let company = Company::new(self.company_params.clone(), seed);
        let id = company.id();
        self.companies.push(company);
        id
    }

    /// Lend `amount` from the bank to a household's checking account.
    ///
    /// Returns the amount lent, zero when the bank lacks liquidity.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MissingCollaborator`] without a bank, or
    /// [`AgentError::HouseholdNotFound`] for an unknown household.
    pub fn extend_credit(&mut self, household: AgentId, amount: Decimal) -> Result<Decimal, AgentError> {
        let bank = self.bank.as_mut().ok_or(AgentError::MissingCollaborator {
            operation: "extend_credit",
            collaborator: "savings bank",
        })?;
        let borrower = self
            .households
            .iter_mut()
            .find(|h| h.id() == household)
            .ok_or(AgentError::HouseholdNotFound(household))?;

        let lent = bank.allocate_credit(household, amount);
        if lent > Decimal::ZERO {
            borrower.checking_account = borrower.checking_account.saturating_add(lent);
            let bank_party = Party::new(bank.id(), AgentKind::SavingsBank);
            let household_party = Party::new(household, AgentKind::Household);
            if let Err(e) =
                self.ledger
                    .record_internal(self.tick, FlowKind::Credit, lent, bank_party, household_party)
            {
                warn!(household = %household, error = %e, "Credit not booked");
            }
        }
        Ok(lent)
    }

    /// Look up a household.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::HouseholdNotFound`] for an unknown id.
    pub fn household(&self, id: AgentId) -> Result<&Household, AgentError> {
        self.households
            .iter()
            .find(|h| h.id() == id)
            .ok_or(AgentError::HouseholdNotFound(id))
    }

    /// Look up a household for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::HouseholdNotFound`] for an unknown id.
    pub fn household_mut(&mut self, id: AgentId) -> Result<&mut Household, AgentError> {
        self.households
            .iter_mut()
            .find(|h| h.id() == id)
            .ok_or(AgentError::HouseholdNotFound(id))
    }

    /// Look up a worker.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::WorkerNotFound`] for an id outside the
    /// workforce.
    pub fn worker(&self, id: AgentId) -> Result<&Worker, AgentError> {
        self.workforce.get(id).ok_or(AgentError::WorkerNotFound(id))
    }

    /// All money held inside the economy.
    pub fn money_supply(&self) -> Decimal {
        let households = self
            .households
            .iter()
            .fold(Decimal::ZERO, |acc, h| acc.saturating_add(h.cash()));
        let companies = self
            .companies
            .iter()
            .chain(&self.closed_companies)
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.sight_balance()));
        let bank = self.bank.as_ref().map_or(Decimal::ZERO, Sparkasse::liquidity);

        households
            .saturating_add(companies)
            .saturating_add(self.state.holdings())
            .saturating_add(self.agency.holdings())
            .saturating_add(bank)
    }

    /// A serializable view of the economy.
    pub fn snapshot(&self) -> EconomySnapshot {
        let bank = self.bank.as_ref();
        let households = self
            .households
            .iter()
            .map(|h| {
                let id = h.id();
                FinancialSummary {
                    household: id,
                    checking_account: h.checking_account,
                    local_savings: h.local_savings,
                    bank_savings: bank.map_or(Decimal::ZERO, |b| b.savings_of(id)),
                    outstanding_loan: bank.map_or(Decimal::ZERO, |b| b.outstanding_loan(id)),
                    growth_phase: h.growth_phase,
                }
            })
            .collect();

        EconomySnapshot {
            tick: self.tick,
            money_supply: self.money_supply(),
            active_companies: self.companies.len(),
            closed_companies: self.closed_companies.len(),
            employed_workers: self.workforce.employed_count(),
            workers: self.workforce.len(),
            state: StateSnapshot {
                tax_revenue: self.state.tax_revenue(),
                infrastructure_budget: self.state.infrastructure_budget(),
                social_budget: self.state.social_budget(),
                environment_budget: self.state.environment_budget(),
            },
            agency: AgencySnapshot {
                collected_env_tax: self.agency.collected_env_tax(),
                transferred_to_state: self.agency.env_tax_transferred_to_state(),
                collected_penalties: self.agency.collected_penalties(),
                recycled_materials: self
                    .agency
                    .recycler()
                    .map_or(Decimal::ZERO, RecyclingCompany::report_materials),
            },
            bank: bank.map(|b| BankSnapshot {
                liquidity: b.liquidity(),
                total_savings: b.total_savings(),
                total_loans: b.total_loans(),
            }),
            ledger_entries: self.ledger.len(),
            households,
        }
    }
}

/// Serializable end-of-run view of an [`Economy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Last completed tick.
    pub tick: u64,
    /// All money held inside the economy.
    pub money_supply: Decimal,
    /// Employers still trading.
    pub active_companies: usize,
    /// Bankrupt employers.
    pub closed_companies: usize,
    /// Workers currently employed.
    pub employed_workers: usize,
    /// Workers in the table.
    pub workers: usize,
    /// Treasury accounts.
    pub state: StateSnapshot,
    /// Agency accumulators.
    pub agency: AgencySnapshot,
    /// Bank totals, if the economy has a bank.
    pub bank: Option<BankSnapshot>,
    /// Ledger length.
    pub ledger_entries: usize,
    /// Per-household finances.
    pub households: Vec<FinancialSummary>,
}

/// Treasury accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Undistributed revenue.
    pub tax_revenue: Decimal,
    /// Infrastructure budget.
    pub infrastructure_budget: Decimal,
    /// Social budget.
    pub social_budget: Decimal,
    /// Environment budget.
    pub environment_budget: Decimal,
}

/// Agency accumulators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencySnapshot {
    /// Environmental tax collected, cumulative.
    pub collected_env_tax: Decimal,
    /// Environmental tax forwarded to the state, cumulative.
    pub transferred_to_state: Decimal,
    /// Audit penalties collected, cumulative.
    pub collected_penalties: Decimal,
    /// Materials produced by the recycler.
    pub recycled_materials: Decimal,
}

/// Bank totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSnapshot {
    /// Money the bank holds.
    pub liquidity: Decimal,
    /// Savings owed to account holders.
    pub total_savings: Decimal,
    /// Outstanding loan principal.
    pub total_loans: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn config(yaml: &str) -> SimulationConfig {
        SimulationConfig::parse(yaml).unwrap()
    }

    #[test]
    fn seeds_population_from_config() {
        let economy = Economy::from_config(&SimulationConfig::default()).unwrap();
        assert_eq!(economy.households.len(), 20);
        assert_eq!(economy.companies.len(), 2);
        assert_eq!(economy.workforce.len(), 20);
        let registry = economy.registry.as_ref().unwrap();
        assert_eq!(registry.registered_workers().len(), 20);
        assert!(economy.bank.is_some());
        assert!(economy.agency.recycler().is_some());
        // 20 households × 100 + 2 companies × 1000.
        assert_eq!(economy.money_supply(), dec!(4000));
    }

    #[test]
    fn initial_loans_bounded_by_liquidity() {
        let economy = Economy::from_config(&config(
            r"
savings_bank:
  initial_liquidity: 50
population:
  households:
    - count: 2
      checking_account: 10
      initial_loan: 30
  companies: []
",
        ))
        .unwrap();

        let bank = economy.bank.as_ref().unwrap();
        assert_eq!(bank.total_loans(), dec!(30));
        assert_eq!(bank.liquidity(), dec!(20));
        let cash: Vec<Decimal> = economy.households.iter().map(Household::cash).collect();
        assert_eq!(cash, vec![dec!(40), dec!(10)]);
        assert_eq!(economy.ledger.total_for_flow(FlowKind::Credit), dec!(30));
        // Lending moves money inside the economy.
        assert_eq!(economy.money_supply(), dec!(70));
    }

    #[test]
    fn credit_requires_a_bank() {
        let mut economy = Economy::from_config(&config(
            "savings_bank:\n  enabled: false\npopulation:\n  companies: []\n",
        ))
        .unwrap();
        let id = economy.households.first().unwrap().id();
        let result = economy.extend_credit(id, dec!(5));
        assert!(matches!(
            result,
            Err(AgentError::MissingCollaborator { collaborator: "savings bank", .. })
        ));
    }

    #[test]
    fn unknown_agents_are_errors() {
        let mut economy = Economy::from_config(&SimulationConfig::default()).unwrap();
        let stranger = AgentId::new();
        assert!(matches!(
            economy.household(stranger),
            Err(AgentError::HouseholdNotFound(id)) if id == stranger
        ));
        assert!(economy.household_mut(stranger).is_err());
        assert!(matches!(
            economy.worker(stranger),
            Err(AgentError::WorkerNotFound(_))
        ));
        assert!(matches!(
            economy.extend_credit(stranger, dec!(1)),
            Err(AgentError::HouseholdNotFound(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Economy::from_config(&config("environment:\n  env_tax_state_share: 3\n"));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn snapshot_serializes() {
        let economy = Economy::from_config(&SimulationConfig::default()).unwrap();
        let snapshot = economy.snapshot();
        assert_eq!(snapshot.households.len(), 20);
        assert_eq!(snapshot.money_supply, dec!(4000));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: EconomySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
