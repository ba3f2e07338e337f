//! Configuration loading and typed config structures for the Warengeld
//! simulation.
//!
//! The canonical configuration lives in `warengeld-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, a loader, and conversions into the parameter structs the
//! agent and fiscal crates take at construction. No crate reads
//! configuration from process-wide state.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use warengeld_agents::{BankParams, CompanyParams, HealthThresholds, HouseholdParams, LaborParams};
use warengeld_fiscal::{EnvironmentParams, TaxAllocation, TaxParams};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its valid range.
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `warengeld-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Run length and logging.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Labor market settings.
    #[serde(default)]
    pub labor: LaborConfig,

    /// Employer settings.
    #[serde(default)]
    pub company: CompanyConfig,

    /// Household settings.
    #[serde(default)]
    pub household: HouseholdConfig,

    /// State tax policy.
    #[serde(default)]
    pub tax: TaxConfig,

    /// Environmental agency and recycling.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Savings bank settings.
    #[serde(default)]
    pub savings_bank: SavingsBankConfig,

    /// Initial population.
    #[serde(default)]
    pub population: PopulationConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check value ranges that YAML typing alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labor.employee_capacity_ratio <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "labor.employee_capacity_ratio",
                reason: format!(
                    "must be positive, got {}",
                    self.labor.employee_capacity_ratio
                ),
            });
        }
        for (field, rate) in [
            ("tax.land_tax_rate", self.tax.land_tax_rate),
            ("tax.environmental_tax_rate", self.tax.environmental_tax_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be within [0, 1], got {rate}"),
                });
            }
        }
        self.household_params()
            .validate()
            .map_err(|e| ConfigError::Invalid {
                field: "household",
                reason: e.to_string(),
            })?;
        self.company_params()
            .validate()
            .map_err(|e| ConfigError::Invalid {
                field: "company",
                reason: e.to_string(),
            })?;
        self.environment_params()
            .validate()
            .map_err(|e| ConfigError::Invalid {
                field: "environment",
                reason: e.to_string(),
            })?;
        self.tax_params()?;
        Ok(())
    }

    /// Labor market parameters.
    pub const fn labor_params(&self) -> LaborParams {
        LaborParams {
            default_wage: self.labor.default_wage,
        }
    }

    /// Employer parameters.
    pub const fn company_params(&self) -> CompanyParams {
        let c = &self.company;
        CompanyParams {
            employee_capacity_ratio: self.labor.employee_capacity_ratio,
            base_wage: c.base_wage,
            bankruptcy_threshold: c.bankruptcy_threshold,
            production_base_price: c.production_base_price,
            demand_default: c.demand_default,
            growth_balance_trigger: c.growth_balance_trigger,
            growth_threshold: c.growth_threshold,
            split_ratio: c.split_ratio,
            rd_investment_trigger: c.rd_investment_trigger,
            rd_investment_rate: c.rd_investment_rate,
            innovation_threshold: c.innovation_threshold,
            innovation_bonus_rate: c.innovation_bonus_rate,
            rd_decay_factor: c.rd_decay_factor,
        }
    }

    /// Household parameters.
    pub const fn household_params(&self) -> HouseholdParams {
        let h = &self.household;
        HouseholdParams {
            consumption_rate: h.consumption_rate,
            loan_repayment_rate: h.loan_repayment_rate,
            child_rearing_cost: h.child_rearing_cost,
            savings_growth_trigger: h.savings_growth_trigger,
            max_age: h.max_age,
            max_generation: h.max_generation,
            growth_consumption_rate: h.growth_consumption_rate,
            growth_threshold: h.growth_threshold,
            split_savings_share: h.split_savings_share,
            health: HealthThresholds {
                assets: h.health_assets_threshold,
                income: h.health_income_threshold,
            },
        }
    }

    /// Savings bank parameters.
    pub const fn bank_params(&self) -> BankParams {
        BankParams {
            max_savings_per_account: self.savings_bank.max_savings_per_account,
            initial_liquidity: self.savings_bank.initial_liquidity,
        }
    }

    /// State treasury parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the allocation splits are
    /// negative or do not sum to one.
    pub fn tax_params(&self) -> Result<TaxParams, ConfigError> {
        let a = &self.tax.allocation;
        let allocation = TaxAllocation::new(a.infrastructure, a.social, a.environment).map_err(
            |e| ConfigError::Invalid {
                field: "tax.allocation",
                reason: e.to_string(),
            },
        )?;
        Ok(TaxParams {
            land_tax_rate: self.tax.land_tax_rate,
            environmental_tax_rate: self.tax.environmental_tax_rate,
            hyperwealth_threshold: self.tax.hyperwealth_threshold,
            allocation,
        })
    }

    /// Environmental agency parameters. The agency taxes at the state's
    /// environmental rate.
    pub const fn environment_params(&self) -> EnvironmentParams {
        let e = &self.environment;
        EnvironmentParams {
            environmental_tax_rate: self.tax.environmental_tax_rate,
            max_environmental_impact: e.max_environmental_impact,
            penalty_factor: e.penalty_factor,
            waste_output_per_impact: e.waste_output_per_impact,
            env_tax_state_share: e.env_tax_state_share,
            recycling_efficiency: e.recycling_efficiency,
        }
    }
}

/// Run length and logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of ticks to run.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            log_level: default_log_level(),
        }
    }
}

/// Labor market configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LaborConfig {
    /// Wage offered when an employer requests workers. `null` disables the
    /// wage floor and employers fall back to `company.base_wage`.
    #[serde(default = "default_wage")]
    pub default_wage: Option<Decimal>,

    /// Production capacity served by one employee.
    #[serde(default = "default_employee_capacity_ratio")]
    pub employee_capacity_ratio: Decimal,
}

impl Default for LaborConfig {
    fn default() -> Self {
        Self {
            default_wage: default_wage(),
            employee_capacity_ratio: default_employee_capacity_ratio(),
        }
    }
}

/// Employer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyConfig {
    /// Fallback wage when the labor market has no default.
    #[serde(default = "default_base_wage")]
    pub base_wage: Decimal,

    /// Sight balance below which an employer is bankrupt.
    #[serde(default = "default_bankruptcy_threshold")]
    pub bankruptcy_threshold: Decimal,

    /// Price per unit sold.
    #[serde(default = "default_production_base_price")]
    pub production_base_price: Decimal,

    /// Units demanded per step.
    #[serde(default = "default_demand")]
    pub demand_default: Decimal,

    /// Sight balance at which the growth phase begins.
    #[serde(default = "default_growth_balance_trigger")]
    pub growth_balance_trigger: Decimal,

    /// Steps in the growth phase before a spinoff is founded.
    #[serde(default = "default_growth_threshold")]
    pub growth_threshold: u32,

    /// Share of the sight balance a spinoff takes along.
    #[serde(default = "default_split_ratio")]
    pub split_ratio: Decimal,

    /// Balance above which the excess is partly spent on R&D.
    #[serde(default = "default_rd_investment_trigger")]
    pub rd_investment_trigger: Decimal,

    /// Share of the excess spent on R&D each step. Zero disables R&D.
    #[serde(default = "default_rd_investment_rate")]
    pub rd_investment_rate: Decimal,

    /// Accumulated R&D at which an innovation lands.
    #[serde(default = "default_innovation_threshold")]
    pub innovation_threshold: Decimal,

    /// Capacity gained per innovation, as a share of capacity.
    #[serde(default = "default_innovation_bonus_rate")]
    pub innovation_bonus_rate: Decimal,

    /// Share of accumulated R&D kept after an innovation.
    #[serde(default = "default_rd_decay_factor")]
    pub rd_decay_factor: Decimal,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            base_wage: default_base_wage(),
            bankruptcy_threshold: default_bankruptcy_threshold(),
            production_base_price: default_production_base_price(),
            demand_default: default_demand(),
            growth_balance_trigger: default_growth_balance_trigger(),
            growth_threshold: default_growth_threshold(),
            split_ratio: default_split_ratio(),
            rd_investment_trigger: default_rd_investment_trigger(),
            rd_investment_rate: default_rd_investment_rate(),
            innovation_threshold: default_innovation_threshold(),
            innovation_bonus_rate: default_innovation_bonus_rate(),
            rd_decay_factor: default_rd_decay_factor(),
        }
    }
}

/// Household configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HouseholdConfig {
    /// Fraction of checking consumed each step.
    #[serde(default = "default_consumption_rate")]
    pub consumption_rate: Decimal,

    /// Fraction of checking offered as loan repayment.
    #[serde(default = "default_loan_repayment_rate")]
    pub loan_repayment_rate: Decimal,

    /// Cost of raising a child during the growth phase.
    #[serde(default = "default_child_rearing_cost")]
    pub child_rearing_cost: Decimal,

    /// Savings at which the growth phase begins.
    #[serde(default = "default_savings_growth_trigger")]
    pub savings_growth_trigger: Decimal,

    /// Age in steps at which a household passes on.
    #[serde(default = "default_max_age")]
    pub max_age: u32,

    /// Last generation that leaves an heir. Households born later leave
    /// unless growing.
    #[serde(default = "default_max_generation")]
    pub max_generation: u32,

    /// Fraction of checking consumed each step while growing.
    #[serde(default = "default_growth_consumption_rate")]
    pub growth_consumption_rate: Decimal,

    /// Steps in the growth phase before the child splits off.
    #[serde(default = "default_growth_threshold")]
    pub growth_threshold: u32,

    /// Share of savings that endows the child.
    #[serde(default = "default_split_savings_share")]
    pub split_savings_share: Decimal,

    /// Assets at which the health score's asset part saturates.
    #[serde(default = "default_health_assets_threshold")]
    pub health_assets_threshold: Decimal,

    /// Income at which the health score's income part saturates.
    #[serde(default = "default_health_income_threshold")]
    pub health_income_threshold: Decimal,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            consumption_rate: default_consumption_rate(),
            loan_repayment_rate: default_loan_repayment_rate(),
            child_rearing_cost: default_child_rearing_cost(),
            savings_growth_trigger: default_savings_growth_trigger(),
            max_age: default_max_age(),
            max_generation: default_max_generation(),
            growth_consumption_rate: default_growth_consumption_rate(),
            growth_threshold: default_growth_threshold(),
            split_savings_share: default_split_savings_share(),
            health_assets_threshold: default_health_assets_threshold(),
            health_income_threshold: default_health_income_threshold(),
        }
    }
}

/// State tax policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxConfig {
    /// Tax per unit of land.
    #[serde(default = "default_land_tax_rate")]
    pub land_tax_rate: Decimal,

    /// Tax per unit of environmental impact.
    #[serde(default = "default_environmental_tax_rate")]
    pub environmental_tax_rate: Decimal,

    /// Balance ceiling above which wealth is confiscated.
    #[serde(default = "default_hyperwealth_threshold")]
    pub hyperwealth_threshold: Decimal,

    /// Budget split for distributed revenue.
    #[serde(default)]
    pub allocation: AllocationConfig,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            land_tax_rate: default_land_tax_rate(),
            environmental_tax_rate: default_environmental_tax_rate(),
            hyperwealth_threshold: default_hyperwealth_threshold(),
            allocation: AllocationConfig::default(),
        }
    }
}

/// Budget split, validated into a [`TaxAllocation`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllocationConfig {
    /// Infrastructure share.
    #[serde(default = "default_infrastructure_share")]
    pub infrastructure: Decimal,

    /// Social share.
    #[serde(default = "default_social_share")]
    pub social: Decimal,

    /// Environment share.
    #[serde(default = "default_environment_share")]
    pub environment: Decimal,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            infrastructure: default_infrastructure_share(),
            social: default_social_share(),
            environment: default_environment_share(),
        }
    }
}

/// Environmental agency and recycling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    /// Impact ceiling enforced by audits.
    #[serde(default = "default_max_environmental_impact")]
    pub max_environmental_impact: Decimal,

    /// Penalty per unit of excess impact.
    #[serde(default = "default_penalty_factor")]
    pub penalty_factor: Decimal,

    /// Waste produced per unit of impact.
    #[serde(default = "default_waste_output_per_impact")]
    pub waste_output_per_impact: Decimal,

    /// Share of agency tax forwarded to the state's environment budget.
    #[serde(default = "default_env_tax_state_share")]
    pub env_tax_state_share: Decimal,

    /// Fraction of waste recycled into materials.
    #[serde(default = "default_recycling_efficiency")]
    pub recycling_efficiency: Decimal,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            max_environmental_impact: default_max_environmental_impact(),
            penalty_factor: default_penalty_factor(),
            waste_output_per_impact: default_waste_output_per_impact(),
            env_tax_state_share: default_env_tax_state_share(),
            recycling_efficiency: default_recycling_efficiency(),
        }
    }
}

/// Savings bank settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavingsBankConfig {
    /// Whether the economy has a savings bank at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Savings cap per account.
    #[serde(default = "default_max_savings_per_account")]
    pub max_savings_per_account: Decimal,

    /// Liquidity the bank starts with.
    #[serde(default)]
    pub initial_liquidity: Decimal,
}

impl Default for SavingsBankConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_savings_per_account: default_max_savings_per_account(),
            initial_liquidity: Decimal::ZERO,
        }
    }
}

/// Initial population. Each entry is repeated `count` times.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Household cohorts.
    #[serde(default = "default_households")]
    pub households: Vec<HouseholdCohort>,

    /// Employer cohorts.
    #[serde(default = "default_companies")]
    pub companies: Vec<CompanyCohort>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            households: default_households(),
            companies: default_companies(),
        }
    }
}

/// A group of identical households.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HouseholdCohort {
    /// How many households to create.
    #[serde(default = "default_count")]
    pub count: usize,

    /// Reference income.
    #[serde(default)]
    pub income: Decimal,

    /// Land held.
    #[serde(default)]
    pub land_area: Decimal,

    /// Environmental impact.
    #[serde(default)]
    pub environmental_impact: Decimal,

    /// Opening checking balance.
    #[serde(default)]
    pub checking_account: Decimal,

    /// Credit requested from the savings bank at start.
    #[serde(default)]
    pub initial_loan: Decimal,
}

/// A group of identical employers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyCohort {
    /// How many employers to create.
    #[serde(default = "default_count")]
    pub count: usize,

    /// Production capacity.
    #[serde(default)]
    pub production_capacity: Decimal,

    /// Headcount ceiling.
    #[serde(default)]
    pub max_employees: usize,

    /// Land held.
    #[serde(default)]
    pub land_area: Decimal,

    /// Environmental impact.
    #[serde(default)]
    pub environmental_impact: Decimal,

    /// Opening sight balance.
    #[serde(default)]
    pub sight_balance: Decimal,
}

const fn default_steps() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_wage() -> Option<Decimal> {
    Some(Decimal::new(10, 0))
}

fn default_employee_capacity_ratio() -> Decimal {
    Decimal::new(11, 0)
}

fn default_base_wage() -> Decimal {
    Decimal::new(5, 0)
}

fn default_bankruptcy_threshold() -> Decimal {
    Decimal::new(-100, 0)
}

fn default_production_base_price() -> Decimal {
    Decimal::new(10, 0)
}

fn default_demand() -> Decimal {
    Decimal::new(50, 0)
}

fn default_growth_balance_trigger() -> Decimal {
    Decimal::new(1000, 0)
}

const fn default_growth_threshold() -> u32 {
    5
}

fn default_split_ratio() -> Decimal {
    Decimal::new(5, 1)
}

fn default_rd_investment_trigger() -> Decimal {
    Decimal::new(200, 0)
}

fn default_rd_investment_rate() -> Decimal {
    Decimal::new(1, 1)
}

fn default_innovation_threshold() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_innovation_bonus_rate() -> Decimal {
    Decimal::new(1, 1)
}

fn default_rd_decay_factor() -> Decimal {
    Decimal::new(5, 1)
}

fn default_consumption_rate() -> Decimal {
    Decimal::new(7, 1)
}

fn default_loan_repayment_rate() -> Decimal {
    Decimal::new(1, 1)
}

fn default_child_rearing_cost() -> Decimal {
    Decimal::new(200, 0)
}

fn default_savings_growth_trigger() -> Decimal {
    Decimal::new(500, 0)
}

const fn default_max_age() -> u32 {
    80
}

const fn default_max_generation() -> u32 {
    3
}

fn default_growth_consumption_rate() -> Decimal {
    Decimal::new(9, 1)
}

fn default_split_savings_share() -> Decimal {
    Decimal::new(8, 1)
}

fn default_health_assets_threshold() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_health_income_threshold() -> Decimal {
    Decimal::new(100, 0)
}

fn default_land_tax_rate() -> Decimal {
    Decimal::new(5, 2)
}

fn default_environmental_tax_rate() -> Decimal {
    Decimal::new(2, 2)
}

fn default_hyperwealth_threshold() -> Decimal {
    Decimal::new(1_000_000, 0)
}

fn default_infrastructure_share() -> Decimal {
    Decimal::new(5, 1)
}

fn default_social_share() -> Decimal {
    Decimal::new(3, 1)
}

fn default_environment_share() -> Decimal {
    Decimal::new(2, 1)
}

fn default_max_environmental_impact() -> Decimal {
    Decimal::new(10, 0)
}

fn default_penalty_factor() -> Decimal {
    Decimal::new(5, 0)
}

const fn default_waste_output_per_impact() -> Decimal {
    Decimal::ONE
}

const fn default_env_tax_state_share() -> Decimal {
    Decimal::ONE
}

fn default_recycling_efficiency() -> Decimal {
    Decimal::new(8, 1)
}

fn default_max_savings_per_account() -> Decimal {
    Decimal::new(10_000, 0)
}

const fn default_count() -> usize {
    1
}

const fn default_true() -> bool {
    true
}

fn default_households() -> Vec<HouseholdCohort> {
    vec![HouseholdCohort {
        count: 20,
        income: Decimal::new(10, 0),
        land_area: Decimal::new(10, 0),
        environmental_impact: Decimal::ONE,
        checking_account: Decimal::new(100, 0),
        initial_loan: Decimal::ZERO,
    }]
}

fn default_companies() -> Vec<CompanyCohort> {
    vec![CompanyCohort {
        count: 2,
        production_capacity: Decimal::new(100, 0),
        max_employees: 10,
        land_area: Decimal::new(50, 0),
        environmental_impact: Decimal::new(5, 0),
        sight_balance: Decimal::new(1000, 0),
    }]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.steps, 100);
        assert_eq!(config.labor.default_wage, Some(dec!(10)));
        assert_eq!(config.labor.employee_capacity_ratio, dec!(11));
        assert_eq!(config.company.bankruptcy_threshold, dec!(-100));
        assert_eq!(config.household.consumption_rate, dec!(0.7));
        assert_eq!(config.tax.land_tax_rate, dec!(0.05));
        assert_eq!(config.tax.allocation.social, dec!(0.3));
        assert_eq!(config.environment.recycling_efficiency, dec!(0.8));
        assert_eq!(config.savings_bank.max_savings_per_account, dec!(10000));
    }

    #[test]
    fn defaults_match_parameter_structs() {
        let config = SimulationConfig::default();
        assert_eq!(config.labor_params(), LaborParams::default());
        assert_eq!(config.company_params(), CompanyParams::default());
        assert_eq!(config.household_params(), HouseholdParams::default());
        assert_eq!(config.bank_params(), BankParams::default());
        assert_eq!(config.tax_params().unwrap(), TaxParams::default());
        assert_eq!(config.environment_params(), EnvironmentParams::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  steps: 12
  log_level: debug
labor:
  default_wage: 25
  employee_capacity_ratio: 4
company:
  base_wage: 8
  bankruptcy_threshold: -50
  growth_threshold: 2
  split_ratio: 0.25
  rd_investment_rate: 0
household:
  consumption_rate: 0.5
  max_age: 30
  growth_consumption_rate: 0.6
  split_savings_share: 0.5
tax:
  land_tax_rate: 0.1
  allocation:
    infrastructure: 0.4
    social: 0.4
    environment: 0.2
environment:
  penalty_factor: 2
  env_tax_state_share: 0.5
savings_bank:
  enabled: false
population:
  households:
    - count: 3
      checking_account: 50
      initial_loan: 20
  companies:
    - production_capacity: 40
      max_employees: 4
      sight_balance: 500
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.steps, 12);
        assert_eq!(config.simulation.log_level, "debug");
        assert_eq!(config.labor.default_wage, Some(dec!(25)));
        assert_eq!(config.company_params().employee_capacity_ratio, dec!(4));
        assert_eq!(config.company.bankruptcy_threshold, dec!(-50));
        assert_eq!(config.household_params().max_age, 30);
        assert_eq!(config.company_params().growth_threshold, 2);
        assert_eq!(config.company_params().split_ratio, dec!(0.25));
        assert_eq!(config.company_params().rd_investment_rate, Decimal::ZERO);
        assert_eq!(config.company_params().rd_decay_factor, dec!(0.5));
        assert_eq!(config.household_params().growth_consumption_rate, dec!(0.6));
        assert_eq!(config.household_params().split_savings_share, dec!(0.5));
        assert_eq!(config.household_params().growth_threshold, 5);
        assert_eq!(config.tax_params().unwrap().allocation.social(), dec!(0.4));
        assert_eq!(config.environment_params().env_tax_state_share, dec!(0.5));
        assert!(!config.savings_bank.enabled);

        let cohort = config.population.households.first().unwrap();
        assert_eq!(cohort.count, 3);
        assert_eq!(cohort.initial_loan, dec!(20));
        assert_eq!(cohort.land_area, Decimal::ZERO);
        let company = config.population.companies.first().unwrap();
        assert_eq!(company.count, 1);
        assert_eq!(company.max_employees, 4);
    }

    #[test]
    fn null_default_wage_disables_floor() {
        let config = SimulationConfig::parse("labor:\n  default_wage: null\n").unwrap();
        assert_eq!(config.labor_params().default_wage, None);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn allocation_must_sum_to_one() {
        let yaml = "tax:\n  allocation:\n    infrastructure: 0.5\n    social: 0.5\n    environment: 0.5\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "tax.allocation", .. })
        ));
    }

    #[test]
    fn zero_capacity_ratio_rejected() {
        let config = SimulationConfig::parse("labor:\n  employee_capacity_ratio: 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "labor.employee_capacity_ratio", .. })
        ));
    }

    #[test]
    fn rates_outside_unit_interval_rejected() {
        let config = SimulationConfig::parse("household:\n  consumption_rate: 1.5\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "household", .. })
        ));

        let config = SimulationConfig::parse("environment:\n  recycling_efficiency: 2\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "environment", .. })
        ));

        let config = SimulationConfig::parse("company:\n  split_ratio: 1.2\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "company", .. })
        ));

        let config = SimulationConfig::parse("tax:\n  land_tax_rate: -0.1\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = SimulationConfig::parse("simulation: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("warengeld-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().validate().is_ok());
        }
    }
}
