//! Parameters for agent behavior.
//!
//! These values correspond to the `labor`, `company`, `household`, and
//! `savings_bank` sections of `warengeld-config.yaml`. The core crate
//! builds them from the parsed configuration and passes them into agent
//! constructors, so no agent reads process-wide state.

use rust_decimal::Decimal;

use crate::error::AgentError;

/// Parameters for the labor market registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaborParams {
    /// Wage floor for registered workers and wage of employer offers
    /// (default: 10). `None` disables both.
    pub default_wage: Option<Decimal>,
}

impl Default for LaborParams {
    fn default() -> Self {
        Self {
            default_wage: Some(Decimal::new(10, 0)),
        }
    }
}

/// Parameters for employers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyParams {
    /// Production capacity one employee accounts for (default: 11).
    pub employee_capacity_ratio: Decimal,

    /// Offer wage used when the registry has no default wage (default: 5).
    pub base_wage: Decimal,

    /// Sight balance below which the company is bankrupt (default: -100).
    pub bankruptcy_threshold: Decimal,

    /// Sale price per unit of goods (default: 10).
    pub production_base_price: Decimal,

    /// Demand used when the caller supplies none (default: 50).
    pub demand_default: Decimal,

    /// Sight balance at which a company enters its growth phase
    /// (default: 1000).
    pub growth_balance_trigger: Decimal,

    /// Steps in the growth phase before the company splits (default: 5).
    pub growth_threshold: u32,

    /// Share of the sight balance a spinoff takes along (default: 0.5).
    pub split_ratio: Decimal,

    /// Balance above which the excess is partly spent on R&D
    /// (default: 200).
    pub rd_investment_trigger: Decimal,

    /// Share of the excess spent on R&D each step (default: 0.1).
    pub rd_investment_rate: Decimal,

    /// Accumulated R&D at which an innovation lands (default: 1000).
    pub innovation_threshold: Decimal,

    /// Capacity gained per innovation, as a share of capacity
    /// (default: 0.1).
    pub innovation_bonus_rate: Decimal,

    /// Share of accumulated R&D kept after an innovation (default: 0.5).
    pub rd_decay_factor: Decimal,
}

impl Default for CompanyParams {
    fn default() -> Self {
        Self {
            employee_capacity_ratio: Decimal::new(11, 0),
            base_wage: Decimal::new(5, 0),
            bankruptcy_threshold: Decimal::new(-100, 0),
            production_base_price: Decimal::new(10, 0),
            demand_default: Decimal::new(50, 0),
            growth_balance_trigger: Decimal::new(1000, 0),
            growth_threshold: 5,
            split_ratio: Decimal::new(5, 1),
            rd_investment_trigger: Decimal::new(200, 0),
            rd_investment_rate: Decimal::new(1, 1),
            innovation_threshold: Decimal::new(1000, 0),
            innovation_bonus_rate: Decimal::new(1, 1),
            rd_decay_factor: Decimal::new(5, 1),
        }
    }
}

impl CompanyParams {
    /// Check that the shares are fractions.
    pub fn validate(&self) -> Result<(), AgentError> {
        check_fraction("split_ratio", self.split_ratio)?;
        check_fraction("rd_investment_rate", self.rd_investment_rate)?;
        check_fraction("rd_decay_factor", self.rd_decay_factor)
    }
}

/// Thresholds normalizing the financial health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    /// Assets at which the asset component saturates (default: 1000).
    pub assets: Decimal,
    /// Income at which the income component saturates (default: 100).
    pub income: Decimal,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            assets: Decimal::new(1000, 0),
            income: Decimal::new(100, 0),
        }
    }
}

/// Parameters for households.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdParams {
    /// Fraction of the checking account consumed each step (default: 0.7).
    pub consumption_rate: Decimal,

    /// Fraction of the checking account offered as loan repayment
    /// (default: 0.1).
    pub loan_repayment_rate: Decimal,

    /// One-off cost of raising a child during the growth phase
    /// (default: 200).
    pub child_rearing_cost: Decimal,

    /// Total savings at which a household enters its growth phase
    /// (default: 500).
    pub savings_growth_trigger: Decimal,

    /// Fraction of the checking account consumed each step while in the
    /// growth phase (default: 0.9).
    pub growth_consumption_rate: Decimal,

    /// Steps in the growth phase before a child household splits off
    /// (default: 5).
    pub growth_threshold: u32,

    /// Share of total savings a child household takes along (default: 0.8).
    pub split_savings_share: Decimal,

    /// Age in steps at which a household exits (default: 80).
    pub max_age: u32,

    /// Last generation that may be succeeded by an heir (default: 3).
    /// Households born beyond it leave unless they are growing.
    pub max_generation: u32,

    /// Health score normalization.
    pub health: HealthThresholds,
}

impl Default for HouseholdParams {
    fn default() -> Self {
        Self {
            consumption_rate: Decimal::new(7, 1),
            loan_repayment_rate: Decimal::new(1, 1),
            child_rearing_cost: Decimal::new(200, 0),
            savings_growth_trigger: Decimal::new(500, 0),
            growth_consumption_rate: Decimal::new(9, 1),
            growth_threshold: 5,
            split_savings_share: Decimal::new(8, 1),
            max_age: 80,
            max_generation: 3,
            health: HealthThresholds::default(),
        }
    }
}

impl HouseholdParams {
    /// Check that the rates are fractions.
    pub fn validate(&self) -> Result<(), AgentError> {
        check_fraction("consumption_rate", self.consumption_rate)?;
        check_fraction("growth_consumption_rate", self.growth_consumption_rate)?;
        check_fraction("loan_repayment_rate", self.loan_repayment_rate)?;
        check_fraction("split_savings_share", self.split_savings_share)
    }
}

/// Parameters for the savings bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankParams {
    /// Savings cap per account (default: 10000).
    pub max_savings_per_account: Decimal,

    /// Liquidity the bank starts with (default: 0).
    pub initial_liquidity: Decimal,
}

impl Default for BankParams {
    fn default() -> Self {
        Self {
            max_savings_per_account: Decimal::new(10_000, 0),
            initial_liquidity: Decimal::ZERO,
        }
    }
}

/// Reject values outside `[0, 1]`.
pub(crate) fn check_fraction(name: &'static str, value: Decimal) -> Result<(), AgentError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(AgentError::InvalidParameter {
            name,
            reason: format!("must be within [0, 1], got {value}"),
        });
    }
    Ok(())
}
