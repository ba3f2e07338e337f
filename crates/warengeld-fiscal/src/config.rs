//! Fiscal parameters.
//!
//! Built by the core crate from the `tax` and `environment` sections of
//! `warengeld-config.yaml`. Rates and splits are policy inputs; this crate
//! only checks that they are well-formed.

use rust_decimal::Decimal;

use crate::error::FiscalError;

/// How distributed tax revenue is split across the three budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxAllocation {
    infrastructure: Decimal,
    social: Decimal,
    environment: Decimal,
}

impl TaxAllocation {
    /// Validate and build an allocation.
    ///
    /// Each split must be non-negative and together they must sum to
    /// exactly one.
    pub fn new(
        infrastructure: Decimal,
        social: Decimal,
        environment: Decimal,
    ) -> Result<Self, FiscalError> {
        let sum = infrastructure
            .checked_add(social)
            .and_then(|s| s.checked_add(environment))
            .unwrap_or(Decimal::MAX);
        let negative = [infrastructure, social, environment]
            .iter()
            .any(Decimal::is_sign_negative);
        if negative || sum != Decimal::ONE {
            return Err(FiscalError::InvalidAllocation { sum });
        }
        Ok(Self {
            infrastructure,
            social,
            environment,
        })
    }

    /// Infrastructure share.
    pub const fn infrastructure(&self) -> Decimal {
        self.infrastructure
    }

    /// Social share.
    pub const fn social(&self) -> Decimal {
        self.social
    }

    /// Environment share.
    pub const fn environment(&self) -> Decimal {
        self.environment
    }
}

impl Default for TaxAllocation {
    fn default() -> Self {
        Self {
            infrastructure: Decimal::new(5, 1),
            social: Decimal::new(3, 1),
            environment: Decimal::new(2, 1),
        }
    }
}

/// Parameters for the state treasury.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxParams {
    /// Tax per unit of land area (default: 0.05).
    pub land_tax_rate: Decimal,
    /// Tax per unit of environmental impact (default: 0.02).
    pub environmental_tax_rate: Decimal,
    /// Balance ceiling above which wealth is confiscated (default: 1 000 000).
    pub hyperwealth_threshold: Decimal,
    /// Budget split for distributed revenue.
    pub allocation: TaxAllocation,
}

impl Default for TaxParams {
    fn default() -> Self {
        Self {
            land_tax_rate: Decimal::new(5, 2),
            environmental_tax_rate: Decimal::new(2, 2),
            hyperwealth_threshold: Decimal::new(1_000_000, 0),
            allocation: TaxAllocation::default(),
        }
    }
}

/// Parameters for the environmental agency and recycler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentParams {
    /// Tax per unit of environmental impact (default: 0.02).
    pub environmental_tax_rate: Decimal,
    /// Impact above which audits impose a penalty (default: 10).
    pub max_environmental_impact: Decimal,
    /// Penalty per unit of excess impact (default: 5).
    pub penalty_factor: Decimal,
    /// Waste produced per unit of impact (default: 1).
    pub waste_output_per_impact: Decimal,
    /// Share of collected environmental tax forwarded to the state's
    /// environment budget (default: 1). Clamped to `[0, 1]` when applied.
    pub env_tax_state_share: Decimal,
    /// Fraction of waste converted to materials (default: 0.8).
    pub recycling_efficiency: Decimal,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            environmental_tax_rate: Decimal::new(2, 2),
            max_environmental_impact: Decimal::new(10, 0),
            penalty_factor: Decimal::new(5, 0),
            waste_output_per_impact: Decimal::ONE,
            env_tax_state_share: Decimal::ONE,
            recycling_efficiency: Decimal::new(8, 1),
        }
    }
}

impl EnvironmentParams {
    /// Check the share and efficiency ranges.
    pub fn validate(&self) -> Result<(), FiscalError> {
        if !in_unit_interval(self.env_tax_state_share) {
            return Err(FiscalError::InvalidShare(self.env_tax_state_share));
        }
        if !in_unit_interval(self.recycling_efficiency) {
            return Err(FiscalError::InvalidEfficiency(self.recycling_efficiency));
        }
        Ok(())
    }
}

pub(crate) fn in_unit_interval(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}
