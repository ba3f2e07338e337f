//! The recycling company: turns collected waste into materials.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use warengeld_types::{AgentId, AgentKind, Identified};

use crate::config::in_unit_interval;
use crate::error::FiscalError;

/// Collects waste into a pool and processes it at a fixed efficiency.
#[derive(Debug, Clone)]
pub struct RecyclingCompany {
    id: AgentId,
    recycling_efficiency: Decimal,
    waste_collected: Decimal,
    processed_materials: Decimal,
}

impl RecyclingCompany {
    /// Create a recycler. `recycling_efficiency` must be within `[0, 1]`.
    pub fn new(recycling_efficiency: Decimal) -> Result<Self, FiscalError> {
        if !in_unit_interval(recycling_efficiency) {
            return Err(FiscalError::InvalidEfficiency(recycling_efficiency));
        }
        Ok(Self {
            id: AgentId::new(),
            recycling_efficiency,
            waste_collected: Decimal::ZERO,
            processed_materials: Decimal::ZERO,
        })
    }

    /// The recycler's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Waste waiting to be processed.
    pub const fn waste_collected(&self) -> Decimal {
        self.waste_collected
    }

    /// Accept `amount` of waste from `source`. Non-positive amounts are
    /// rejected. Returns the amount accepted.
    pub fn collect_waste(&mut self, source: AgentId, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            warn!(source = %source, amount = %amount, "Rejected non-positive waste delivery");
            return Decimal::ZERO;
        }
        self.waste_collected = self.waste_collected.saturating_add(amount);
        debug!(source = %source, amount = %amount, pool = %self.waste_collected, "Waste collected");
        amount
    }

    /// Convert the whole pool into materials. Returns the amount produced.
    pub fn process_recycling(&mut self) -> Decimal {
        if self.waste_collected <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let processed = self
            .waste_collected
            .saturating_mul(self.recycling_efficiency);
        self.processed_materials = self.processed_materials.saturating_add(processed);
        self.waste_collected = Decimal::ZERO;
        info!(
            processed = %processed,
            total = %self.processed_materials,
            "Waste recycled"
        );
        processed
    }

    /// Materials produced so far.
    pub const fn report_materials(&self) -> Decimal {
        self.processed_materials
    }

    /// Process pending waste, then report materials.
    pub fn step(&mut self, current_step: u64) -> Decimal {
        let processed = self.process_recycling();
        debug!(
            step = current_step,
            processed = %processed,
            materials = %self.processed_materials,
            "Recycler step complete"
        );
        self.report_materials()
    }
}

impl Identified for RecyclingCompany {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::Recycler
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn ten_units_at_half_efficiency() {
        let mut r = RecyclingCompany::new(dec!(0.5)).unwrap();
        assert_eq!(r.collect_waste(AgentId::new(), dec!(10)), dec!(10));
        assert_eq!(r.process_recycling(), dec!(5));
        assert_eq!(r.waste_collected(), Decimal::ZERO);
        assert_eq!(r.report_materials(), dec!(5));
    }

    #[test]
    fn non_positive_waste_rejected() {
        let mut r = RecyclingCompany::new(dec!(0.8)).unwrap();
        assert_eq!(r.collect_waste(AgentId::new(), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(r.collect_waste(AgentId::new(), dec!(-3)), Decimal::ZERO);
        assert_eq!(r.waste_collected(), Decimal::ZERO);
    }

    #[test]
    fn empty_pool_processes_nothing() {
        let mut r = RecyclingCompany::new(dec!(0.8)).unwrap();
        assert_eq!(r.process_recycling(), Decimal::ZERO);
        assert_eq!(r.step(1), Decimal::ZERO);
    }

    #[test]
    fn materials_accumulate_across_steps() {
        let mut r = RecyclingCompany::new(dec!(0.8)).unwrap();
        r.collect_waste(AgentId::new(), dec!(5));
        assert_eq!(r.step(1), dec!(4));
        r.collect_waste(AgentId::new(), dec!(10));
        assert_eq!(r.step(2), dec!(12));
    }

    #[test]
    fn efficiency_outside_unit_interval_rejected() {
        assert!(matches!(
            RecyclingCompany::new(dec!(1.2)),
            Err(FiscalError::InvalidEfficiency(_))
        ));
    }
}
