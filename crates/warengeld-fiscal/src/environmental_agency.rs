//! The environmental agency.
//!
//! The agency taxes environmental impact, routes the resulting waste to an
//! attached recycler, forwards tax to the state, and audits agents against
//! its impact standard.
//!
//! # Forwarding
//!
//! With a state and a positive share, `total × share` of each collection
//! goes to the state's environment budget and the remainder to its tax
//! revenue. Without a state, or with a zero share, the agency retains the
//! tax. Penalties are always retained.
//!
//! # Collaborators
//!
//! The agency owns its recycler once attached. The state is passed per
//! call; attaching a state makes that argument mandatory.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warengeld_types::{
    AgentId, AgentKind, FiscalSubject, Identified, Levy, LevyKind, WasteDelivery,
};

use crate::config::EnvironmentParams;
use crate::error::FiscalError;
use crate::recycling::RecyclingCompany;
use crate::state::State;

/// Standard name for the impact ceiling used by audits.
pub const MAX_IMPACT_STANDARD: &str = "max_environmental_impact";

/// Outcome of one environmental tax collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvTaxCollection {
    /// Total tax assessed in this call.
    pub total: Decimal,
    /// One receipt per taxed agent.
    pub levies: Vec<Levy>,
    /// Waste accepted by the recycler.
    pub waste: Vec<WasteDelivery>,
    /// Forwarded to the state's environment budget.
    pub to_environment_budget: Decimal,
    /// Forwarded to the state's tax revenue.
    pub to_tax_revenue: Decimal,
}

impl EnvTaxCollection {
    /// Total forwarded to the state.
    pub fn forwarded(&self) -> Decimal {
        self.to_environment_budget
            .saturating_add(self.to_tax_revenue)
    }
}

/// Outcome of one agency step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyReport {
    /// The tax collection.
    pub collection: EnvTaxCollection,
    /// Audit penalties imposed.
    pub penalties: Vec<Levy>,
}

/// The environmental agency.
#[derive(Debug, Clone)]
pub struct EnvironmentalAgency {
    id: AgentId,
    params: EnvironmentParams,
    env_standards: BTreeMap<String, Decimal>,
    collected_env_tax: Decimal,
    env_tax_transferred_to_state: Decimal,
    collected_penalties: Decimal,
    state: Option<AgentId>,
    recycler: Option<RecyclingCompany>,
}

impl EnvironmentalAgency {
    /// Create an agency with the configured impact standard.
    pub fn new(params: EnvironmentParams) -> Result<Self, FiscalError> {
        params.validate()?;
        let mut env_standards = BTreeMap::new();
        env_standards.insert(
            MAX_IMPACT_STANDARD.to_owned(),
            params.max_environmental_impact,
        );
        Ok(Self {
            id: AgentId::new(),
            params,
            env_standards,
            collected_env_tax: Decimal::ZERO,
            env_tax_transferred_to_state: Decimal::ZERO,
            collected_penalties: Decimal::ZERO,
            state: None,
            recycler: None,
        })
    }

    /// The agency's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current standards by name.
    pub const fn env_standards(&self) -> &BTreeMap<String, Decimal> {
        &self.env_standards
    }

    /// Merge `standards` into the current ones.
    pub fn set_env_standards(&mut self, standards: BTreeMap<String, Decimal>) {
        self.env_standards.extend(standards);
        info!(standards = ?self.env_standards, "Environmental standards updated");
    }

    /// Require `state` as the forwarding target of every collection.
    pub fn attach_state(&mut self, state: &State) {
        self.state = Some(state.id());
    }

    /// Take ownership of a recycler that receives waste from now on.
    pub fn attach_recycler(&mut self, recycler: RecyclingCompany) {
        self.recycler = Some(recycler);
    }

    /// The attached recycler.
    pub const fn recycler(&self) -> Option<&RecyclingCompany> {
        self.recycler.as_ref()
    }

    /// The attached recycler, mutably.
    pub const fn recycler_mut(&mut self) -> Option<&mut RecyclingCompany> {
        self.recycler.as_mut()
    }

    /// Cumulative environmental tax collected.
    pub const fn collected_env_tax(&self) -> Decimal {
        self.collected_env_tax
    }

    /// Cumulative tax forwarded to the state.
    pub const fn env_tax_transferred_to_state(&self) -> Decimal {
        self.env_tax_transferred_to_state
    }

    /// Cumulative audit penalties.
    pub const fn collected_penalties(&self) -> Decimal {
        self.collected_penalties
    }

    /// Collected tax the agency still holds.
    pub fn retained_env_tax(&self) -> Decimal {
        self.collected_env_tax
            .saturating_sub(self.env_tax_transferred_to_state)
    }

    /// All money the agency holds.
    pub fn holdings(&self) -> Decimal {
        self.retained_env_tax()
            .saturating_add(self.collected_penalties)
    }

    /// The impact ceiling audits compare against.
    pub fn max_impact(&self) -> Decimal {
        self.env_standards
            .get(MAX_IMPACT_STANDARD)
            .copied()
            .unwrap_or(self.params.max_environmental_impact)
    }

    /// Tax every agent with an impact, route waste, and forward to the
    /// state.
    ///
    /// Fails when a state is attached but `state` is `None`.
    pub fn collect_env_tax(
        &mut self,
        agents: &mut [&mut dyn FiscalSubject],
        state: Option<&mut State>,
    ) -> Result<EnvTaxCollection, FiscalError> {
        if state.is_none() && self.state.is_some() {
            return Err(FiscalError::MissingCollaborator {
                operation: "collect_env_tax",
                collaborator: "state",
            });
        }

        let rate = self.params.environmental_tax_rate;
        let waste_ratio = self.params.waste_output_per_impact;
        let mut collection = EnvTaxCollection::default();

        for agent in agents.iter_mut() {
            let Some(impact) = agent.as_impact().map(|i| i.environmental_impact()) else {
                continue;
            };
            let id = agent.agent_id();
            let kind = agent.agent_kind();

            let tax = impact.saturating_mul(rate);
            if tax > Decimal::ZERO {
                let (amount, billed) = match agent.as_billable() {
                    Some(billable) => (billable.bill(tax), true),
                    None => (tax, false),
                };
                collection.total = collection.total.saturating_add(amount);
                collection.levies.push(Levy {
                    payer: id,
                    payer_kind: kind,
                    collector: self.id,
                    collector_kind: AgentKind::EnvironmentalAgency,
                    kind: LevyKind::AgencyEnvironmentalTax,
                    amount,
                    billed,
                });
            }

            if let Some(recycler) = self.recycler.as_mut() {
                let accepted = recycler.collect_waste(id, impact.saturating_mul(waste_ratio));
                if accepted > Decimal::ZERO {
                    collection.waste.push(WasteDelivery {
                        source: id,
                        amount: accepted,
                    });
                }
            }
        }

        self.collected_env_tax = self.collected_env_tax.saturating_add(collection.total);

        let share = self
            .params
            .env_tax_state_share
            .clamp(Decimal::ZERO, Decimal::ONE);
        if let Some(state) = state
            && share > Decimal::ZERO
            && collection.total > Decimal::ZERO
        {
            let to_budget = collection.total.saturating_mul(share);
            let remainder = collection.total.saturating_sub(to_budget);
            state.receive_environment_funds(to_budget);
            state.receive_tax_revenue(remainder);
            collection.to_environment_budget = to_budget;
            collection.to_tax_revenue = remainder;
            self.env_tax_transferred_to_state = self
                .env_tax_transferred_to_state
                .saturating_add(collection.total);
        }

        info!(
            collected = %collection.total,
            cumulative = %self.collected_env_tax,
            forwarded = %collection.forwarded(),
            waste_deliveries = collection.waste.len(),
            "Environmental tax collected"
        );
        Ok(collection)
    }

    /// Audit one agent against the impact ceiling.
    ///
    /// Returns the penalty imposed, zero if compliant.
    pub fn audit_company(&mut self, agent: &mut dyn FiscalSubject) -> Decimal {
        self.assess_penalty(agent).map_or(Decimal::ZERO, |l| l.amount)
    }

    /// Collect environmental tax once, then audit every agent.
    pub fn step(
        &mut self,
        current_step: u64,
        agents: &mut [&mut dyn FiscalSubject],
        state: Option<&mut State>,
    ) -> Result<AgencyReport, FiscalError> {
        let collection = self.collect_env_tax(agents, state)?;
        let penalties: Vec<Levy> = agents
            .iter_mut()
            .filter_map(|agent| self.assess_penalty(&mut **agent))
            .collect();
        debug!(
            step = current_step,
            penalties = penalties.len(),
            "Environmental agency step complete"
        );
        Ok(AgencyReport {
            collection,
            penalties,
        })
    }

    fn assess_penalty(&mut self, agent: &mut dyn FiscalSubject) -> Option<Levy> {
        let impact = agent.as_impact()?.environmental_impact();
        let max = self.max_impact();
        if impact <= max {
            debug!(agent = %agent.agent_id(), "Audit: compliant");
            return None;
        }
        let penalty = impact.saturating_sub(max).saturating_mul(self.params.penalty_factor);
        if penalty <= Decimal::ZERO {
            return None;
        }
        let id = agent.agent_id();
        let kind = agent.agent_kind();
        let (amount, billed) = match agent.as_billable() {
            Some(billable) => (billable.bill(penalty), true),
            None => (penalty, false),
        };
        self.collected_penalties = self.collected_penalties.saturating_add(amount);
        warn!(agent = %id, impact = %impact, max = %max, penalty = %amount, "Audit penalty imposed");
        Some(Levy {
            payer: id,
            payer_kind: kind,
            collector: self.id,
            collector_kind: AgentKind::EnvironmentalAgency,
            kind: LevyKind::Penalty,
            amount,
            billed,
        })
    }
}

impl Identified for EnvironmentalAgency {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::EnvironmentalAgency
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rust_decimal_macros::dec;

    use warengeld_types::Balance;

    use super::*;
    use crate::config::TaxParams;
    use crate::state::tests::TestAgent;

    fn agency(share: Decimal) -> EnvironmentalAgency {
        let params = EnvironmentParams {
            env_tax_state_share: share,
            recycling_efficiency: dec!(0.5),
            ..EnvironmentParams::default()
        };
        EnvironmentalAgency::new(params).unwrap()
    }

    #[test]
    fn two_agents_taxed_by_impact() {
        let mut a = agency(Decimal::ZERO);
        let rate = dec!(0.02);
        let mut first = TestAgent::new(None, Some(dec!(2)), Some(dec!(100)));
        let mut second = TestAgent::new(None, Some(dec!(3)), Some(dec!(100)));

        let collection = a.collect_env_tax(&mut [&mut first, &mut second], None);
        let total = collection.map(|c| c.total).ok();

        assert_eq!(total, Some(dec!(5) * rate));
        assert_eq!(first.balance(), dec!(100) - dec!(2) * rate);
        assert_eq!(second.balance(), dec!(100) - dec!(3) * rate);
        assert_eq!(a.collected_env_tax(), dec!(0.10));
        assert_eq!(a.retained_env_tax(), dec!(0.10));
    }

    #[test]
    fn forwards_share_to_state() {
        let mut a = agency(dec!(0.75));
        let mut s = State::new(TaxParams::default());
        let mut agent = TestAgent::new(None, Some(dec!(100)), Some(dec!(100)));

        let collection = a.collect_env_tax(&mut [&mut agent], Some(&mut s));
        assert!(collection.is_ok_and(|c| c.forwarded() == dec!(2)));
        assert_eq!(s.environment_budget(), dec!(1.5));
        assert_eq!(s.tax_revenue(), dec!(0.5));
        assert_eq!(a.env_tax_transferred_to_state(), dec!(2));
        assert_eq!(a.retained_env_tax(), Decimal::ZERO);
    }

    #[test]
    fn attached_state_must_be_supplied() {
        let mut a = agency(Decimal::ONE);
        let s = State::new(TaxParams::default());
        a.attach_state(&s);
        let result = a.collect_env_tax(&mut [], None);
        assert!(matches!(result, Err(FiscalError::MissingCollaborator { .. })));
    }

    #[test]
    fn waste_routed_even_when_not_billed() {
        let mut a = agency(Decimal::ZERO);
        a.attach_recycler(RecyclingCompany::new(dec!(0.5)).unwrap());
        let mut paper = TestAgent::new(None, Some(dec!(4)), None);
        let mut billed = TestAgent::new(None, Some(dec!(6)), Some(dec!(10)));

        let collection = a
            .collect_env_tax(&mut [&mut paper, &mut billed], None)
            .unwrap();
        assert_eq!(collection.waste.len(), 2);
        assert!(collection.levies.iter().any(|l| !l.billed));
        assert_eq!(a.recycler().map(RecyclingCompany::waste_collected), Some(dec!(10)));
        assert_eq!(a.recycler_mut().map(|r| r.process_recycling()), Some(dec!(5)));
    }

    #[test]
    fn audit_penalizes_excess_impact() {
        let mut a = agency(Decimal::ZERO);
        let mut polluter = TestAgent::new(None, Some(dec!(12)), Some(dec!(100)));
        let mut clean = TestAgent::new(None, Some(dec!(10)), Some(dec!(100)));

        assert_eq!(a.audit_company(&mut polluter), dec!(10));
        assert_eq!(polluter.balance(), dec!(90));
        assert_eq!(a.audit_company(&mut clean), Decimal::ZERO);
        assert_eq!(a.collected_penalties(), dec!(10));
    }

    #[test]
    fn standards_can_be_tightened() {
        let mut a = agency(Decimal::ZERO);
        let mut standards = BTreeMap::new();
        standards.insert(MAX_IMPACT_STANDARD.to_owned(), dec!(1));
        a.set_env_standards(standards);
        let mut agent = TestAgent::new(None, Some(dec!(3)), Some(dec!(100)));
        assert_eq!(a.audit_company(&mut agent), dec!(10));
    }

    #[test]
    fn step_audits_every_agent() {
        let mut a = agency(Decimal::ZERO);
        let mut first = TestAgent::new(None, Some(dec!(11)), Some(dec!(100)));
        let mut second = TestAgent::new(None, Some(dec!(20)), None);
        let report = a.step(1, &mut [&mut first, &mut second], None).unwrap();
        assert_eq!(report.collection.levies.len(), 2);
        assert_eq!(report.penalties.len(), 2);
        assert_eq!(a.collected_penalties(), dec!(55));
    }
}
