//! Enumeration types shared across the economy crates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Agent kind
// ---------------------------------------------------------------------------

/// The role an agent plays in the economy.
///
/// Used to tag ledger parties and log lines; behavior is never dispatched
/// on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// A household (consumer, saver, and worker).
    Household,
    /// A company (employer and producer).
    Company,
    /// The state treasury.
    State,
    /// The environmental agency.
    EnvironmentalAgency,
    /// The savings bank.
    SavingsBank,
    /// The labor market registry.
    LaborMarket,
    /// The recycling company.
    Recycler,
}

impl core::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Household => "household",
            Self::Company => "company",
            Self::State => "state",
            Self::EnvironmentalAgency => "environmental_agency",
            Self::SavingsBank => "savings_bank",
            Self::LaborMarket => "labor_market",
            Self::Recycler => "recycler",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Company status
// ---------------------------------------------------------------------------

/// Lifecycle state of an employer.
///
/// `Bankrupt` is terminal: the company signals it to the orchestrator,
/// which removes it from the active population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompanyStatus {
    /// Operating normally.
    #[default]
    Active,
    /// Sight balance fell below the fatal threshold.
    Bankrupt,
}

// ---------------------------------------------------------------------------
// Levy kind
// ---------------------------------------------------------------------------

/// The fiscal channel through which money was levied from an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevyKind {
    /// Land tax charged by the state on land area.
    LandTax,
    /// Environmental tax charged by the state on impact.
    StateEnvironmentalTax,
    /// Environmental tax charged by the environmental agency on impact.
    AgencyEnvironmentalTax,
    /// Balance above the hyperwealth ceiling, confiscated by the state.
    Confiscation,
    /// Audit penalty for exceeding the impact standard.
    Penalty,
    /// Remaining cash of a household that left without a successor.
    Estate,
}

// ---------------------------------------------------------------------------
// Flow kind
// ---------------------------------------------------------------------------

/// The category of a money movement recorded in the ledger.
///
/// Flows are either internal (money moves between two agents), inflows
/// (money enters the modeled economy), or outflows (money leaves it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    /// Company pays a worker (company -> household).
    Wage,
    /// Company sells goods to buyers outside the model (outside -> company).
    Sale,
    /// Household spends on consumption (household -> outside).
    Consumption,
    /// Tax levied on a billable agent (agent -> state or agency).
    Tax,
    /// Tax booked on an agent without a balance (outside -> state or agency).
    PaperTax,
    /// Hyperwealth excess taken by the state (agent -> state).
    Confiscation,
    /// Environmental audit penalty (agent -> agency).
    Penalty,
    /// Environmental tax forwarded by the agency (agency -> state).
    Transfer,
    /// Savings deposit (household -> bank).
    Deposit,
    /// Savings withdrawal (bank -> household).
    Withdrawal,
    /// Loan repayment (household -> bank).
    LoanRepayment,
    /// Credit granted from bank liquidity (bank -> household).
    Credit,
    /// Estate inherited by a successor or left to the state.
    Estate,
    /// Savings above the per-account cap removed by the bank (bank -> outside).
    WriteOff,
    /// Research spending by a company (company -> outside).
    Investment,
    /// Money a parent hands to the agent it splits off.
    Endowment,
}

impl FlowKind {
    /// Whether the flow brings money into the modeled economy.
    pub const fn is_inflow(self) -> bool {
        matches!(self, Self::Sale | Self::PaperTax)
    }

    /// Whether the flow removes money from the modeled economy.
    pub const fn is_outflow(self) -> bool {
        matches!(self, Self::Consumption | Self::WriteOff | Self::Investment)
    }

    /// Whether the flow moves money between two agents.
    pub const fn is_internal(self) -> bool {
        !self.is_inflow() && !self.is_outflow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_flow_has_exactly_one_direction() {
        let all = [
            FlowKind::Wage,
            FlowKind::Sale,
            FlowKind::Consumption,
            FlowKind::Tax,
            FlowKind::PaperTax,
            FlowKind::Confiscation,
            FlowKind::Penalty,
            FlowKind::Transfer,
            FlowKind::Deposit,
            FlowKind::Withdrawal,
            FlowKind::LoanRepayment,
            FlowKind::Credit,
            FlowKind::Estate,
            FlowKind::WriteOff,
            FlowKind::Investment,
            FlowKind::Endowment,
        ];
        for flow in all {
            let directions = [flow.is_inflow(), flow.is_outflow(), flow.is_internal()]
                .iter()
                .filter(|d| **d)
                .count();
            assert_eq!(directions, 1, "{flow:?}");
        }
    }

    #[test]
    fn research_leaves_and_endowments_stay() {
        assert!(FlowKind::Investment.is_outflow());
        assert!(FlowKind::Endowment.is_internal());
    }

    #[test]
    fn company_defaults_to_active() {
        assert_eq!(CompanyStatus::default(), CompanyStatus::Active);
    }

    #[test]
    fn agent_kind_display() {
        assert_eq!(AgentKind::EnvironmentalAgency.to_string(), "environmental_agency");
    }
}
