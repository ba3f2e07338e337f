//! Capability traits through which the fiscal cycle sees agents.
//!
//! The state and the environmental agency never depend on concrete agent
//! types. They iterate a snapshot of [`FiscalSubject`] trait objects and ask
//! each one which capabilities it exposes:
//!
//! | Capability | Trait | Used for |
//! |------------|-------|----------|
//! | Identity | [`Identified`] | log lines, levy receipts |
//! | Land area | [`LandHolding`] | land tax |
//! | Impact | [`EnvironmentalImpact`] | environmental tax, audits, waste |
//! | Balance | [`Balance`] / [`Billable`] | deductions, hyperwealth ceiling |
//!
//! An agent without a balance can still be assessed; the amount is then
//! booked "on paper" and nothing is deducted.

use rust_decimal::Decimal;

use crate::enums::AgentKind;
use crate::ids::AgentId;

/// An agent with a stable identity.
pub trait Identified {
    /// The agent's identifier.
    fn agent_id(&self) -> AgentId;

    /// The agent's role, for log lines and ledger parties.
    fn agent_kind(&self) -> AgentKind;
}

/// An agent holding a readable and writable money balance.
pub trait Balance {
    /// Current balance. May be negative.
    fn balance(&self) -> Decimal;

    /// Overwrite the balance.
    fn set_balance(&mut self, balance: Decimal);
}

/// A balance-bearing agent that can be debited by taxes and penalties.
///
/// Every [`Balance`] is billable; the blanket implementation debits the
/// full amount without clamping, so balances may go negative. The debit
/// saturates at [`Decimal::MIN`]; only what was actually debited is
/// reported as billed.
pub trait Billable: Balance {
    /// Debit `amount` and return the amount actually billed.
    fn bill(&mut self, amount: Decimal) -> Decimal {
        let balance = self.balance();
        let after = balance.saturating_sub(amount);
        self.set_balance(after);
        balance.saturating_sub(after)
    }
}

impl<T: Balance> Billable for T {}

/// An agent occupying taxable land.
pub trait LandHolding {
    /// Land area used for land-tax assessment.
    fn land_area(&self) -> Decimal;
}

/// An agent with an environmental footprint.
pub trait EnvironmentalImpact {
    /// Environmental impact used for tax, audits, and waste output.
    fn environmental_impact(&self) -> Decimal;
}

/// An agent the fiscal cycle may assess.
///
/// Each accessor returns `None` unless the implementor declares the
/// capability, replacing runtime attribute probing with explicit opt-in.
pub trait FiscalSubject: Identified {
    /// Land-area capability, if any.
    fn as_land_holding(&self) -> Option<&dyn LandHolding> {
        None
    }

    /// Environmental-impact capability, if any.
    fn as_impact(&self) -> Option<&dyn EnvironmentalImpact> {
        None
    }

    /// Billing capability, if any.
    fn as_billable(&mut self) -> Option<&mut dyn Billable> {
        None
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    struct Wallet(Decimal);

    impl Balance for Wallet {
        fn balance(&self) -> Decimal {
            self.0
        }

        fn set_balance(&mut self, balance: Decimal) {
            self.0 = balance;
        }
    }

    struct Registered(AgentId);

    impl Identified for Registered {
        fn agent_id(&self) -> AgentId {
            self.0
        }

        fn agent_kind(&self) -> AgentKind {
            AgentKind::Household
        }
    }

    impl FiscalSubject for Registered {}

    #[test]
    fn bill_debits_without_clamping() {
        let mut wallet = Wallet(dec!(3));
        let billed = wallet.bill(dec!(5));
        assert_eq!(billed, dec!(5));
        assert_eq!(wallet.balance(), dec!(-2));
    }

    #[test]
    fn bill_saturates_at_the_minimum_balance() {
        let mut wallet = Wallet(Decimal::MIN);
        assert_eq!(wallet.bill(dec!(5)), Decimal::ZERO);
        assert_eq!(wallet.balance(), Decimal::MIN);

        let mut nearly = Wallet(Decimal::MIN + dec!(2));
        assert_eq!(nearly.bill(dec!(5)), dec!(2));
        assert_eq!(nearly.balance(), Decimal::MIN);
    }

    #[test]
    fn capabilities_default_to_absent() {
        let mut subject = Registered(AgentId::new());
        assert!(subject.as_land_holding().is_none());
        assert!(subject.as_impact().is_none());
        assert!(subject.as_billable().is_none());
    }
}
