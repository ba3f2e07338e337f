//! Labor market, employers, households, and the savings bank for the
//! Warengeld economy simulation.
//!
//! This crate holds the agent logic that does not involve taxation. It sits
//! between `warengeld-types` (identifiers and capability traits) and
//! `warengeld-core` (which orders the agents into a tick).
//!
//! # Modules
//!
//! - [`config`] -- Parameter structs injected at construction
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`worker`] -- The authoritative worker table ([`Workforce`])
//! - [`labor_market`] -- Registration and matching ([`Registry`])
//! - [`company`] -- Employer staffing, production, R&D, growth, and bankruptcy
//!   ([`Company`])
//! - [`household`] -- Household state, growth, and lifecycle ([`Household`])
//! - [`financial_manager`] -- Per-step household finances ([`FinancialManager`])
//! - [`savings_bank`] -- Bank collaborator trait and [`Sparkasse`]
//!
//! # Worker identity
//!
//! Each worker lives exactly once, in the [`Workforce`]. The registry and
//! employers hold [`AgentId`](warengeld_types::AgentId) handles. When a
//! household exits, its worker is removed from the workforce and
//! deregistered; employers drop the stale handle on their next
//! [`Company::adjust_employees`].

pub mod company;
pub mod config;
pub mod error;
pub mod financial_manager;
pub mod household;
pub mod labor_market;
pub mod savings_bank;
pub mod worker;

// Re-export primary types at crate root for convenience.
pub use company::{Company, CompanyOutcome, CompanySeed, StaffingChange, WagePayment};
pub use config::{BankParams, CompanyParams, HealthThresholds, HouseholdParams, LaborParams};
pub use error::AgentError;
pub use financial_manager::{
    FinancialActivity, FinancialManager, FinancialRecord, FinancialSummary, MAX_HISTORY,
    SplitFunding,
};
pub use household::{Household, HouseholdSeed, LifeStage};
pub use labor_market::{JobOffer, Registry, WorkerMatch};
pub use savings_bank::{SavingsBank, SavingsWriteOff, Sparkasse};
pub use worker::{Worker, Workforce};
