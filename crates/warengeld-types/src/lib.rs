//! Shared type definitions for the Warengeld economy simulation.
//!
//! This crate is the single source of truth for identifiers, enums, and the
//! capability traits that let the fiscal cycle assess agents without
//! depending on their concrete types.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agent and ledger identifiers
//! - [`enums`] -- Agent kinds, company status, levy and money-flow categories
//! - [`capability`] -- `Identified`, `Balance`, `Billable`, `LandHolding`,
//!   `EnvironmentalImpact`, and the `FiscalSubject` capability hub
//! - [`structs`] -- Levy receipts, waste deliveries, and money-ledger entries

pub mod capability;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use capability::{
    Balance, Billable, EnvironmentalImpact, FiscalSubject, Identified, LandHolding,
};
pub use enums::{AgentKind, CompanyStatus, FlowKind, LevyKind};
pub use ids::{AgentId, LedgerEntryId};
pub use structs::{Levy, MoneyEntry, Party, WasteDelivery};
