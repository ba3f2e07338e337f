//! The fiscal cycle of the Warengeld economy simulation: the state treasury,
//! the environmental agency, and the recycling company.
//!
//! Fiscal actors never see concrete agent types. They iterate a snapshot of
//! [`FiscalSubject`](warengeld_types::FiscalSubject) trait objects and use
//! whichever capabilities each agent declares (land, impact, balance).
//! Every amount levied is returned as a [`Levy`](warengeld_types::Levy)
//! receipt so the caller can book it.
//!
//! # Modules
//!
//! - [`config`] -- Tax and environment parameters ([`TaxParams`], [`EnvironmentParams`])
//! - [`error`] -- [`FiscalError`]
//! - [`state`] -- Taxes, hyperwealth ceiling, budget distribution ([`State`])
//! - [`environmental_agency`] -- Environmental tax, audits, waste routing
//! - [`recycling`] -- Waste processing ([`RecyclingCompany`])
//!
//! # Order
//!
//! Within a step the state runs first (taxes, confiscation, distribution),
//! then the agency (tax once, then audit every agent), then the recycler
//! processes the waste the agency routed to it.

pub mod config;
pub mod environmental_agency;
pub mod error;
pub mod recycling;
pub mod state;

pub use config::{EnvironmentParams, TaxAllocation, TaxParams};
pub use environmental_agency::{
    AgencyReport, EnvTaxCollection, EnvironmentalAgency, MAX_IMPACT_STANDARD,
};
pub use error::FiscalError;
pub use recycling::RecyclingCompany;
pub use state::State;
