//! Configuration, economy state, tick cycle, and runner for the Warengeld
//! economy simulation.
//!
//! This crate wires the agent and fiscal crates into an ordered tick:
//! labor market, employers, fiscal cycle, households, savings bank, and a
//! money conservation audit.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `warengeld-config.yaml` into
//!   strongly-typed structs.
//! - [`economy`] -- The [`Economy`] state bundle, seeding, and snapshots.
//! - [`tick`] -- The phased tick cycle.
//! - [`runner`] -- The bounded simulation loop.

pub mod config;
pub mod economy;
pub mod runner;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use economy::{Economy, EconomySnapshot};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use tick::{TickError, TickSummary, run_tick};
