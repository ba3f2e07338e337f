//! The worker table: the single authoritative record of labor supply.
//!
//! Each household participating in the labor market has one [`Worker`]
//! entry in the [`Workforce`]. The registry and employers refer to workers
//! only by [`AgentId`] handle, so there is exactly one place where a
//! worker's employment status lives.
//!
//! [`Worker::hire`] and [`Worker::release`] are the only operations that
//! change `employed`, and each sets `current_wage` alongside it:
//!
//! - employed workers always carry a wage;
//! - released workers never keep a stale wage.
//!
//! The one deliberate exception is [`Worker::apply_wage_floor`], which gives
//! an unemployed worker the registry's default wage so downstream
//! consumption logic has an income reference.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use warengeld_types::AgentId;

/// A household acting as labor supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    id: AgentId,
    employed: bool,
    current_wage: Option<Decimal>,
}

impl Worker {
    /// A new, unemployed worker without a wage.
    pub const fn new(id: AgentId) -> Self {
        Self {
            id,
            employed: false,
            current_wage: None,
        }
    }

    /// The household this worker belongs to.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Whether the worker currently holds a job.
    pub const fn is_employed(&self) -> bool {
        self.employed
    }

    /// The wage the worker currently earns or is floored at.
    pub const fn current_wage(&self) -> Option<Decimal> {
        self.current_wage
    }

    /// Mark the worker employed at `wage`.
    pub const fn hire(&mut self, wage: Decimal) {
        self.employed = true;
        self.current_wage = Some(wage);
    }

    /// Release the worker back to the market.
    pub const fn release(&mut self) {
        self.employed = false;
        self.current_wage = None;
    }

    /// Give an unemployed worker without a wage the default wage floor.
    ///
    /// Returns `true` if the floor was applied.
    pub const fn apply_wage_floor(&mut self, wage: Decimal) -> bool {
        if self.employed || self.current_wage.is_some() {
            return false;
        }
        self.current_wage = Some(wage);
        true
    }
}

/// All workers in the simulation, keyed by household id.
#[derive(Debug, Clone, Default)]
pub struct Workforce {
    workers: BTreeMap<AgentId, Worker>,
}

impl Workforce {
    /// An empty workforce.
    pub const fn new() -> Self {
        Self {
            workers: BTreeMap::new(),
        }
    }

    /// Add a worker for `id` if none exists and return it.
    pub fn enroll(&mut self, id: AgentId) -> &mut Worker {
        self.workers.entry(id).or_insert_with(|| Worker::new(id))
    }

    /// Remove a worker, e.g. when the household exits the simulation.
    pub fn remove(&mut self, id: AgentId) -> Option<Worker> {
        self.workers.remove(&id)
    }

    /// Look up a worker.
    pub fn get(&self, id: AgentId) -> Option<&Worker> {
        self.workers.get(&id)
    }

    /// Look up a worker mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Worker> {
        self.workers.get_mut(&id)
    }

    /// Whether a worker exists for `id`.
    pub fn contains(&self, id: AgentId) -> bool {
        self.workers.contains_key(&id)
    }

    /// Release a worker if present. Returns `true` if a worker was found.
    pub fn release(&mut self, id: AgentId) -> bool {
        self.workers.get_mut(&id).map(Worker::release).is_some()
    }

    /// Number of workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the workforce is empty.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Number of employed workers.
    pub fn employed_count(&self) -> usize {
        self.workers.values().filter(|w| w.is_employed()).count()
    }

    /// Iterate workers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }
}
