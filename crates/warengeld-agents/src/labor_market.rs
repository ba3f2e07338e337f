//! The labor market registry.
//!
//! The [`Registry`] keeps two insertion-ordered collections:
//!
//! - **Registered workers**: the pool of labor supply, with set semantics
//!   (registering twice is a no-op).
//! - **Job offers**: the queue of employer requests for the current step.
//!
//! Matching walks the offers in registration order and fills each from the
//! unemployed registered workers in registry order. It is deterministic:
//! first registered, first matched. The offer queue is cleared after every
//! matching pass, filled or not.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use warengeld_types::{AgentId, AgentKind, Identified};

use crate::config::LaborParams;
use crate::worker::Workforce;

/// An employer's request for workers, consumed by one matching pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOffer {
    /// The employer placing the offer.
    pub employer: AgentId,
    /// Wage paid to each matched worker.
    pub wage: Decimal,
    /// Positions to fill (always > 0).
    pub positions: usize,
}

/// One worker matched to one employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMatch {
    /// The matched worker.
    pub worker: AgentId,
    /// The employer that placed the offer.
    pub employer: AgentId,
    /// The agreed wage.
    pub wage: Decimal,
}

/// The labor market: registered workers plus pending job offers.
#[derive(Debug, Clone)]
pub struct Registry {
    id: AgentId,
    default_wage: Option<Decimal>,
    registered_workers: Vec<AgentId>,
    membership: BTreeSet<AgentId>,
    job_offers: Vec<JobOffer>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new(params: &LaborParams) -> Self {
        Self {
            id: AgentId::new(),
            default_wage: params.default_wage,
            registered_workers: Vec::new(),
            membership: BTreeSet::new(),
            job_offers: Vec::new(),
        }
    }

    /// The configured default wage, if any.
    pub const fn default_wage(&self) -> Option<Decimal> {
        self.default_wage
    }

    /// Registered workers in registration order.
    pub fn registered_workers(&self) -> &[AgentId] {
        &self.registered_workers
    }

    /// Pending job offers in registration order.
    pub fn job_offers(&self) -> &[JobOffer] {
        &self.job_offers
    }

    /// Whether `worker` is in the registered pool.
    pub fn is_registered(&self, worker: AgentId) -> bool {
        self.membership.contains(&worker)
    }

    /// Registered workers that exist in `workforce` and are not employed,
    /// in registry order.
    pub fn available_workers(&self, workforce: &Workforce) -> Vec<AgentId> {
        self.registered_workers
            .iter()
            .copied()
            .filter(|id| workforce.get(*id).is_some_and(|w| !w.is_employed()))
            .collect()
    }

    /// Add `worker` to the pool. Registering twice is a no-op.
    pub fn register_worker(&mut self, worker: AgentId) {
        if self.membership.insert(worker) {
            self.registered_workers.push(worker);
            debug!(worker = %worker, "Worker registered");
        }
    }

    /// Remove `worker` from the pool.
    ///
    /// Returns `true` if the worker was registered. Calling it again
    /// returns `false`.
    pub fn deregister_worker(&mut self, worker: AgentId) -> bool {
        if !self.membership.remove(&worker) {
            return false;
        }
        self.registered_workers.retain(|id| *id != worker);
        debug!(worker = %worker, "Worker deregistered");
        true
    }

    /// Swap `old` for `new` in one operation.
    ///
    /// `new` takes `old`'s position when `old` was registered; otherwise
    /// `new` is simply registered.
    pub fn replace_worker(&mut self, old: AgentId, new: AgentId) {
        if old == new {
            self.register_worker(new);
            return;
        }
        if self.membership.contains(&new) {
            // Already in the pool: only drop the old identity.
            self.deregister_worker(old);
            return;
        }
        if self.membership.remove(&old) {
            if let Some(slot) = self.registered_workers.iter_mut().find(|id| **id == old) {
                *slot = new;
            }
            self.membership.insert(new);
            debug!(old = %old, new = %new, "Worker identity replaced");
        } else {
            self.register_worker(new);
        }
    }

    /// Queue an offer for `positions` workers at `wage`.
    ///
    /// Offers with zero positions are ignored.
    pub fn register_job_offer(&mut self, employer: AgentId, wage: Decimal, positions: usize) {
        if positions == 0 {
            warn!(employer = %employer, "Ignoring job offer with zero positions");
            return;
        }
        self.job_offers.push(JobOffer {
            employer,
            wage,
            positions,
        });
        debug!(employer = %employer, wage = %wage, positions, "Job offer registered");
    }

    /// Fill the queued offers from unemployed registered workers.
    ///
    /// Each matched worker is hired at the offer's wage. The offer queue is
    /// cleared afterwards, including offers that could not be filled.
    pub fn match_workers_to_jobs(&mut self, workforce: &mut Workforce) -> Vec<WorkerMatch> {
        let offers = std::mem::take(&mut self.job_offers);
        let mut matches = Vec::new();

        for offer in &offers {
            let mut filled: usize = 0;
            for worker_id in &self.registered_workers {
                if filled >= offer.positions {
                    break;
                }
                let Some(worker) = workforce.get_mut(*worker_id) else {
                    continue;
                };
                if worker.is_employed() {
                    continue;
                }
                worker.hire(offer.wage);
                filled = filled.saturating_add(1);
                matches.push(WorkerMatch {
                    worker: *worker_id,
                    employer: offer.employer,
                    wage: offer.wage,
                });
            }

            if filled < offer.positions {
                debug!(
                    employer = %offer.employer,
                    filled,
                    requested = offer.positions,
                    "Job offer partially filled; remainder discarded"
                );
            }
        }

        if !matches.is_empty() {
            info!(
                matches = matches.len(),
                offers = offers.len(),
                "Labor market matched workers"
            );
        }
        matches
    }

    /// Run one labor market step: match, then apply the default wage floor.
    pub fn step(&mut self, current_step: u64, workforce: &mut Workforce) -> Vec<WorkerMatch> {
        let matches = self.match_workers_to_jobs(workforce);

        if let Some(wage) = self.default_wage {
            let mut floored: usize = 0;
            for worker_id in &self.registered_workers {
                if workforce
                    .get_mut(*worker_id)
                    .is_some_and(|w| w.apply_wage_floor(wage))
                {
                    floored = floored.saturating_add(1);
                }
            }
            if floored > 0 {
                debug!(step = current_step, floored, wage = %wage, "Applied default wage floor");
            }
        }

        matches
    }
}

impl Identified for Registry {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn agent_kind(&self) -> AgentKind {
        AgentKind::LaborMarket
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn setup(workers: usize) -> (Registry, Workforce, Vec<AgentId>) {
        let mut registry = Registry::new(&LaborParams::default());
        let mut workforce = Workforce::new();
        let mut ids = Vec::new();
        for _ in 0..workers {
            let id = AgentId::new();
            workforce.enroll(id);
            registry.register_worker(id);
            ids.push(id);
        }
        (registry, workforce, ids)
    }

    #[test]
    fn duplicate_registration_is_noop() {
        let (mut registry, _, ids) = setup(1);
        registry.register_worker(*ids.first().unwrap());
        assert_eq!(registry.registered_workers().len(), 1);
    }

    #[test]
    fn deregistration_is_idempotent() {
        let (mut registry, _, ids) = setup(2);
        for id in &ids {
            assert!(registry.deregister_worker(*id));
            assert!(!registry.deregister_worker(*id));
            assert!(!registry.deregister_worker(*id));
        }
        assert!(registry.registered_workers().is_empty());
    }

    #[test]
    fn three_positions_among_five_workers() {
        let (mut registry, mut workforce, ids) = setup(5);
        let employer = AgentId::new();
        registry.register_job_offer(employer, dec!(60), 3);

        let matches = registry.match_workers_to_jobs(&mut workforce);

        assert_eq!(matches.len(), 3);
        assert!(registry.job_offers().is_empty());
        assert_eq!(workforce.employed_count(), 3);
        assert_eq!(registry.available_workers(&workforce).len(), 2);

        // First registered, first matched.
        let matched: Vec<AgentId> = matches.iter().map(|m| m.worker).collect();
        assert_eq!(matched.as_slice(), ids.get(..3).unwrap_or_default());
        for m in &matches {
            assert_eq!(m.wage, dec!(60));
            assert_eq!(
                workforce.get(m.worker).and_then(crate::worker::Worker::current_wage),
                Some(dec!(60))
            );
        }
    }

    #[test]
    fn matching_is_deterministic() {
        let (mut registry, mut workforce, ids) = setup(6);
        let mut other_registry = registry.clone();
        let mut other_workforce = workforce.clone();
        let a = AgentId::new();
        let b = AgentId::new();

        for r in [&mut registry, &mut other_registry] {
            r.register_job_offer(a, dec!(20), 2);
            r.register_job_offer(b, dec!(30), 3);
        }

        let first = registry.match_workers_to_jobs(&mut workforce);
        let second = other_registry.match_workers_to_jobs(&mut other_workforce);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert!(first.iter().take(2).all(|m| m.employer == a));
        assert_eq!(first.last().map(|m| m.worker), ids.get(4).copied());
    }

    #[test]
    fn unfilled_offers_are_discarded() {
        let (mut registry, mut workforce, _) = setup(1);
        registry.register_job_offer(AgentId::new(), dec!(10), 4);
        let matches = registry.match_workers_to_jobs(&mut workforce);
        assert_eq!(matches.len(), 1);
        assert!(registry.job_offers().is_empty());

        // Nothing carries over to the next pass.
        assert!(registry.match_workers_to_jobs(&mut workforce).is_empty());
    }

    #[test]
    fn empty_registry_yields_no_matches() {
        let (mut registry, mut workforce, _) = setup(0);
        registry.register_job_offer(AgentId::new(), dec!(10), 2);
        assert!(registry.match_workers_to_jobs(&mut workforce).is_empty());
    }

    #[test]
    fn zero_position_offer_ignored() {
        let (mut registry, _, _) = setup(0);
        registry.register_job_offer(AgentId::new(), dec!(10), 0);
        assert!(registry.job_offers().is_empty());
    }

    #[test]
    fn replace_keeps_position() {
        let (mut registry, _, ids) = setup(3);
        let successor = AgentId::new();
        let old = ids.get(1).copied().unwrap();
        registry.replace_worker(old, successor);

        assert!(!registry.is_registered(old));
        assert!(registry.is_registered(successor));
        assert_eq!(registry.registered_workers().get(1), Some(&successor));
        assert_eq!(registry.registered_workers().len(), 3);
    }

    #[test]
    fn replace_unregistered_registers_new() {
        let (mut registry, _, _) = setup(1);
        let new = AgentId::new();
        registry.replace_worker(AgentId::new(), new);
        assert!(registry.is_registered(new));
        assert_eq!(registry.registered_workers().len(), 2);
    }

    #[test]
    fn replace_with_registered_worker_drops_old() {
        let (mut registry, _, ids) = setup(3);
        let old = ids.first().copied().unwrap();
        let middle = ids.get(1).copied().unwrap();
        let new = ids.get(2).copied().unwrap();

        registry.replace_worker(old, new);

        assert!(!registry.is_registered(old));
        assert_eq!(registry.registered_workers().len(), 2);
        // `new` is not duplicated and keeps its own slot after the shift.
        assert_eq!(registry.registered_workers(), [middle, new].as_slice());
    }

    #[test]
    fn step_floors_unmatched_workers() {
        let (mut registry, mut workforce, ids) = setup(3);
        registry.register_job_offer(AgentId::new(), dec!(60), 1);

        let matches = registry.step(1, &mut workforce);
        assert_eq!(matches.len(), 1);

        for id in ids.iter().skip(1) {
            let worker = workforce.get(*id);
            assert!(worker.is_some_and(|w| !w.is_employed() && w.current_wage() == Some(dec!(10))));
        }
    }
}
