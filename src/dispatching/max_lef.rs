//! MAX-LEF approximate dispatch.
//!
//! Maximizing the number of locally envy-free settlers is NP-complete,
//! so the allocation is built by peeling the adversary graph.
//!
//! # Algorithm
//!
//! One *instance*, for a random order of the settler pool `N`:
//! 1. Extract a maximal independent set `I` of `N`: pop settlers in
//!    order, keep each popped settler, drop its adversaries from this
//!    extraction (they are deferred, not excluded).
//! 2. Give each member of `I`, in pop order, its best free resource.
//!    Members of `I` are pairwise non-adversarial, so this round creates
//!    no envy among them.
//! 3. `N := N \ I`; repeat until `N` is empty (at most `n` rounds).
//!
//! A single extraction is a `|I|/n`-approximation of MAX-LEF on its
//! pool. The outcome depends on the pop order, so `instances` random
//! orders are explored and the allocation with the fewest jealous
//! settlers is committed.
//!
//! # Complexity
//! O(n² + n·d) per instance for n settlers of degree d, plus the envy
//! count.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use super::{claim_best, DispatchReport, DispatchStrategy, Dispatcher, InstanceRecord};
use crate::error::ColonyResult;
use crate::models::AllocationSnapshot;
use crate::simulation::Simulation;

/// Extracts a maximal independent set of `pool` under the adversary
/// relation.
///
/// Settlers are popped in `pool` order; each popped settler joins the set
/// and its adversaries are removed from the remaining queue. The result
/// keeps pop order. Names unknown to `sim` have no adversaries.
pub fn maximal_independent_set(sim: &Simulation, pool: &[String]) -> Vec<String> {
    let mut queue: VecDeque<&String> = pool.iter().collect();
    let mut independent = Vec::new();

    while let Some(name) = queue.pop_front() {
        if let Some(settler) = sim.settler(name) {
            queue.retain(|other| !settler.detests(other));
        }
        independent.push(name.clone());
    }

    independent
}

impl<R: Rng> Dispatcher<'_, R> {
    /// Runs `instances` randomized MAX-LEF instances and commits the best.
    ///
    /// The committed jealous count is never above the count of any
    /// explored instance. `instances == 0` runs a single instance.
    ///
    /// # Errors
    /// - [`ColonyError::Unstable`](crate::error::ColonyError::Unstable) if
    ///   the colony is not stable.
    /// - [`ColonyError::PreferencesExhausted`](crate::error::ColonyError::PreferencesExhausted)
    ///   if an independent settler finds nothing free (broken invariant).
    pub fn max_lef_dispatch(&mut self, instances: usize) -> ColonyResult<DispatchReport> {
        self.ensure_stable()?;

        let mut report =
            DispatchReport::new(DispatchStrategy::MaxLef, self.simulation.settler_count());
        let mut order = self.simulation.settler_names();
        let mut best: Option<(usize, AllocationSnapshot)> = None;

        for instance in 0..instances.max(1) {
            self.simulation.clear();
            order.shuffle(&mut self.rng);

            let record = self.peel(&order)?;
            debug!(
                instance,
                jealous = record.jealous,
                rounds = record.rounds,
                first_independent = record.first_independent,
                "MAX-LEF instance"
            );

            if best.as_ref().map_or(true, |(min, _)| record.jealous < *min) {
                best = Some((record.jealous, self.simulation.snapshot_assignments()));
            }
            report.instances.push(record);
        }

        if let Some((_, snapshot)) = best {
            self.simulation.apply_assignments(&snapshot)?;
        }
        report.jealous = self.simulation.count_jealous();
        info!(
            instances = report.instances.len(),
            jealous = report.jealous,
            "MAX-LEF dispatch complete"
        );
        Ok(report)
    }

    /// Serves the whole pool by successive independent-set extractions.
    fn peel(&mut self, order: &[String]) -> ColonyResult<InstanceRecord> {
        let mut pool: Vec<String> = order.to_vec();
        let mut rounds = 0;
        let mut first_independent = 0;

        while !pool.is_empty() {
            let independent = maximal_independent_set(self.simulation, &pool);
            for name in &independent {
                claim_best(self.simulation, name)?;
            }
            if rounds == 0 {
                first_independent = independent.len();
            }
            rounds += 1;

            let served: HashSet<&String> = independent.iter().collect();
            pool.retain(|name| !served.contains(name));
        }

        Ok(InstanceRecord {
            jealous: self.simulation.count_jealous(),
            rounds,
            first_independent,
        })
    }
}
