//! Switch (local search) dispatch.
//!
//! # Algorithm
//!
//! 1. Build a linear allocation as the baseline.
//! 2. Repeat `k` times: pick a random settler `p`; if `p` has
//!    adversaries, pick one of them `q` at random and exchange their
//!    resources. Keep the exchange only if the jealous count strictly
//!    drops, otherwise exchange back.
//!
//! Each trial either strictly improves the allocation or leaves it
//! untouched, so the final count is never above the baseline.
//!
//! # Complexity
//! O(k·n·d) for n settlers of degree d (one envy count per trial).

use rand::Rng;
use tracing::{debug, info};

use super::{DispatchReport, DispatchStrategy, Dispatcher};
use crate::error::ColonyResult;

impl<R: Rng> Dispatcher<'_, R> {
    /// Refines a linear allocation with `k` random adversary switches.
    ///
    /// Trials drawn on a settler without adversaries still count towards
    /// `k`.
    ///
    /// # Errors
    /// [`ColonyError::Unstable`](crate::error::ColonyError::Unstable) if
    /// the colony is not stable.
    pub fn switch_dispatch(&mut self, k: usize) -> ColonyResult<DispatchReport> {
        let baseline = self.linear_dispatch()?;

        let mut report = DispatchReport::new(DispatchStrategy::Switch, baseline.settlers);
        report.baseline_jealous = Some(baseline.jealous);

        let names = self.simulation.settler_names();
        let mut current = baseline.jealous;

        for _ in 0..k {
            report.trials += 1;
            if names.is_empty() {
                continue;
            }
            let p = &names[self.rng.random_range(0..names.len())];
            let Some(q) = self.random_adversary(p) else {
                continue;
            };

            self.simulation.switch_assignments(p, &q)?;
            let candidate = self.simulation.count_jealous();
            if candidate < current {
                debug!(p = %p, q = %q, from = current, to = candidate, "switch kept");
                current = candidate;
                report.accepted_switches += 1;
            } else {
                self.simulation.switch_assignments(p, &q)?;
            }
        }

        report.jealous = self.simulation.count_jealous();
        info!(
            baseline = baseline.jealous,
            jealous = report.jealous,
            trials = report.trials,
            accepted = report.accepted_switches,
            "switch dispatch complete"
        );
        Ok(report)
    }

    fn random_adversary(&mut self, settler: &str) -> Option<String> {
        let adversaries = self.simulation.settler(settler)?.adversaries();
        if adversaries.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..adversaries.len());
        adversaries.iter().nth(idx).cloned()
    }
}
