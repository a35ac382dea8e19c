//! Linear (greedy) dispatch.
//!
//! # Algorithm
//!
//! 1. Clear the allocation.
//! 2. Visit settlers in name order.
//! 3. Give each its first free resource in its own ranking.
//!
//! Each step removes exactly one resource from the pool, so a stable
//! colony always ends as a bijection. The envy outcome depends entirely
//! on the visiting order.
//!
//! # Complexity
//! O(n²) resource checks for n settlers.

use rand::Rng;
use tracing::info;

use super::{claim_best, DispatchReport, DispatchStrategy, Dispatcher};
use crate::error::ColonyResult;

impl<R: Rng> Dispatcher<'_, R> {
    /// Assigns every settler its best free resource, in name order.
    ///
    /// # Errors
    /// - [`ColonyError::Unstable`](crate::error::ColonyError::Unstable) if
    ///   the colony is not stable.
    /// - [`ColonyError::PreferencesExhausted`](crate::error::ColonyError::PreferencesExhausted)
    ///   if a settler finds nothing free (broken invariant).
    pub fn linear_dispatch(&mut self) -> ColonyResult<DispatchReport> {
        self.ensure_stable()?;
        self.simulation.clear();

        for name in self.simulation.settler_names() {
            claim_best(self.simulation, &name)?;
        }

        let mut report = DispatchReport::new(
            DispatchStrategy::Linear,
            self.simulation.settler_count(),
        );
        report.jealous = self.simulation.count_jealous();
        info!(jealous = report.jealous, "linear dispatch complete");
        Ok(report)
    }
}
