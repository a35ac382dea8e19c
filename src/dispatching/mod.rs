//! Allocation strategies.
//!
//! A [`Dispatcher`] is bound to one [`Simulation`] and fills its
//! assignments with one of three strategies:
//!
//! | Strategy | Idea | Guarantee |
//! |----------|------|-----------|
//! | Linear | each settler, in name order, takes its best free resource | bijection, no envy bound |
//! | MAX-LEF | peel maximal independent sets of the adversary graph, repeat over random orders | `\|I\|/n`-approximation per round |
//! | Switch | linear baseline, then random adversary swaps kept only if envy drops | envy never increases |
//!
//! Every strategy refuses to run on an unstable colony
//! ([`ColonyError::Unstable`]) and starts from a cleared allocation.
//! Randomness comes from the RNG handed to [`Dispatcher::new`], so a
//! seeded RNG reproduces a run exactly.
//!
//! # Usage
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_colony::dispatching::Dispatcher;
//! use u_colony::simulation::Simulation;
//!
//! let mut sim = Simulation::random(8, 2, &mut SmallRng::seed_from_u64(1));
//! let mut dispatcher = Dispatcher::new(&mut sim, SmallRng::seed_from_u64(42));
//! let report = dispatcher.max_lef_dispatch(8).unwrap();
//! assert_eq!(report.jealous, sim.count_jealous());
//! assert!(sim.is_fully_assigned());
//! ```
//!
//! # References
//!
//! - Beynier et al. (2019), "Local envy-freeness in house allocation problems"
//! - Luby (1986), "A simple parallel algorithm for the maximal independent set problem"

mod config;
mod linear;
mod max_lef;
mod switch;

pub use config::{DispatchConfig, DispatchStrategy, ParseStrategyError};
pub use max_lef::maximal_independent_set;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::warn;

use crate::error::{ColonyError, ColonyResult};
use crate::simulation::Simulation;

/// One explored MAX-LEF instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceRecord {
    /// Jealous settlers at the end of the instance.
    pub jealous: usize,
    /// Number of independent-set extractions until every settler was served.
    pub rounds: usize,
    /// Size of the first independent set (settlers served their top choice).
    pub first_independent: usize,
}

/// Outcome of a dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Strategy that produced the allocation.
    pub strategy: DispatchStrategy,
    /// Jealous settlers in the committed allocation.
    pub jealous: usize,
    /// Settlers in the colony.
    pub settlers: usize,
    /// Explored MAX-LEF instances, in execution order.
    pub instances: Vec<InstanceRecord>,
    /// Jealous settlers after the linear baseline (switch dispatch only).
    pub baseline_jealous: Option<usize>,
    /// Switch trials performed.
    pub trials: usize,
    /// Switch trials that were kept.
    pub accepted_switches: usize,
}

impl DispatchReport {
    fn new(strategy: DispatchStrategy, settlers: usize) -> Self {
        Self {
            strategy,
            settlers,
            ..Default::default()
        }
    }

    /// Fraction of settlers that are locally envy-free.
    pub fn lef_rate(&self) -> f64 {
        if self.settlers == 0 {
            1.0
        } else {
            (self.settlers - self.jealous) as f64 / self.settlers as f64
        }
    }

    /// Best `|I|/n` ratio over the explored MAX-LEF instances.
    ///
    /// `None` for other strategies or an empty colony.
    pub fn approximation_ratio(&self) -> Option<f64> {
        if self.settlers == 0 {
            return None;
        }
        self.instances
            .iter()
            .map(|i| i.first_independent)
            .max()
            .map(|size| size as f64 / self.settlers as f64)
    }
}

/// Allocation algorithm host bound to one simulation.
///
/// Holds no state of its own besides the random source; every strategy
/// mutates the bound simulation in place and runs to completion.
#[derive(Debug)]
pub struct Dispatcher<'a, R = SmallRng> {
    simulation: &'a mut Simulation,
    rng: R,
}

impl<'a> Dispatcher<'a, SmallRng> {
    /// Creates a dispatcher with a seeded [`SmallRng`].
    pub fn seeded(simulation: &'a mut Simulation, seed: u64) -> Self {
        Self::new(simulation, SmallRng::seed_from_u64(seed))
    }

    /// Creates a dispatcher whose RNG follows `config.seed`
    /// (OS entropy when unset).
    pub fn from_config(simulation: &'a mut Simulation, config: &DispatchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::new(simulation, rng)
    }
}

impl<'a, R: Rng> Dispatcher<'a, R> {
    /// Binds a dispatcher to `simulation` with an explicit random source.
    pub fn new(simulation: &'a mut Simulation, rng: R) -> Self {
        Self { simulation, rng }
    }

    /// Runs the strategy selected by `config`.
    pub fn run(&mut self, config: &DispatchConfig) -> ColonyResult<DispatchReport> {
        let n = self.simulation.settler_count();
        match config.strategy {
            DispatchStrategy::Linear => self.linear_dispatch(),
            DispatchStrategy::MaxLef => self.max_lef_dispatch(config.instances_for(n)),
            DispatchStrategy::Switch => self.switch_dispatch(config.switches_for(n)),
        }
    }

    fn ensure_stable(&self) -> ColonyResult<()> {
        if self.simulation.check_stable() {
            Ok(())
        } else {
            warn!("dispatch refused: simulation is not stable");
            Err(ColonyError::Unstable)
        }
    }
}

/// Gives `settler` its best free resource.
///
/// # Errors
/// [`ColonyError::PreferencesExhausted`] if every ranked resource is held,
/// which a stable colony never produces.
fn claim_best(simulation: &mut Simulation, settler: &str) -> ColonyResult<String> {
    let best = simulation
        .settler(settler)
        .ok_or_else(|| ColonyError::unknown_settler(settler))?
        .best_available(|r| simulation.resource(r).is_some_and(|res| !res.is_held()))
        .map(str::to_string)
        .ok_or_else(|| ColonyError::PreferencesExhausted(settler.to_string()))?;

    simulation.assign(settler, &best)?;
    Ok(best)
}
