//! Dispatch configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allocation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchStrategy {
    /// Greedy pass in name order.
    Linear,
    /// Repeated independent-set peeling over random orders.
    #[default]
    MaxLef,
    /// Linear baseline refined by random adversary swaps.
    Switch,
}

impl DispatchStrategy {
    /// All strategies, in menu order.
    pub fn all() -> [DispatchStrategy; 3] {
        [Self::Linear, Self::MaxLef, Self::Switch]
    }

    /// Short identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::MaxLef => "max-lef",
            Self::Switch => "switch",
        }
    }

    /// Strategy description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Linear => "each settler takes its best free resource, in name order",
            Self::MaxLef => "MAX-LEF |I|/n-approximation, best of k random orders",
            Self::Switch => "linear baseline, then k random adversary swaps kept if envy drops",
        }
    }
}

impl fmt::Display for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (expected linear, max-lef or switch)")]
pub struct ParseStrategyError(pub String);

impl FromStr for DispatchStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "1" => Ok(Self::Linear),
            "max-lef" | "maxlef" | "max_lef" | "lef" | "2" => Ok(Self::MaxLef),
            "switch" | "3" => Ok(Self::Switch),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

/// Parameters of a dispatch run.
///
/// Unset trial counts default to the number of settlers.
///
/// # Example
///
/// ```
/// use u_colony::dispatching::{DispatchConfig, DispatchStrategy};
///
/// let config = DispatchConfig::default()
///     .with_strategy(DispatchStrategy::Switch)
///     .with_param(50)
///     .with_seed(7);
/// assert_eq!(config.switches_for(10), 50);
/// assert_eq!(config.instances_for(10), 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Strategy to run.
    pub strategy: DispatchStrategy,
    /// MAX-LEF instances to explore.
    #[serde(default)]
    pub instances: Option<usize>,
    /// Switch trials to perform.
    #[serde(default)]
    pub switches: Option<usize>,
    /// RNG seed; OS entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl DispatchConfig {
    /// Creates a configuration for `strategy` with default parameters.
    pub fn new(strategy: DispatchStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: DispatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the MAX-LEF instance count.
    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = Some(instances);
        self
    }

    /// Sets the switch trial count.
    pub fn with_switches(mut self, switches: usize) -> Self {
        self.switches = Some(switches);
        self
    }

    /// Sets the parameter of the selected strategy (ignored for linear).
    pub fn with_param(self, k: usize) -> Self {
        match self.strategy {
            DispatchStrategy::Linear => self,
            DispatchStrategy::MaxLef => self.with_instances(k),
            DispatchStrategy::Switch => self.with_switches(k),
        }
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// MAX-LEF instances for a colony of `settlers`.
    pub fn instances_for(&self, settlers: usize) -> usize {
        self.instances.unwrap_or(settlers)
    }

    /// Switch trials for a colony of `settlers`.
    pub fn switches_for(&self, settlers: usize) -> usize {
        self.switches.unwrap_or(settlers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("linear".parse::<DispatchStrategy>(), Ok(DispatchStrategy::Linear));
        assert_eq!("MAX-LEF".parse::<DispatchStrategy>(), Ok(DispatchStrategy::MaxLef));
        assert_eq!("maxlef".parse::<DispatchStrategy>(), Ok(DispatchStrategy::MaxLef));
        assert_eq!("3".parse::<DispatchStrategy>(), Ok(DispatchStrategy::Switch));
        assert_eq!(
            "Annealing".parse::<DispatchStrategy>(),
            Err(ParseStrategyError("Annealing".into()))
        );
        assert_eq!(
            ParseStrategyError("x".into()).to_string(),
            "unknown strategy 'x' (expected linear, max-lef or switch)"
        );
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for s in DispatchStrategy::all() {
            assert_eq!(s.to_string().parse::<DispatchStrategy>(), Ok(s));
        }
    }

    #[test]
    fn test_with_param_targets_strategy() {
        let lef = DispatchConfig::new(DispatchStrategy::MaxLef).with_param(5);
        assert_eq!(lef.instances, Some(5));
        assert_eq!(lef.switches, None);

        let linear = DispatchConfig::new(DispatchStrategy::Linear).with_param(5);
        assert_eq!(linear, DispatchConfig::new(DispatchStrategy::Linear));
    }

    #[test]
    fn test_config_json() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{"strategy":"switch","switches":12}"#).unwrap();
        assert_eq!(config.strategy, DispatchStrategy::Switch);
        assert_eq!(config.switches_for(4), 12);
        assert_eq!(config.instances_for(4), 4);
        assert_eq!(config.seed, None);
    }
}
