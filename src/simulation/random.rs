//! Random colony generation.
//!
//! Produces stable instances for experiments and tests: random adversary
//! graphs of bounded density and uniformly shuffled preferences.

use rand::seq::SliceRandom;
use rand::Rng;

use super::Simulation;

impl Simulation {
    /// Generates a stable colony of `n` settlers.
    ///
    /// Each settler draws `k` uniformly in `0..=max_adversaries` (capped at
    /// `n - 1`) and detests `k` distinct random other settlers. Edges are
    /// symmetric, so realized degrees can exceed `max_adversaries`. Each
    /// preference list is an independent shuffle of every resource.
    ///
    /// # Example
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::SmallRng;
    /// use u_colony::simulation::Simulation;
    ///
    /// let mut rng = SmallRng::seed_from_u64(7);
    /// let sim = Simulation::random(10, 3, &mut rng);
    /// assert!(sim.check_stable());
    /// ```
    pub fn random<R: Rng + ?Sized>(n: usize, max_adversaries: usize, rng: &mut R) -> Self {
        let mut sim = Simulation::new(n);
        let names = sim.settler_names();
        let resources: Vec<String> = sim.resources.keys().cloned().collect();
        let cap = max_adversaries.min(n.saturating_sub(1));

        for name in &names {
            let k = rng.random_range(0..=cap);
            let mut others: Vec<&String> = names.iter().filter(|o| *o != name).collect();
            others.shuffle(rng);
            for other in others.into_iter().take(k) {
                if let Some(s) = sim.settlers.get_mut(name) {
                    s.insert_adversary(other.clone());
                }
                if let Some(s) = sim.settlers.get_mut(other) {
                    s.insert_adversary(name.clone());
                }
            }

            let mut prefs = resources.clone();
            prefs.shuffle(rng);
            if let Some(s) = sim.settlers.get_mut(name) {
                s.set_preferences(prefs);
            }
        }
        sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_is_stable() {
        let mut rng = SmallRng::seed_from_u64(42);
        let sim = Simulation::random(26, 5, &mut rng);
        assert_eq!(sim.settler_count(), 26);
        assert!(sim.check_stable());
    }

    #[test]
    fn test_random_adversaries_symmetric_and_irreflexive() {
        let mut rng = SmallRng::seed_from_u64(42);
        let sim = Simulation::random(15, 4, &mut rng);
        for s in sim.settlers() {
            assert!(!s.detests(s.name()));
            for other in s.adversaries() {
                assert!(sim.settler(other).unwrap().detests(s.name()));
            }
        }
    }

    #[test]
    fn test_random_zero_density() {
        let mut rng = SmallRng::seed_from_u64(42);
        let sim = Simulation::random(5, 0, &mut rng);
        assert!(sim.settlers().all(|s| s.adversaries().is_empty()));
    }

    #[test]
    fn test_random_seed_reproducible() {
        let a = Simulation::random(12, 3, &mut SmallRng::seed_from_u64(9));
        let b = Simulation::random(12, 3, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_random_single_settler() {
        let mut rng = SmallRng::seed_from_u64(42);
        let sim = Simulation::random(1, 3, &mut rng);
        assert!(sim.check_stable());
        assert!(sim.settler("A1").unwrap().adversaries().is_empty());
    }
}
