//! Allocation quality metrics (KPIs).
//!
//! Computes envy indicators from a dispatched colony.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Jealous | Settlers envying an adversary's resource |
//! | LEF Rate | Fraction of settlers that are locally envy-free |
//! | First-Choice Rate | Fraction of settlers holding their top-ranked resource |
//! | Mean Rank | Mean 0-based rank of the held resource |
//!
//! # Reference
//! Beynier et al. (2019), "Local envy-freeness in house allocation problems"

use serde::Serialize;

use crate::simulation::Simulation;

/// Allocation performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvyKpi {
    /// Settlers in the colony.
    pub settlers: usize,
    /// Settlers holding a resource.
    pub assigned: usize,
    /// Jealous settlers.
    pub jealous: usize,
    /// Names of the jealous settlers, sorted.
    pub jealous_names: Vec<String>,
    /// Fraction of settlers that are not jealous (0.0..1.0).
    pub lef_rate: f64,
    /// Fraction of settlers holding their first choice (0.0..1.0).
    pub first_choice_rate: f64,
    /// Mean 0-based rank of the held resource, over ranked settlers.
    pub mean_rank: f64,
}

impl EnvyKpi {
    /// Computes KPIs from the current allocation of `sim`.
    pub fn calculate(sim: &Simulation) -> Self {
        let settlers = sim.settler_count();
        let jealous_names: Vec<String> = sim
            .jealous_settlers()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut assigned = 0;
        let mut first_choice = 0;
        let mut rank_sum = 0usize;
        let mut ranked = 0usize;

        for settler in sim.settlers() {
            if settler.assignment().is_some() {
                assigned += 1;
            }
            if let Some(rank) = settler.assignment_rank() {
                ranked += 1;
                rank_sum += rank;
                if rank == 0 {
                    first_choice += 1;
                }
            }
        }

        let jealous = jealous_names.len();
        let lef_rate = if settlers == 0 {
            1.0
        } else {
            (settlers - jealous) as f64 / settlers as f64
        };
        let first_choice_rate = if settlers == 0 {
            0.0
        } else {
            first_choice as f64 / settlers as f64
        };
        let mean_rank = if ranked == 0 {
            0.0
        } else {
            rank_sum as f64 / ranked as f64
        };

        Self {
            settlers,
            assigned,
            jealous,
            jealous_names,
            lef_rate,
            first_choice_rate,
            mean_rank,
        }
    }

    /// Whether the allocation meets the given envy threshold.
    pub fn meets_threshold(&self, min_lef_rate: f64) -> bool {
        self.assigned == self.settlers && self.lef_rate >= min_lef_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(n: usize) -> Simulation {
        let mut sim = Simulation::new(n);
        let prefs: Vec<String> = (1..=n).map(|i| format!("R{i}")).collect();
        for name in sim.settler_names() {
            sim.set_preferences(&name, &prefs).unwrap();
        }
        sim
    }

    #[test]
    fn test_kpi_basic() {
        let mut sim = ranked(4);
        sim.set_adversary("A1", "B1").unwrap();
        for (s, r) in [("A1", "R1"), ("B1", "R2"), ("C1", "R3"), ("D1", "R4")] {
            sim.assign(s, r).unwrap();
        }

        let kpi = EnvyKpi::calculate(&sim);
        assert_eq!(kpi.settlers, 4);
        assert_eq!(kpi.assigned, 4);
        assert_eq!(kpi.jealous, 1);
        assert_eq!(kpi.jealous_names, vec!["B1".to_string()]);
        assert!((kpi.lef_rate - 0.75).abs() < 1e-10);
        assert!((kpi.first_choice_rate - 0.25).abs() < 1e-10);
        assert!((kpi.mean_rank - 1.5).abs() < 1e-10); // (0+1+2+3)/4
        assert!(kpi.meets_threshold(0.75));
        assert!(!kpi.meets_threshold(0.8));
    }

    #[test]
    fn test_kpi_partial_allocation() {
        let mut sim = ranked(3);
        sim.assign("A1", "R2").unwrap();

        let kpi = EnvyKpi::calculate(&sim);
        assert_eq!(kpi.assigned, 1);
        assert_eq!(kpi.jealous, 0);
        assert!((kpi.mean_rank - 1.0).abs() < 1e-10);
        assert!((kpi.first_choice_rate - 0.0).abs() < 1e-10);
        assert!(!kpi.meets_threshold(0.0));
    }

    #[test]
    fn test_kpi_empty_colony() {
        let kpi = EnvyKpi::calculate(&Simulation::default());
        assert_eq!(kpi.settlers, 0);
        assert!((kpi.lef_rate - 1.0).abs() < 1e-10);
        assert!((kpi.mean_rank - 0.0).abs() < 1e-10);
        assert!(kpi.meets_threshold(1.0));
    }

    #[test]
    fn test_kpi_serializes() {
        let kpi = EnvyKpi::calculate(&ranked(2));
        let json = serde_json::to_value(&kpi).unwrap();
        assert_eq!(json["settlers"], 2);
        assert_eq!(json["jealous_names"], serde_json::json!([]));
    }
}
