//! Colony simulation aggregate.
//!
//! [`Simulation`] exclusively owns the settlers and resources of one
//! allocation problem and is the only place where cross-entity
//! invariants are maintained:
//!
//! - adversary edges are symmetric and irreflexive,
//! - a resource is held iff exactly one settler is bound to it,
//! - once loading is finished, `|settlers| == |resources|`.
//!
//! Settlers reference each other and their resources by name; every
//! lookup goes through the aggregate's maps. Maps are ordered so that
//! iteration (and hence seeded dispatch runs) is reproducible.
//!
//! # Example
//!
//! ```
//! use u_colony::simulation::Simulation;
//!
//! let mut sim = Simulation::new(2);
//! sim.set_preferences("A1", &["R1", "R2"]).unwrap();
//! sim.set_preferences("B1", &["R1", "R2"]).unwrap();
//! sim.set_adversary("A1", "B1").unwrap();
//! sim.assign("A1", "R1").unwrap();
//! sim.assign("B1", "R2").unwrap();
//! assert_eq!(sim.count_jealous(), 1);
//! ```

mod random;

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::error::{ColonyError, ColonyResult};
use crate::models::{AllocationSnapshot, Resource, Settler};

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Placeholder name of the `i`-th settler (1-based): `A1..Z1, A2..Z2, ...`.
pub fn placeholder_settler_name(i: usize) -> String {
    let i = i.max(1) - 1;
    format!("{}{}", ALPHABET[i % 26] as char, i / 26 + 1)
}

/// Placeholder name of the `i`-th resource (1-based): `R1..Rn`.
pub fn placeholder_resource_name(i: usize) -> String {
    format!("R{i}")
}

/// The settlers and resources of one allocation problem.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    resources: BTreeMap<String, Resource>,
    settlers: BTreeMap<String, Settler>,
}

impl Simulation {
    /// Creates `n` settlers and `n` resources with placeholder names.
    ///
    /// Settlers start with no preferences and no adversaries.
    pub fn new(n: usize) -> Self {
        let mut sim = Self::default();
        for i in 1..=n {
            let settler = placeholder_settler_name(i);
            let resource = placeholder_resource_name(i);
            sim.settlers.insert(settler.clone(), Settler::new(settler));
            sim.resources
                .insert(resource.clone(), Resource::placeholder(resource));
        }
        sim
    }

    /// Builds a simulation from pre-built entities.
    ///
    /// Names are expected to be unique; a later entity with an already
    /// seen name replaces the earlier one.
    pub fn from_entities<S, R>(settlers: S, resources: R) -> Self
    where
        S: IntoIterator<Item = Settler>,
        R: IntoIterator<Item = Resource>,
    {
        Self {
            resources: resources
                .into_iter()
                .map(|r| (r.name().to_string(), r))
                .collect(),
            settlers: settlers
                .into_iter()
                .map(|s| (s.name().to_string(), s))
                .collect(),
        }
    }

    pub fn settler_count(&self) -> usize {
        self.settlers.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Settlers in name order.
    pub fn settlers(&self) -> impl Iterator<Item = &Settler> {
        self.settlers.values()
    }

    /// Resources in name order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn settler(&self, name: &str) -> Option<&Settler> {
        self.settlers.get(name)
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Settler names in name order.
    pub fn settler_names(&self) -> Vec<String> {
        self.settlers.keys().cloned().collect()
    }

    fn require_settler(&self, name: &str) -> ColonyResult<&Settler> {
        self.settlers
            .get(name)
            .ok_or_else(|| ColonyError::unknown_settler(name))
    }

    fn require_resource(&self, name: &str) -> ColonyResult<&Resource> {
        self.resources
            .get(name)
            .ok_or_else(|| ColonyError::unknown_resource(name))
    }

    /// Binds `resource` to `settler` and marks it held.
    ///
    /// Returns `Ok(false)` without changing anything when the resource is
    /// already held; the caller should try another resource. A resource
    /// previously held by the settler is released.
    ///
    /// # Errors
    /// [`ColonyError::UnknownEntity`] if either name is absent.
    pub fn assign(&mut self, settler: &str, resource: &str) -> ColonyResult<bool> {
        self.require_settler(settler)?;
        if self.require_resource(resource)?.is_held() {
            warn!(
                settler,
                resource, "resource not assigned: it is already held"
            );
            return Ok(false);
        }

        if let Some(previous) = self.settlers[settler].assignment().map(str::to_string) {
            if let Some(r) = self.resources.get_mut(&previous) {
                r.assign_state(false);
            }
        }
        if let Some(s) = self.settlers.get_mut(settler) {
            s.set_assignment(Some(resource.to_string()));
        }
        if let Some(r) = self.resources.get_mut(resource) {
            r.assign_state(true);
        }
        Ok(true)
    }

    /// Makes `a` and `b` adversaries of each other.
    ///
    /// # Errors
    /// - [`ColonyError::UnknownEntity`] if either settler is absent.
    /// - [`ColonyError::InvalidOperation`] if `a == b`.
    pub fn set_adversary(&mut self, a: &str, b: &str) -> ColonyResult<()> {
        self.require_settler(a)?;
        self.require_settler(b)?;
        if a == b {
            return Err(ColonyError::InvalidOperation(format!(
                "settler '{a}' cannot detest itself"
            )));
        }
        if let Some(s) = self.settlers.get_mut(a) {
            s.add_adversary(b)?;
        }
        if let Some(s) = self.settlers.get_mut(b) {
            s.add_adversary(a)?;
        }
        Ok(())
    }

    /// Sets the ordered preferences of `settler`.
    ///
    /// Duplicates are not rejected here; [`Simulation::check_stable`]
    /// reports them.
    ///
    /// # Errors
    /// - [`ColonyError::UnknownEntity`] for an unknown settler or resource.
    /// - [`ColonyError::SizeMismatch`] if `preferences.len() != |resources|`.
    pub fn set_preferences<S: AsRef<str>>(
        &mut self,
        settler: &str,
        preferences: &[S],
    ) -> ColonyResult<()> {
        self.require_settler(settler)?;
        if preferences.len() != self.resources.len() {
            return Err(ColonyError::SizeMismatch {
                expected: self.resources.len(),
                actual: preferences.len(),
            });
        }
        let resolved = preferences
            .iter()
            .map(|p| self.require_resource(p.as_ref()).map(|r| r.name().to_string()))
            .collect::<ColonyResult<Vec<_>>>()?;

        if let Some(s) = self.settlers.get_mut(settler) {
            s.set_preferences(resolved);
        }
        Ok(())
    }

    /// Exchanges the resources held by `a` and `b`.
    ///
    /// Applying the same switch twice restores the original bindings.
    ///
    /// # Errors
    /// - [`ColonyError::UnknownEntity`] if either settler is absent.
    /// - [`ColonyError::NotAssigned`] if either holds no resource.
    pub fn switch_assignments(&mut self, a: &str, b: &str) -> ColonyResult<()> {
        let (sa, sb) = (self.require_settler(a)?, self.require_settler(b)?);
        let ra = sa
            .assignment()
            .map(str::to_string)
            .ok_or_else(|| ColonyError::NotAssigned(a.to_string()))?;
        let rb = sb
            .assignment()
            .map(str::to_string)
            .ok_or_else(|| ColonyError::NotAssigned(b.to_string()))?;

        if let Some(s) = self.settlers.get_mut(a) {
            s.set_assignment(Some(rb));
        }
        if let Some(s) = self.settlers.get_mut(b) {
            s.set_assignment(Some(ra));
        }
        Ok(())
    }

    /// Releases every assignment. Idempotent.
    pub fn clear(&mut self) {
        for s in self.settlers.values_mut() {
            s.set_assignment(None);
        }
        for r in self.resources.values_mut() {
            r.assign_state(false);
        }
    }

    /// Whether the named settler is jealous of one of its adversaries.
    pub fn is_jealous(&self, settler: &str) -> ColonyResult<bool> {
        let s = self.require_settler(settler)?;
        Ok(s.is_jealous(|name| self.assignment_of(name)))
    }

    fn assignment_of(&self, settler: &str) -> Option<&str> {
        self.settlers.get(settler).and_then(Settler::assignment)
    }

    /// Names of the jealous settlers, in name order.
    pub fn jealous_settlers(&self) -> Vec<&str> {
        self.settlers
            .values()
            .filter(|s| s.is_jealous(|name| self.assignment_of(name)))
            .map(Settler::name)
            .collect()
    }

    /// Number of jealous settlers. Each settler counts at most once.
    pub fn count_jealous(&self) -> usize {
        self.settlers
            .values()
            .filter(|s| s.is_jealous(|name| self.assignment_of(name)))
            .count()
    }

    /// Whether the colony may be dispatched: as many settlers as
    /// resources, and every preference list a permutation of the
    /// resources.
    ///
    /// Failures are logged; see [`crate::validation::validate_colony`]
    /// for the structured report.
    pub fn check_stable(&self) -> bool {
        crate::validation::validate_colony(self).is_ok()
    }

    /// Captures the current settler → resource bindings.
    pub fn snapshot_assignments(&self) -> AllocationSnapshot {
        AllocationSnapshot {
            assignments: self
                .settlers
                .values()
                .filter_map(|s| {
                    s.assignment()
                        .map(|r| (s.name().to_string(), r.to_string()))
                })
                .collect(),
        }
    }

    /// Replaces every binding with those of `snapshot`.
    ///
    /// Settlers absent from the snapshot end up unassigned; held flags
    /// are rebuilt from the snapshot.
    ///
    /// # Errors
    /// - [`ColonyError::UnknownEntity`] for an unknown name.
    /// - [`ColonyError::InvalidOperation`] if a resource is bound twice.
    pub fn apply_assignments(&mut self, snapshot: &AllocationSnapshot) -> ColonyResult<()> {
        for (settler, resource) in &snapshot.assignments {
            self.require_settler(settler)?;
            self.require_resource(resource)?;
        }
        if !snapshot.is_injective() {
            return Err(ColonyError::InvalidOperation(
                "snapshot binds a resource to more than one settler".into(),
            ));
        }

        self.clear();
        for (settler, resource) in &snapshot.assignments {
            if let Some(s) = self.settlers.get_mut(settler) {
                s.set_assignment(Some(resource.clone()));
            }
            if let Some(r) = self.resources.get_mut(resource) {
                r.assign_state(true);
            }
        }
        Ok(())
    }

    /// Whether every settler holds a resource.
    pub fn is_fully_assigned(&self) -> bool {
        self.settlers.values().all(|s| s.assignment().is_some())
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in self.settlers.values() {
            let adversaries: Vec<&str> = s.adversaries().iter().map(String::as_str).collect();
            writeln!(
                f,
                "{} | P : [{}] | R : {} | J : [{}]",
                s.name(),
                s.preferences().join(", "),
                s.assignment().unwrap_or("-"),
                adversaries.join(", ")
            )?;
        }
        Ok(())
    }
}
