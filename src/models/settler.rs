//! Settler (agent) model.
//!
//! A settler owns a total ranking over every resource of the colony, a set
//! of adversaries and at most one assigned resource. All cross-references
//! are names resolved through the owning
//! [`Simulation`](crate::simulation::Simulation); a settler never owns
//! another settler or a resource.
//!
//! # Envy
//! A settler is *jealous* when an adversary holds a resource ranked
//! strictly above its own assignment in the settler's private ranking.
//! Envy towards non-adversaries is ignored (local envy-freeness).

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use crate::error::{ColonyError, ColonyResult};

/// An agent requiring exactly one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settler {
    name: String,
    adversaries: BTreeSet<String>,
    preferences: Vec<String>,
    assignment: Option<String>,
    /// Position of `assignment` in `preferences`; `None` when unassigned
    /// or when the assignment is not ranked.
    assignment_rank: Option<usize>,
}

impl Settler {
    /// Creates a settler with no preferences, adversaries or assignment.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            adversaries: BTreeSet::new(),
            preferences: Vec::new(),
            assignment: None,
            assignment_rank: None,
        }
    }

    /// Sets the preference ranking (best first).
    pub fn with_preferences<I, S>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_preferences(preferences.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the settlers this one detests.
    pub fn adversaries(&self) -> &BTreeSet<String> {
        &self.adversaries
    }

    /// Resource names, best first.
    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    /// Currently held resource name.
    pub fn assignment(&self) -> Option<&str> {
        self.assignment.as_deref()
    }

    /// Rank (0 = favourite) of the current assignment.
    pub fn assignment_rank(&self) -> Option<usize> {
        self.assignment_rank
    }

    /// Whether `other` is one of this settler's adversaries.
    pub fn detests(&self, other: &str) -> bool {
        self.adversaries.contains(other)
    }

    /// Records `other` as an adversary of this settler (one direction only).
    ///
    /// Symmetry is maintained by
    /// [`Simulation::set_adversary`](crate::simulation::Simulation::set_adversary).
    ///
    /// # Errors
    /// [`ColonyError::InvalidOperation`] if `other` is this settler.
    pub fn add_adversary(&mut self, other: impl Into<String>) -> ColonyResult<()> {
        let other = other.into();
        if other == self.name {
            return Err(ColonyError::InvalidOperation(format!(
                "settler '{}' cannot detest itself",
                self.name
            )));
        }
        self.insert_adversary(other);
        Ok(())
    }

    /// Inserts an adversary already known to differ from this settler.
    pub(crate) fn insert_adversary(&mut self, other: String) {
        debug_assert_ne!(other, self.name);
        self.adversaries.insert(other);
    }

    /// Replaces the preference ranking.
    ///
    /// Duplicates are accepted here; [`Settler::preferences_complete`]
    /// reports them. The rank of the current assignment is refreshed.
    pub fn set_preferences(&mut self, preferences: Vec<String>) {
        self.preferences = preferences;
        self.assignment_rank = self.rank_of(self.assignment.as_deref());
    }

    /// Binds (or releases with `None`) the settler's resource and
    /// recomputes its rank.
    pub fn set_assignment(&mut self, resource: Option<String>) {
        self.assignment_rank = self.rank_of(resource.as_deref());
        self.assignment = resource;
    }

    fn rank_of(&self, resource: Option<&str>) -> Option<usize> {
        let resource = resource?;
        self.preferences.iter().position(|p| p == resource)
    }

    /// Resources this settler ranks strictly above its current assignment.
    ///
    /// Empty when unassigned or when the assignment is unranked.
    pub fn preferred_over_assignment(&self) -> &[String] {
        match self.assignment_rank {
            Some(rank) => &self.preferences[..rank],
            None => &[],
        }
    }

    /// Whether some adversary holds a resource this settler ranks above
    /// its own.
    ///
    /// `assignment_of` resolves a settler name to the resource it holds.
    /// Ranks are never compared across settlers; the adversary's resource
    /// is looked up in this settler's own ranking.
    pub fn is_jealous<'a, F>(&self, assignment_of: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let dreams = self.preferred_over_assignment();
        if dreams.is_empty() {
            return false;
        }
        self.adversaries.iter().any(|enemy| {
            assignment_of(enemy.as_str()).is_some_and(|held| dreams.iter().any(|d| d == held))
        })
    }

    /// Whether the preferences hold exactly `n` distinct resources.
    ///
    /// Unset preferences and duplicates are logged and reported as `false`.
    pub fn preferences_complete(&self, n: usize) -> bool {
        if self.preferences.is_empty() {
            warn!(settler = %self.name, "no preferences set");
            return false;
        }
        let distinct: HashSet<&str> = self.preferences.iter().map(String::as_str).collect();
        if distinct.len() != self.preferences.len() {
            warn!(settler = %self.name, "invalid order of preferences (duplicates)");
            return false;
        }
        distinct.len() == n
    }

    /// First resource in rank order that `is_free` accepts.
    pub fn best_available<F>(&self, is_free: F) -> Option<&str>
    where
        F: Fn(&str) -> bool,
    {
        self.preferences
            .iter()
            .map(String::as_str)
            .find(|r| is_free(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ranked(name: &str) -> Settler {
        Settler::new(name).with_preferences(["R1", "R2", "R3"])
    }

    #[test]
    fn test_self_adversary_rejected() {
        let mut a = Settler::new("A1");
        assert!(matches!(
            a.add_adversary("A1"),
            Err(ColonyError::InvalidOperation(_))
        ));
        assert!(a.adversaries().is_empty());
    }

    #[test]
    fn test_assignment_rank() {
        let mut a = ranked("A1");
        assert_eq!(a.assignment_rank(), None);

        a.set_assignment(Some("R2".into()));
        assert_eq!(a.assignment(), Some("R2"));
        assert_eq!(a.assignment_rank(), Some(1));
        assert_eq!(a.preferred_over_assignment(), ["R1".to_string()]);

        a.set_assignment(None);
        assert_eq!(a.assignment_rank(), None);
    }

    #[test]
    fn test_unranked_assignment() {
        let mut a = ranked("A1");
        a.set_assignment(Some("R9".into()));
        assert_eq!(a.assignment(), Some("R9"));
        assert_eq!(a.assignment_rank(), None);
        assert!(a.preferred_over_assignment().is_empty());
    }

    #[test]
    fn test_rank_refreshed_on_new_preferences() {
        let mut a = ranked("A1");
        a.set_assignment(Some("R3".into()));
        assert_eq!(a.assignment_rank(), Some(2));
        a.set_preferences(vec!["R3".into(), "R1".into(), "R2".into()]);
        assert_eq!(a.assignment_rank(), Some(0));
    }

    #[test]
    fn test_jealous_only_of_adversaries() {
        let mut a = ranked("A1");
        a.set_assignment(Some("R3".into()));

        let held: HashMap<&str, &str> = [("B1", "R1"), ("C1", "R2")].into_iter().collect();
        let lookup = |n: &str| held.get(n).copied();

        // Better resources are held, but by nobody A1 detests.
        assert!(!a.is_jealous(lookup));

        a.add_adversary("C1").unwrap();
        assert!(a.is_jealous(lookup));
    }

    #[test]
    fn test_not_jealous_of_worse_resource() {
        let mut a = ranked("A1");
        a.add_adversary("B1").unwrap();
        a.set_assignment(Some("R1".into()));

        let lookup = |n: &str| if n == "B1" { Some("R2") } else { None };
        assert!(!a.is_jealous(lookup));
    }

    #[test]
    fn test_unassigned_never_jealous() {
        let mut a = ranked("A1");
        a.add_adversary("B1").unwrap();
        assert!(!a.is_jealous(|_| Some("R1")));
    }

    #[test]
    fn test_preferences_complete() {
        assert!(ranked("A1").preferences_complete(3));
        assert!(!ranked("A1").preferences_complete(4));
        assert!(!Settler::new("A1").preferences_complete(3));

        let dup = Settler::new("A1").with_preferences(["R1", "R1", "R2"]);
        assert!(!dup.preferences_complete(3));
        assert!(!dup.preferences_complete(2));
    }

    #[test]
    fn test_best_available() {
        let a = ranked("A1");
        assert_eq!(a.best_available(|r| r != "R1"), Some("R2"));
        assert_eq!(a.best_available(|_| false), None);
    }
}
