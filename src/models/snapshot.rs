//! Allocation snapshot model.
//!
//! A snapshot is a flat `settler → resource` view of an allocation. The
//! MAX-LEF dispatcher keeps the best one seen across instances, and the
//! writer serializes one as the final result.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A settler-to-resource binding table.
///
/// Only assigned settlers appear. Keys are ordered so that serialized
/// output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    /// Settler name → resource name.
    pub assignments: BTreeMap<String, String>,
}

impl AllocationSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding.
    pub fn with_assignment(
        mut self,
        settler: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        self.assignments.insert(settler.into(), resource.into());
        self
    }

    /// Resource bound to `settler`.
    pub fn resource_of(&self, settler: &str) -> Option<&str> {
        self.assignments.get(settler).map(String::as_str)
    }

    /// Settler holding `resource`.
    pub fn holder_of(&self, resource: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(_, r)| r.as_str() == resource)
            .map(|(s, _)| s.as_str())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Whether no resource is bound twice.
    pub fn is_injective(&self) -> bool {
        let distinct: BTreeSet<&str> = self.assignments.values().map(String::as_str).collect();
        distinct.len() == self.assignments.len()
    }
}
