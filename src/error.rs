//! Error types for colony operations.
//!
//! Two tiers live here. Domain rejections (unknown names, self-adversary,
//! swapping an unassigned settler, wrong preference count) leave the
//! simulation untouched and may be retried. [`ColonyError::Unstable`] and
//! [`ColonyError::PreferencesExhausted`] signal a broken dispatch
//! precondition and abort the running strategy.

use std::fmt;

use thiserror::Error;

/// Which collection a name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Settler,
    Resource,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Settler => f.write_str("settler"),
            EntityKind::Resource => f.write_str("resource"),
        }
    }
}

/// Errors raised by [`Simulation`](crate::simulation::Simulation),
/// [`Settler`](crate::models::Settler) and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColonyError {
    /// A settler or resource name is not part of the colony.
    #[error("{kind} '{name}' does not exist")]
    UnknownEntity { kind: EntityKind, name: String },

    /// The operation is structurally forbidden (e.g. a settler detesting itself).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A preference list does not cover every resource.
    #[error("expected {expected} preference(s), got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The settler holds no resource.
    #[error("settler '{0}' does not have any resource")]
    NotAssigned(String),

    /// Dispatch was requested on a colony whose preferences are incomplete.
    #[error("simulation is not stable: every settler needs a complete preference list")]
    Unstable,

    /// A settler ran out of free resources during a dispatch pass.
    ///
    /// Cannot happen when the colony is stable; seeing it means the
    /// resource pool was corrupted mid-run.
    #[error("settler '{0}' found no free resource among its preferences")]
    PreferencesExhausted(String),
}

impl ColonyError {
    /// Unknown settler name.
    pub fn unknown_settler(name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind: EntityKind::Settler,
            name: name.into(),
        }
    }

    /// Unknown resource name.
    pub fn unknown_resource(name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind: EntityKind::Resource,
            name: name.into(),
        }
    }
}

/// Result alias for colony operations.
pub type ColonyResult<T> = Result<T, ColonyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ColonyError::unknown_settler("Z9").to_string(),
            "settler 'Z9' does not exist"
        );
        assert_eq!(
            ColonyError::unknown_resource("R7").to_string(),
            "resource 'R7' does not exist"
        );
        assert_eq!(
            ColonyError::SizeMismatch {
                expected: 3,
                actual: 2
            }
            .to_string(),
            "expected 3 preference(s), got 2"
        );
    }
}
