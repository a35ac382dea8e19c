//! Resource model.
//!
//! A resource is an indivisible unit of value. Each one can be held by
//! at most one settler at a time; the `held` flag tracks that claim.

use serde::{Deserialize, Serialize};

use crate::error::{ColonyError, ColonyResult};

/// A resource that can be assigned to exactly one settler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    name: String,
    held: bool,
}

impl Resource {
    /// Creates a free resource.
    ///
    /// # Errors
    /// [`ColonyError::InvalidOperation`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> ColonyResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ColonyError::InvalidOperation(
                "resource name cannot be empty".into(),
            ));
        }
        Ok(Self { name, held: false })
    }

    /// Generated names are never empty.
    pub(crate) fn placeholder(name: String) -> Self {
        debug_assert!(!name.is_empty());
        Self { name, held: false }
    }

    /// Resource identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a settler currently holds this resource.
    #[inline]
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Sets the held flag.
    pub fn assign_state(&mut self, held: bool) {
        self.held = held;
    }
}
