//! Stability validation for colonies.
//!
//! A colony is *stable*, and may be dispatched, when it has as many
//! settlers as resources and every settler ranks every resource exactly
//! once. Detects:
//! - Settler/resource count mismatch
//! - Missing preference lists
//! - Duplicate resources inside a preference list
//! - Preference lists of the wrong length
//! - Preferences naming resources outside the colony

use std::collections::HashSet;

use crate::simulation::Simulation;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// `|settlers| != |resources|`.
    CountMismatch,
    /// A settler has no preferences.
    MissingPreferences,
    /// A settler ranks the same resource twice.
    DuplicatePreference,
    /// A settler ranks too few or too many resources.
    IncompletePreferences,
    /// A settler ranks a resource that is not part of the colony.
    InvalidResourceReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates that a colony can be dispatched.
///
/// Checks:
/// 1. Settler count equals resource count
/// 2. Every settler has preferences
/// 3. No preference list contains duplicates
/// 4. Every preference list has exactly `|resources|` entries
/// 5. Every ranked resource exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_colony(sim: &Simulation) -> ValidationResult {
    let mut errors = Vec::new();
    let n = sim.resource_count();

    if sim.settler_count() != n {
        errors.push(ValidationError::new(
            ValidationErrorKind::CountMismatch,
            format!(
                "{} settlers for {} resources",
                sim.settler_count(),
                n
            ),
        ));
    }

    for settler in sim.settlers() {
        let prefs = settler.preferences();

        if !settler.preferences_complete(n) {
            let distinct: HashSet<&str> = prefs.iter().map(String::as_str).collect();
            let error = if prefs.is_empty() {
                ValidationError::new(
                    ValidationErrorKind::MissingPreferences,
                    format!("Settler '{}' has no preferences", settler.name()),
                )
            } else if distinct.len() != prefs.len() {
                ValidationError::new(
                    ValidationErrorKind::DuplicatePreference,
                    format!("Settler '{}' ranks a resource twice", settler.name()),
                )
            } else {
                ValidationError::new(
                    ValidationErrorKind::IncompletePreferences,
                    format!(
                        "Settler '{}' ranks {} resources, expected {}",
                        settler.name(),
                        prefs.len(),
                        n
                    ),
                )
            };
            errors.push(error);
            continue;
        }

        for pref in prefs {
            if sim.resource(pref).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidResourceReference,
                    format!(
                        "Settler '{}' references unknown resource '{}'",
                        settler.name(),
                        pref
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
