//! Error taxonomy.
//!
//! Every failure is returned as a typed value; nothing is raised from
//! inside the search loops.

use std::fmt;
use thiserror::Error;

use crate::models::Pairing;
use crate::validation::ValidationError;

/// Hard constraint that could not be met for a pending pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmetConstraint {
    /// Minimum rest under `RestPolicy::Strict`.
    MinimumRest { min_rest_slots: usize },
    /// Every cell in the capped slot window is taken or a team already plays there.
    SlotCapacity { max_slots: usize },
    /// The outer iteration bound was reached.
    IterationLimit { max_iterations: usize },
}

impl fmt::Display for UnmetConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmetConstraint::MinimumRest { min_rest_slots } => {
                write!(f, "minimum rest of {min_rest_slots} slot(s)")
            }
            UnmetConstraint::SlotCapacity { max_slots } => {
                write!(f, "no free cell within {max_slots} slot(s)")
            }
            UnmetConstraint::IterationLimit { max_iterations } => {
                write!(f, "iteration limit of {max_iterations} reached")
            }
        }
    }
}

/// Scheduling and bracket errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulingError {
    /// Input rejected before any scheduling attempt.
    #[error("invalid configuration: {}", join_messages(.0))]
    InvalidConfiguration(Vec<ValidationError>),

    /// A pending pairing could not be placed.
    #[error("pairing {pairing} is unschedulable: {constraint} ({placed} pairing(s) placed)")]
    Unschedulable {
        pairing: Pairing,
        constraint: UnmetConstraint,
        placed: usize,
    },

    /// A bracket node references a nonexistent group, rank, or node.
    #[error("invalid bracket placeholder: {}", join_messages(.0))]
    InvalidPlaceholder(Vec<ValidationError>),

    /// A resolution delta was computed against an older bracket snapshot.
    #[error("resolution computed against bracket version {expected}, bracket is at version {found}")]
    StaleResolution { expected: u64, found: u64 },

    /// A recorded result does not match the node's participants.
    #[error("inconsistent result for bracket node '{node}': {reason}")]
    InconsistentResult { node: String, reason: String },
}

impl SchedulingError {
    /// Whether the caller can fix the input (or re-fetch) and retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SchedulingError::InconsistentResult { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_unschedulable_message() {
        let err = SchedulingError::Unschedulable {
            pairing: Pairing::real("A", "B"),
            constraint: UnmetConstraint::MinimumRest { min_rest_slots: 5 },
            placed: 2,
        };
        assert_eq!(
            err.to_string(),
            "pairing A vs B is unschedulable: minimum rest of 5 slot(s) (2 pairing(s) placed)"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_invalid_configuration_joins_messages() {
        let err = SchedulingError::InvalidConfiguration(vec![
            ValidationError::new(ValidationErrorKind::TooFewTeams, "need 2 teams"),
            ValidationError::new(ValidationErrorKind::NoFields, "need a field"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: need 2 teams; need a field"
        );
    }

    #[test]
    fn test_inconsistent_result_not_recoverable() {
        let err = SchedulingError::InconsistentResult {
            node: "sf-1".into(),
            reason: "winner did not play".into(),
        };
        assert!(!err.is_recoverable());
    }
}
