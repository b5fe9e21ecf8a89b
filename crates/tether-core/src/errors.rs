//! Error types for the Tether solver.

use thiserror::Error;

use crate::{Constraint, Variable};

/// Errors returned by solver operations.
///
/// Everything except [`SolverError::Internal`] is a usage or satisfiability
/// error the caller can recover from.
#[derive(Debug, Clone, Error)]
pub enum SolverError {
    #[error("Constraint is already in the solver: {0}")]
    DuplicateConstraint(Constraint),

    #[error("Constraint is not in the solver: {0}")]
    UnknownConstraint(Constraint),

    #[error("Unable to satisfy required constraint {constraint} (conflicts with one of {} registered constraints)", .conflicting.len())]
    UnsatisfiableConstraint {
        constraint: Constraint,
        conflicting: Vec<Constraint>,
    },

    #[error("Variable is already an edit variable: {0}")]
    DuplicateEditVariable(Variable),

    #[error("Variable is not an edit variable: {0}")]
    UnknownEditVariable(Variable),

    #[error("Edit variables cannot have required strength")]
    RequiredFailure,

    #[error(transparent)]
    Internal(#[from] InternalSolverError),
}

impl SolverError {
    /// True for invariant violations inside the solver rather than caller errors.
    pub fn is_internal(&self) -> bool {
        matches!(self, SolverError::Internal(_))
    }
}

/// A violated tableau invariant. The solver instance should be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InternalSolverError {
    #[error("Internal solver error: the objective is unbounded")]
    UnboundedObjective,

    #[error("Internal solver error: no leaving row found for constraint marker")]
    NoMarkerLeavingRow,

    #[error("Internal solver error: no entering symbol found for infeasible row")]
    NoDualEnteringSymbol,
}

/// Multiplying or dividing two non-constant expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Expression is non-linear")]
pub struct NonLinearError;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Constrain;

    #[test]
    fn test_error_categories() {
        let internal = SolverError::from(InternalSolverError::UnboundedObjective);
        assert!(internal.is_internal());
        assert!(!SolverError::RequiredFailure.is_internal());
    }

    #[test]
    fn test_unsatisfiable_message_counts_conflicts() {
        let x = Variable::named("x");
        let existing = (&x).equal_to(10.0);
        let rejected = (&x).equal_to(5.0);
        let err = SolverError::UnsatisfiableConstraint {
            constraint: rejected,
            conflicting: vec![existing],
        };
        assert_eq!(
            err.to_string(),
            "Unable to satisfy required constraint x + -5 == 0 | strength: REQUIRED (conflicts with one of 1 registered constraints)"
        );
    }
}
