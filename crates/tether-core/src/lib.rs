//! Core value types for the Tether constraint solver.
//!
//! This crate defines the data model shared by the solver and its callers:
//! - [`Variable`] and [`Term`]: the unknowns and their scaled occurrences
//! - [`Expression`]: a linear combination of terms plus a constant
//! - [`Constraint`] and [`EditConstraint`]: relations handed to the solver
//! - [`Strength`]: constraint priorities
//! - Error types for construction and solving
//!
//! # Example
//!
//! ```
//! use tether_core::{Constrain, Strength, Variable};
//!
//! let left = Variable::named("left");
//! let width = Variable::named("width");
//!
//! let right_edge = (&left + &width).less_or_equal(100.0);
//! let preferred = width.equal_to(80.0).with_strength(Strength::WEAK);
//! assert_ne!(right_edge, preferred);
//! ```

mod constraint;
mod errors;
mod expression;
mod ops;
mod strength;
mod variable;

pub use constraint::{Constrain, Constraint, EditConstraint, Relation};
pub use errors::{InternalSolverError, NonLinearError, SolverError};
pub use expression::Expression;
pub use strength::Strength;
pub use variable::{Term, Variable};

/// Tolerance below which a coefficient or constant counts as zero.
pub const EPSILON: f64 = 1e-8;

/// True when `value` is within [`EPSILON`] of zero.
#[inline]
pub fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}
