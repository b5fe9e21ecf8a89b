//! Incremental linear constraint solving for Tether.
//!
//! This crate solves systems of linear equalities and inequalities with
//! priorities, re-solving incrementally as constraints come and go.
//!
//! # Architecture
//!
//! 1. **Tableau**: rows keyed by basic symbols, with slack, error and dummy
//!    symbols introduced per constraint
//! 2. **Primal simplex**: re-optimizes the weighted error objective after
//!    each added or removed constraint
//! 3. **Dual simplex**: restores feasibility after edit values are suggested
//!
//! # Example
//!
//! ```
//! use tether_solver::{Constrain, Solver, Strength, Variable};
//!
//! let left = Variable::named("left");
//! let width = Variable::named("width");
//!
//! let mut solver = Solver::new();
//! solver.add_constraint(&(&left).greater_or_equal(0.0)).unwrap();
//! solver.add_constraint(&(&left + &width).less_or_equal(100.0)).unwrap();
//! solver
//!     .add_constraint(&(&width).equal_to(80.0).with_strength(Strength::WEAK))
//!     .unwrap();
//!
//! solver.add_edit_variable(&left, Strength::STRONG).unwrap();
//! solver.suggest_value(&left, 40.0).unwrap();
//! solver.update_variables();
//!
//! assert!((solver.get_value(&left) - 40.0).abs() < 1e-6);
//! assert!((solver.get_value(&width) - 60.0).abs() < 1e-6);
//! ```

mod row;
mod solver;
mod symbol;

pub use solver::Solver;
pub use tether_core::{
    near_zero, Constrain, Constraint, EditConstraint, Expression, InternalSolverError,
    NonLinearError, Relation, SolverError, Strength, Term, Variable, EPSILON,
};
