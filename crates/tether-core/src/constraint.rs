//! Constraints and the builder trait used to form them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{Expression, Strength, Term, Variable};

static NEXT_CONSTRAINT_ID: AtomicUsize = AtomicUsize::new(0);

/// How a constraint's expression compares against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::LessOrEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone)]
struct ConstraintData {
    expression: Expression,
    relation: Relation,
    strength: Strength,
    label: Option<String>,
}

/// A relation `expression <op> 0` with a strength, to be added to the solver.
///
/// Constraints compare and hash by identity. Two constraints built from the
/// same expression are different entries in a solver; clones share identity.
#[derive(Debug, Clone)]
pub struct Constraint {
    id: usize,
    data: Arc<ConstraintData>,
}

impl Constraint {
    /// Create a new constraint. The expression is reduced and the strength clipped.
    pub fn new(expression: Expression, relation: Relation, strength: Strength) -> Self {
        Self::from_data(ConstraintData {
            expression: expression.reduce(),
            relation,
            strength: strength.clip(),
            label: None,
        })
    }

    fn from_data(data: ConstraintData) -> Self {
        Self {
            id: NEXT_CONSTRAINT_ID.fetch_add(1, Ordering::Relaxed),
            data: Arc::new(data),
        }
    }

    /// Create a required constraint.
    pub fn required(expression: Expression, relation: Relation) -> Self {
        Self::new(expression, relation, Strength::REQUIRED)
    }

    /// A new, distinct constraint with the same expression, relation and label.
    pub fn with_strength(&self, strength: Strength) -> Self {
        Self::from_data(ConstraintData {
            strength: strength.clip(),
            ..(*self.data).clone()
        })
    }

    /// A new, distinct constraint carrying a display label.
    ///
    /// The label is part of what a constraint shows, so the labeled copy
    /// never shares identity with the original.
    pub fn labeled(&self, label: impl Into<String>) -> Self {
        Self::from_data(ConstraintData {
            label: Some(label.into()),
            ..(*self.data).clone()
        })
    }

    pub fn expression(&self) -> &Expression {
        &self.data.expression
    }

    pub fn relation(&self) -> Relation {
        self.data.relation
    }

    pub fn strength(&self) -> Strength {
        self.data.strength
    }

    pub fn label(&self) -> Option<&str> {
        self.data.label.as_deref()
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data.label {
            Some(label) => write!(f, "{} | strength: {}", label, self.data.strength),
            None => write!(
                f,
                "{} {} 0 | strength: {}",
                self.data.expression, self.data.relation, self.data.strength
            ),
        }
    }
}

/// The constraint a solver registers for an edit variable.
///
/// Tracks the value most recently suggested for the variable.
#[derive(Debug, Clone)]
pub struct EditConstraint {
    variable: Variable,
    constraint: Constraint,
    suggested_value: Option<f64>,
}

impl EditConstraint {
    /// Create the constraint `variable == 0` at the given strength.
    pub fn new(variable: Variable, strength: Strength) -> Self {
        let expression = Expression::from_term(Term::from(&variable));
        Self {
            constraint: Constraint::new(expression, Relation::Equal, strength),
            variable,
            suggested_value: None,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn suggested_value(&self) -> Option<f64> {
        self.suggested_value
    }

    pub fn set_suggested_value(&mut self, value: f64) {
        self.suggested_value = Some(value);
    }
}

impl fmt::Display for EditConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "edit {} == {} | strength: {}",
            self.variable,
            self.suggested_value.unwrap_or(0.0),
            self.constraint.strength()
        )
    }
}

/// Builds required constraints between linear quantities.
///
/// Implemented for everything convertible into an [`Expression`]: variables,
/// terms, expressions and plain numbers. The constraint is `self - rhs <op> 0`.
pub trait Constrain: Into<Expression> + Sized {
    fn equal_to(self, rhs: impl Into<Expression>) -> Constraint {
        relate(self, Relation::Equal, rhs)
    }

    fn less_or_equal(self, rhs: impl Into<Expression>) -> Constraint {
        relate(self, Relation::LessOrEqual, rhs)
    }

    fn greater_or_equal(self, rhs: impl Into<Expression>) -> Constraint {
        relate(self, Relation::GreaterOrEqual, rhs)
    }
}

impl<T: Into<Expression>> Constrain for T {}

fn relate(lhs: impl Into<Expression>, relation: Relation, rhs: impl Into<Expression>) -> Constraint {
    Constraint::required(lhs.into().minus(rhs.into()), relation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_compare_by_identity() {
        let x = Variable::named("x");
        let a = (&x).less_or_equal(10.0);
        let b = (&x).less_or_equal(10.0);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_construction_reduces_expression() {
        let x = Variable::named("x");
        let constraint = (&x + &x + 2.0).equal_to(0.0);
        let expr = constraint.expression();
        assert_eq!(expr.terms.len(), 1);
        assert!((expr.terms[0].coefficient - 2.0).abs() < 1e-12);
        assert!((expr.constant - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_relation_moves_rhs_to_lhs() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let constraint = (&x + 2.0).greater_or_equal(&y + 10.0);
        let expr = constraint.expression();

        assert_eq!(constraint.relation(), Relation::GreaterOrEqual);
        assert!((expr.constant + 8.0).abs() < 1e-12);
        assert_eq!(expr.terms[1].variable, y);
        assert!((expr.terms[1].coefficient + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_strength_is_clipped() {
        let x = Variable::named("x");
        let constraint = Constraint::new(Expression::from(&x), Relation::Equal, Strength::new(1e12));
        assert_eq!(constraint.strength(), Strength::REQUIRED);
    }

    #[test]
    fn test_with_strength_creates_distinct_constraint() {
        let x = Variable::named("x");
        let required = (&x).equal_to(1.0);
        let weak = required.with_strength(Strength::WEAK);

        assert_ne!(required, weak);
        assert_eq!(required.strength(), Strength::REQUIRED);
        assert_eq!(weak.strength(), Strength::WEAK);
        assert_eq!(weak.expression(), required.expression());
    }

    #[test]
    fn test_display() {
        let constraint = Constraint::required(Expression::from_constant(1.0), Relation::Equal);
        assert_eq!(constraint.to_string(), "1 == 0 | strength: REQUIRED");

        let labeled = constraint.with_strength(Strength::WEAK).labeled("x fixed");
        assert_eq!(labeled.to_string(), "x fixed | strength: WEAK");
        assert_eq!(labeled.with_strength(Strength::STRONG).label(), Some("x fixed"));
    }

    #[test]
    fn test_labeled_copy_is_distinct() {
        let x = Variable::named("x");
        let original = (&x).equal_to(1.0);
        let shared = original.clone();
        let renamed = shared.labeled("x pinned");

        assert_eq!(original, shared);
        assert_ne!(original, renamed);
        assert_eq!(original.label(), None);
        assert_eq!(renamed.label(), Some("x pinned"));
        assert_eq!(renamed.expression(), original.expression());

        let mut solver_keys = std::collections::HashSet::new();
        solver_keys.insert(original.clone());
        assert!(!solver_keys.contains(&renamed));
    }

    #[test]
    fn test_edit_constraint_tracks_suggestion() {
        let x = Variable::named("x");
        let mut edit = EditConstraint::new(x.clone(), Strength::STRONG);
        assert_eq!(edit.suggested_value(), None);
        assert_eq!(edit.to_string(), "edit x == 0 | strength: STRONG");

        edit.set_suggested_value(2.0);
        assert_eq!(edit.suggested_value(), Some(2.0));
        assert_eq!(edit.variable(), &x);
        assert_eq!(edit.to_string(), "edit x == 2 | strength: STRONG");
    }
}
