//! Linear expressions.

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::{near_zero, NonLinearError, Term, Variable};

/// A linear expression in the form: constant + Σ(coefficient * variable)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub terms: SmallVec<[Term; 4]>,
    pub constant: f64,
}

impl Expression {
    /// Create an expression from terms and a constant.
    pub fn new(terms: impl IntoIterator<Item = Term>, constant: f64) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            constant,
        }
    }

    /// An expression with no terms.
    pub fn from_constant(value: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant: value,
        }
    }

    /// Create an expression from a single term.
    pub fn from_term(term: Term) -> Self {
        let mut terms = SmallVec::new();
        terms.push(term);
        Self {
            terms,
            constant: 0.0,
        }
    }

    /// True when the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression, looking up each variable's value with `value_of`.
    pub fn value_with(&self, mut value_of: impl FnMut(&Variable) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, term| acc + term.value_with(value_of(&term.variable)))
    }

    /// Merge terms that refer to the same variable.
    ///
    /// Coefficients are summed and the order of first occurrence is kept.
    pub fn reduce(&self) -> Expression {
        let mut coefficients: IndexMap<&Variable, f64> = IndexMap::new();
        for term in &self.terms {
            *coefficients.entry(&term.variable).or_insert(0.0) += term.coefficient;
        }

        Expression {
            terms: coefficients
                .into_iter()
                .map(|(variable, coefficient)| Term::new(variable.clone(), coefficient))
                .collect(),
            constant: self.constant,
        }
    }

    /// Multiply two expressions, provided at least one of them is constant.
    pub fn try_mul(&self, other: &Expression) -> Result<Expression, NonLinearError> {
        if self.is_constant() {
            Ok(other.scaled(self.constant))
        } else if other.is_constant() {
            Ok(self.scaled(other.constant))
        } else {
            Err(NonLinearError)
        }
    }

    /// Divide by another expression, which must be constant.
    pub fn try_div(&self, other: &Expression) -> Result<Expression, NonLinearError> {
        if other.is_constant() {
            Ok(self.scaled(1.0 / other.constant))
        } else {
            Err(NonLinearError)
        }
    }

    /// Every coefficient and the constant multiplied by `scalar`.
    pub fn scaled(&self, scalar: f64) -> Expression {
        Expression {
            terms: self
                .terms
                .iter()
                .map(|term| Term::new(term.variable.clone(), term.coefficient * scalar))
                .collect(),
            constant: self.constant * scalar,
        }
    }

    /// Append another expression's terms and add its constant.
    pub(crate) fn plus(mut self, other: Expression) -> Expression {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }

    pub(crate) fn minus(self, other: Expression) -> Expression {
        self.plus(other.scaled(-1.0))
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::from_constant(value)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Expression::from_term(term)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::from_term(Term::from(variable))
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Expression::from_term(Term::from(variable))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for term in &self.terms {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}", term)?;
            first = false;
        }
        if first || !near_zero(self.constant) {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reduce_merges_duplicates() {
        let x = Variable::named("x");
        let expr = Expression::new([Term::from(&x), Term::from(&x)], 2.0);

        let reduced = expr.reduce();
        assert_eq!(reduced.terms.len(), 1);
        assert_eq!(reduced.terms[0].variable, x);
        assert!((reduced.terms[0].coefficient - 2.0).abs() < 1e-12);
        assert!((reduced.constant - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_keeps_first_seen_order() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let expr = Expression::new(
            [Term::new(y.clone(), 1.0), Term::new(x.clone(), 3.0), Term::new(y.clone(), -4.0)],
            0.0,
        );

        let reduced = expr.reduce();
        assert_eq!(reduced.terms.len(), 2);
        assert_eq!(reduced.terms[0].variable, y);
        assert!((reduced.terms[0].coefficient + 3.0).abs() < 1e-12);
        assert_eq!(reduced.terms[1].variable, x);
    }

    #[test]
    fn test_nonlinear_product_is_rejected() {
        let x = Expression::from(Variable::named("x"));
        let y = Expression::from(Variable::named("y"));
        assert_eq!(x.try_mul(&y), Err(NonLinearError));
        assert_eq!(x.try_div(&y), Err(NonLinearError));

        let doubled = x.try_mul(&Expression::from_constant(2.0)).unwrap();
        assert!((doubled.terms[0].coefficient - 2.0).abs() < 1e-12);

        let halved = x.try_div(&Expression::from_constant(2.0)).unwrap();
        assert!((halved.terms[0].coefficient - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_value_with() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let expr = Expression::new([Term::new(x.clone(), 2.0), Term::new(y.clone(), -1.0)], 5.0);

        let value = expr.value_with(|v| if *v == x { 3.0 } else { 4.0 });
        assert!((value - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let x = Variable::named("x");
        let expr = Expression::new([Term::new(x, 2.0)], 3.0);
        assert_eq!(expr.to_string(), "2 * x + 3");
        assert_eq!(Expression::from_constant(1.5).to_string(), "1.5");
    }

    proptest! {
        #[test]
        fn reduce_leaves_each_variable_once(picks in prop::collection::vec((0usize..4, -100.0f64..100.0), 0..16)) {
            let vars: Vec<Variable> = (0..4).map(|_| Variable::new()).collect();
            let expr = Expression::new(
                picks.iter().map(|&(i, c)| Term::new(vars[i].clone(), c)),
                1.0,
            );

            let reduced = expr.reduce();
            for (i, var) in vars.iter().enumerate() {
                let occurrences = reduced.terms.iter().filter(|t| &t.variable == var).count();
                let expected: f64 = picks.iter().filter(|&&(j, _)| j == i).map(|&(_, c)| c).sum();
                if picks.iter().any(|&(j, _)| j == i) {
                    prop_assert_eq!(occurrences, 1);
                    let merged = reduced.terms.iter().find(|t| &t.variable == var).unwrap();
                    prop_assert!((merged.coefficient - expected).abs() < 1e-9);
                } else {
                    prop_assert_eq!(occurrences, 0);
                }
            }
            prop_assert_eq!(reduced.constant, 1.0);
        }
    }
}
