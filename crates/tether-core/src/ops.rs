//! Arithmetic for building linear expressions.
//!
//! Sums and differences of variables, terms, expressions and numbers yield an
//! [`Expression`]; scaling a variable or term by a number yields a [`Term`].

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::{Expression, Term, Variable};

macro_rules! impl_add_sub {
    ($([$($lt:lifetime),*] $lhs:ty, $rhs:ty;)*) => {$(
        impl<$($lt),*> Add<$rhs> for $lhs {
            type Output = Expression;

            fn add(self, rhs: $rhs) -> Expression {
                Expression::from(self).plus(Expression::from(rhs))
            }
        }

        impl<$($lt),*> Sub<$rhs> for $lhs {
            type Output = Expression;

            fn sub(self, rhs: $rhs) -> Expression {
                Expression::from(self).minus(Expression::from(rhs))
            }
        }
    )*};
}

impl_add_sub! {
    [] Variable, Variable;
    ['a] Variable, &'a Variable;
    [] Variable, Term;
    [] Variable, Expression;
    [] Variable, f64;
    ['a] &'a Variable, Variable;
    ['a, 'b] &'a Variable, &'b Variable;
    ['a] &'a Variable, Term;
    ['a] &'a Variable, Expression;
    ['a] &'a Variable, f64;
    [] Term, Variable;
    ['a] Term, &'a Variable;
    [] Term, Term;
    [] Term, Expression;
    [] Term, f64;
    [] Expression, Variable;
    ['a] Expression, &'a Variable;
    [] Expression, Term;
    [] Expression, Expression;
    [] Expression, f64;
    [] f64, Variable;
    ['a] f64, &'a Variable;
    [] f64, Term;
    [] f64, Expression;
}

macro_rules! impl_scale_variable {
    ($([$($lt:lifetime),*] $var:ty;)*) => {$(
        impl<$($lt),*> Mul<f64> for $var {
            type Output = Term;

            fn mul(self, coefficient: f64) -> Term {
                Term::from(self) * coefficient
            }
        }

        impl<$($lt),*> Mul<$var> for f64 {
            type Output = Term;

            fn mul(self, variable: $var) -> Term {
                Term::from(variable) * self
            }
        }

        impl<$($lt),*> Div<f64> for $var {
            type Output = Term;

            fn div(self, denominator: f64) -> Term {
                Term::from(self) / denominator
            }
        }

        impl<$($lt),*> Neg for $var {
            type Output = Term;

            fn neg(self) -> Term {
                -Term::from(self)
            }
        }
    )*};
}

impl_scale_variable! {
    [] Variable;
    ['a] &'a Variable;
}

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(self, coefficient: f64) -> Term {
        Term::new(self.variable, self.coefficient * coefficient)
    }
}

impl Mul<Term> for f64 {
    type Output = Term;

    fn mul(self, term: Term) -> Term {
        term * self
    }
}

impl Div<f64> for Term {
    type Output = Term;

    fn div(self, denominator: f64) -> Term {
        self * (1.0 / denominator)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        self * -1.0
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, coefficient: f64) -> Expression {
        self.scaled(coefficient)
    }
}

impl Mul<Expression> for f64 {
    type Output = Expression;

    fn mul(self, expression: Expression) -> Expression {
        expression.scaled(self)
    }
}

impl Div<f64> for Expression {
    type Output = Expression;

    fn div(self, denominator: f64) -> Expression {
        self.scaled(1.0 / denominator)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.scaled(-1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coefficient_of(expr: &Expression, variable: &Variable) -> f64 {
        expr.terms
            .iter()
            .filter(|t| &t.variable == variable)
            .map(|t| t.coefficient)
            .sum()
    }

    #[test]
    fn test_scaling_variables_gives_terms() {
        let x = Variable::named("x");
        assert_eq!(&x * 3.0, Term::new(x.clone(), 3.0));
        assert_eq!(2.0 * &x, Term::new(x.clone(), 2.0));
        assert_eq!(&x / 4.0, Term::new(x.clone(), 0.25));
        assert_eq!(-&x, Term::new(x.clone(), -1.0));
        assert_eq!(-(x.clone() * 2.0) / 2.0, Term::new(x, -1.0));
    }

    #[test]
    fn test_sums_and_differences() {
        let x = Variable::named("x");
        let y = Variable::named("y");

        let expr = &x * 2.0 + &y - 5.0;
        assert!((coefficient_of(&expr, &x) - 2.0).abs() < 1e-12);
        assert!((coefficient_of(&expr, &y) - 1.0).abs() < 1e-12);
        assert!((expr.constant + 5.0).abs() < 1e-12);

        let diff = 10.0 - (&x + &y);
        assert!((coefficient_of(&diff, &x) + 1.0).abs() < 1e-12);
        assert!((coefficient_of(&diff, &y) + 1.0).abs() < 1e-12);
        assert!((diff.constant - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_expression_scaling() {
        let left = Variable::named("left");
        let right = Variable::named("right");

        let mid = (&left + &right) / 2.0;
        assert!((coefficient_of(&mid, &left) - 0.5).abs() < 1e-12);

        let doubled = 2.0 * (mid.clone() + 1.0);
        assert!((coefficient_of(&doubled, &right) - 1.0).abs() < 1e-12);
        assert!((doubled.constant - 2.0).abs() < 1e-12);

        let negated = -doubled;
        assert!((negated.constant + 2.0).abs() < 1e-12);
    }
}
