//! Variables and terms.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_VARIABLE_ID: AtomicUsize = AtomicUsize::new(0);

/// An unknown whose value the solver computes.
///
/// Variables compare and hash by identity: every call to [`Variable::new`]
/// or [`Variable::named`] produces a distinct variable, and clones refer to
/// the same one. The optional name is only used for display.
#[derive(Debug, Clone)]
pub struct Variable {
    id: usize,
    name: Option<Arc<str>>,
}

impl Variable {
    /// Create a new anonymous variable.
    pub fn new() -> Self {
        Self {
            id: NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed),
            name: None,
        }
    }

    /// Create a new variable with a display name.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    /// The unique identifier of this variable.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "v{}", self.id),
        }
    }
}

/// A variable scaled by a coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: f64,
}

impl Term {
    pub fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }

    /// Evaluate the term with the given variable value.
    pub fn value_with(&self, value: f64) -> f64 {
        self.coefficient * value
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::new(variable, 1.0)
    }
}

impl From<&Variable> for Term {
    fn from(variable: &Variable) -> Self {
        Term::new(variable.clone(), 1.0)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.coefficient - 1.0).abs() < crate::EPSILON {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "{} * {}", self.coefficient, self.variable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_are_distinct() {
        let a = Variable::named("x");
        let b = Variable::named("x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_variable_display() {
        let named = Variable::named("width");
        assert_eq!(named.to_string(), "width");

        let anonymous = Variable::new();
        assert_eq!(anonymous.to_string(), format!("v{}", anonymous.id()));
    }

    #[test]
    fn test_term_defaults_to_unit_coefficient() {
        let x = Variable::named("x");
        let term = Term::from(&x);
        assert_eq!(term.coefficient, 1.0);
        assert_eq!(term.to_string(), "x");

        let scaled = Term::new(x, 2.5);
        assert_eq!(scaled.to_string(), "2.5 * x");
        assert!((scaled.value_with(4.0) - 10.0).abs() < 1e-12);
    }
}
