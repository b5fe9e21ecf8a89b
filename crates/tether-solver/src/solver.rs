//! The tableau engine.
//!
//! [`Solver`] keeps every registered constraint as rows over slack, error and
//! dummy symbols, keyed by their basic symbol in insertion order. Adding or
//! removing a constraint pivots its row in or out and re-runs the primal
//! simplex over the weighted error objective; rows with no natural pivot go
//! through an artificial-variable phase that is rolled back on failure.
//! Suggested edit values only shift row constants, and the dual simplex
//! repairs the rows that turned negative.

use indexmap::IndexMap;
use tracing::{debug, trace};

use tether_core::{
    near_zero, Constraint, EditConstraint, Expression, InternalSolverError, Relation,
    SolverError, Strength, Variable,
};

use crate::row::Row;
use crate::symbol::{Symbol, SymbolGenerator};

/// The symbols introduced to represent one constraint in the tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag {
    marker: Symbol,
    other: Option<Symbol>,
}

/// Bookkeeping for an edit variable.
#[derive(Debug, Clone)]
struct EditInfo {
    constraint: EditConstraint,
    tag: Tag,
    /// The last suggested value, the baseline for the next delta.
    constant: f64,
}

/// Which objective row an optimization pass minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    Main,
    Artificial,
}

/// Tableau state saved before the artificial-variable phase.
struct Snapshot {
    rows: IndexMap<Symbol, Row>,
    objective: Row,
    infeasible_rows: Vec<Symbol>,
}

/// An incremental solver for weighted linear constraints.
///
/// # Example
///
/// ```
/// use tether_solver::{Constrain, Solver, Strength, Variable};
///
/// let x = Variable::named("x");
/// let mut solver = Solver::new();
/// solver.add_constraint(&(&x).less_or_equal(100.0).with_strength(Strength::WEAK)).unwrap();
/// solver.add_constraint(&(&x).less_or_equal(20.0)).unwrap();
/// solver.update_variables();
///
/// assert!((solver.get_value(&x) - 20.0).abs() < 1e-6);
/// ```
#[derive(Debug, Default)]
pub struct Solver {
    symbols: SymbolGenerator,
    /// Registered constraints and the symbols that represent them
    constraints: IndexMap<Constraint, Tag>,
    /// Tableau rows in insertion order, keyed by basic symbol
    rows: IndexMap<Symbol, Row>,
    /// External variables, their symbols and their last computed values
    external_symbols: IndexMap<Variable, (Symbol, f64)>,
    /// Edit variables and their edit constraints
    edits: IndexMap<Variable, EditInfo>,
    /// Rows that may have a negative constant, processed last-in first-out
    infeasible_rows: Vec<Symbol>,
    /// Weighted sum of error symbols to minimize
    objective: Row,
    /// Objective of the artificial phase, present only while it runs
    artificial: Option<Row>,
}

impl Solver {
    /// An empty solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constraint and re-optimize.
    ///
    /// Fails with [`SolverError::UnsatisfiableConstraint`] if a required
    /// constraint conflicts with those already present; the solver is then
    /// left exactly as it was before the call.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        self.insert_constraint(constraint).map(|_| ())
    }

    /// Add several constraints, stopping at the first failure.
    pub fn add_constraints<'a>(
        &mut self,
        constraints: impl IntoIterator<Item = &'a Constraint>,
    ) -> Result<(), SolverError> {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Unregister a constraint and re-optimize.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let tag = self
            .constraints
            .shift_remove(constraint)
            .ok_or_else(|| SolverError::UnknownConstraint(constraint.clone()))?;

        // Remove the error weights from the objective before pivoting,
        // otherwise substitution carries them into other rows.
        self.remove_constraint_effects(constraint, &tag);

        // If the marker is basic, dropping its row removes the constraint.
        // Otherwise pivot the marker into the basis and drop that row.
        if self.rows.shift_remove(&tag.marker).is_none() {
            let (leaving, mut row) = self
                .take_marker_leaving_row(tag.marker)
                .ok_or(InternalSolverError::NoMarkerLeavingRow)?;
            trace!(?leaving, marker = ?tag.marker, "pivoting marker out of the tableau");
            row.solve_for_symbols(leaving, tag.marker);
            self.substitute(tag.marker, &row);
        }

        self.optimize(Objective::Main)?;
        debug!(%constraint, remaining = self.constraints.len(), "removed constraint");
        Ok(())
    }

    /// Check whether a constraint has been added to the solver.
    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains_key(constraint)
    }

    /// The registered constraints, in the order they were added.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.keys()
    }

    /// Register `variable` as an edit variable so [`Solver::suggest_value`] can drive it.
    ///
    /// The strength is clipped and must be weaker than [`Strength::REQUIRED`].
    pub fn add_edit_variable(
        &mut self,
        variable: &Variable,
        strength: Strength,
    ) -> Result<(), SolverError> {
        if self.edits.contains_key(variable) {
            return Err(SolverError::DuplicateEditVariable(variable.clone()));
        }

        let strength = strength.clip();
        if strength.is_required() {
            return Err(SolverError::RequiredFailure);
        }

        let constraint = EditConstraint::new(variable.clone(), strength);
        let tag = self.insert_constraint(constraint.constraint())?;
        self.edits.insert(
            variable.clone(),
            EditInfo {
                constraint,
                tag,
                constant: 0.0,
            },
        );

        debug!(%variable, %strength, "added edit variable");
        Ok(())
    }

    /// Remove an edit variable and its edit constraint.
    pub fn remove_edit_variable(&mut self, variable: &Variable) -> Result<(), SolverError> {
        let constraint = self
            .edits
            .get(variable)
            .map(|info| info.constraint.constraint().clone())
            .ok_or_else(|| SolverError::UnknownEditVariable(variable.clone()))?;

        self.remove_constraint(&constraint)?;
        self.edits.shift_remove(variable);

        debug!(%variable, "removed edit variable");
        Ok(())
    }

    /// Check whether `variable` is an edit variable.
    pub fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.edits.contains_key(variable)
    }

    /// The edit constraint registered for `variable`, with its last suggested value.
    pub fn edit_constraint(&self, variable: &Variable) -> Option<&EditConstraint> {
        self.edits.get(variable).map(|info| &info.constraint)
    }

    /// Suggest a value for an edit variable.
    ///
    /// Only the rows that depend on the edit constraint are touched; the
    /// dual simplex then restores feasibility.
    pub fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<(), SolverError> {
        let info = self
            .edits
            .get_mut(variable)
            .ok_or_else(|| SolverError::UnknownEditVariable(variable.clone()))?;

        let delta = value - info.constant;
        info.constant = value;
        info.constraint.set_suggested_value(value);
        let tag = info.tag;

        trace!(%variable, value, delta, "suggesting value");

        let other = tag.other.filter(|other| self.rows.contains_key(other));
        if let Some(row) = self.rows.get_mut(&tag.marker) {
            if row.add(-delta) < 0.0 {
                self.infeasible_rows.push(tag.marker);
            }
        } else if let Some(other) = other {
            if let Some(row) = self.rows.get_mut(&other) {
                if row.add(delta) < 0.0 {
                    self.infeasible_rows.push(other);
                }
            }
        } else {
            for (&symbol, row) in self.rows.iter_mut() {
                let coefficient = row.coefficient_for(tag.marker);
                if coefficient != 0.0
                    && row.add(delta * coefficient) < 0.0
                    && !symbol.is_external()
                {
                    self.infeasible_rows.push(symbol);
                }
            }
        }

        self.dual_optimize()?;
        Ok(())
    }

    /// Copy the solved values into the external variables.
    ///
    /// A variable whose symbol is not basic has the value zero.
    pub fn update_variables(&mut self) {
        for (symbol, value) in self.external_symbols.values_mut() {
            *value = self.rows.get(&*symbol).map_or(0.0, |row| row.constant);
        }
    }

    /// Get the value of a variable as of the last [`Solver::update_variables`].
    pub fn get_value(&self, variable: &Variable) -> f64 {
        self.external_symbols
            .get(variable)
            .map_or(0.0, |&(_, value)| value)
    }

    /// Evaluate an expression using the values from the last update.
    pub fn evaluate(&self, expression: &Expression) -> f64 {
        expression.value_with(|variable| self.get_value(variable))
    }

    /// Clear all constraints, edit variables and tableau state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add a constraint, returning the tag that represents it.
    fn insert_constraint(&mut self, constraint: &Constraint) -> Result<Tag, SolverError> {
        if self.constraints.contains_key(constraint) {
            return Err(SolverError::DuplicateConstraint(constraint.clone()));
        }

        let (mut row, tag) = self.create_row(constraint);
        let mut subject = Self::choose_subject(&row, &tag);

        // A row made only of dummies is either redundant (zero constant),
        // in which case the marker becomes basic, or contradicts the
        // required constraints already present.
        if subject.is_none() && row.all_dummies() {
            if !near_zero(row.constant) {
                debug!(%constraint, "rejected unsatisfiable constraint");
                return Err(self.unsatisfiable(constraint));
            }
            subject = Some(tag.marker);
        }

        match subject {
            Some(subject) => {
                row.solve_for(subject);
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                if !self.add_with_artificial_variable(row)? {
                    debug!(%constraint, "rejected unsatisfiable constraint");
                    return Err(self.unsatisfiable(constraint));
                }
            }
        }

        self.constraints.insert(constraint.clone(), tag);
        self.optimize(Objective::Main)?;

        debug!(%constraint, rows = self.rows.len(), "added constraint");
        Ok(tag)
    }

    fn unsatisfiable(&self, constraint: &Constraint) -> SolverError {
        SolverError::UnsatisfiableConstraint {
            constraint: constraint.clone(),
            conflicting: self.constraints.keys().cloned().collect(),
        }
    }

    /// Get the symbol for a variable, creating it on first use.
    fn var_symbol(&mut self, variable: &Variable) -> Symbol {
        if let Some(&(symbol, _)) = self.external_symbols.get(variable) {
            return symbol;
        }
        let symbol = self.symbols.next(Symbol::External);
        self.external_symbols.insert(variable.clone(), (symbol, 0.0));
        symbol
    }

    /// Translate a constraint into a tableau row and its tag.
    ///
    /// Basic variables are replaced by their rows, so the new row only
    /// refers to parametric symbols. Slack, error and dummy symbols are
    /// added according to the relation and strength, and the row is
    /// normalized to a non-negative constant.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let expression = constraint.expression();
        let strength = constraint.strength();
        let mut row = Row::new(expression.constant);

        for term in &expression.terms {
            if near_zero(term.coefficient) {
                continue;
            }

            let symbol = self.var_symbol(&term.variable);
            match self.rows.get(&symbol) {
                Some(basic_row) => row.insert_row(basic_row, term.coefficient),
                None => row.insert_symbol(symbol, term.coefficient),
            }
        }

        let tag = match constraint.relation() {
            Relation::LessOrEqual | Relation::GreaterOrEqual => {
                let coefficient = if constraint.relation() == Relation::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };

                let slack = self.symbols.next(Symbol::Slack);
                row.insert_symbol(slack, coefficient);

                let mut other = None;
                if !strength.is_required() {
                    let error = self.symbols.next(Symbol::Error);
                    row.insert_symbol(error, -coefficient);
                    self.objective.insert_symbol(error, strength.value());
                    other = Some(error);
                }

                Tag {
                    marker: slack,
                    other,
                }
            }
            Relation::Equal if strength.is_required() => {
                let dummy = self.symbols.next(Symbol::Dummy);
                row.insert_symbol(dummy, 1.0);
                Tag {
                    marker: dummy,
                    other: None,
                }
            }
            Relation::Equal => {
                // expression = errplus - errminus
                let errplus = self.symbols.next(Symbol::Error);
                let errminus = self.symbols.next(Symbol::Error);
                row.insert_symbol(errplus, -1.0);
                row.insert_symbol(errminus, 1.0);
                self.objective.insert_symbol(errplus, strength.value());
                self.objective.insert_symbol(errminus, strength.value());
                Tag {
                    marker: errplus,
                    other: Some(errminus),
                }
            }
        };

        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Choose the subject (basic variable) for a new row.
    ///
    /// Preference goes to the first external symbol, then to a slack or
    /// error marker with a negative coefficient. `None` means the row
    /// needs an artificial variable.
    fn choose_subject(row: &Row, tag: &Tag) -> Option<Symbol> {
        if let Some(&symbol) = row.cells.keys().find(|symbol| symbol.is_external()) {
            return Some(symbol);
        }

        std::iter::once(tag.marker)
            .chain(tag.other)
            .find(|symbol| symbol.is_pivotable() && row.coefficient_for(*symbol) < 0.0)
    }

    /// Add a row to the tableau through an artificial variable.
    ///
    /// Returns `false` if the row cannot be satisfied, in which case the
    /// tableau is restored to its state before the call.
    fn add_with_artificial_variable(&mut self, row: Row) -> Result<bool, InternalSolverError> {
        let snapshot = Snapshot {
            rows: self.rows.clone(),
            objective: self.objective.clone(),
            infeasible_rows: self.infeasible_rows.clone(),
        };

        let art = self.symbols.next(Symbol::Slack);
        let outcome = self.run_artificial_phase(art, row);
        self.artificial = None;

        if !matches!(outcome, Ok(true)) {
            self.rows = snapshot.rows;
            self.objective = snapshot.objective;
            self.infeasible_rows = snapshot.infeasible_rows;
        }

        trace!(?art, ?outcome, "artificial phase finished");
        outcome
    }

    fn run_artificial_phase(&mut self, art: Symbol, row: Row) -> Result<bool, InternalSolverError> {
        self.rows.insert(art, row.clone());
        self.artificial = Some(row);

        // Successful only if the artificial objective is optimized to zero.
        self.optimize(Objective::Artificial)?;
        let success = self
            .artificial
            .take()
            .is_some_and(|artificial| near_zero(artificial.constant));
        if !success {
            return Ok(false);
        }

        // If the artificial symbol is still basic, pivot it out of the basis.
        if let Some(mut art_row) = self.rows.shift_remove(&art) {
            if art_row.cells.is_empty() {
                return Ok(true);
            }

            let Some(entering) = art_row.any_pivotable_symbol() else {
                return Ok(false);
            };
            art_row.solve_for_symbols(art, entering);
            self.substitute(entering, &art_row);
            self.rows.insert(entering, art_row);
        }

        for row in self.rows.values_mut() {
            row.remove(art);
        }
        self.objective.remove(art);

        Ok(true)
    }

    /// Substitute a symbol throughout the tableau and the objectives.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for (&basic, candidate) in self.rows.iter_mut() {
            candidate.substitute(symbol, row);
            if !basic.is_external() && candidate.constant < 0.0 {
                self.infeasible_rows.push(basic);
            }
        }
        self.objective.substitute(symbol, row);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.substitute(symbol, row);
        }
    }

    fn objective_row(&self, objective: Objective) -> Option<&Row> {
        match objective {
            Objective::Main => Some(&self.objective),
            Objective::Artificial => self.artificial.as_ref(),
        }
    }

    /// Optimize an objective function using the primal simplex algorithm.
    fn optimize(&mut self, objective: Objective) -> Result<(), InternalSolverError> {
        loop {
            let entering = self.objective_row(objective).and_then(Self::entering_symbol);
            let Some(entering) = entering else {
                return Ok(()); // Optimal
            };

            let (leaving, mut row) = self
                .take_leaving_row(entering)
                .ok_or(InternalSolverError::UnboundedObjective)?;

            trace!(?objective, ?entering, ?leaving, "pivot");
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
    }

    /// Restore feasibility after edits using the dual simplex algorithm.
    fn dual_optimize(&mut self) -> Result<(), InternalSolverError> {
        while let Some(leaving) = self.infeasible_rows.pop() {
            let entering = match self.rows.get(&leaving) {
                Some(row) if row.constant < 0.0 => self
                    .dual_entering_symbol(row)
                    .ok_or(InternalSolverError::NoDualEnteringSymbol)?,
                _ => continue,
            };

            if let Some(mut row) = self.rows.shift_remove(&leaving) {
                trace!(?entering, ?leaving, "dual pivot");
                row.solve_for_symbols(leaving, entering);
                self.substitute(entering, &row);
                self.rows.insert(entering, row);
            }
        }
        Ok(())
    }

    /// The first non-dummy symbol with a negative objective coefficient.
    fn entering_symbol(objective: &Row) -> Option<Symbol> {
        objective
            .cells
            .iter()
            .find(|&(symbol, &coefficient)| !symbol.is_dummy() && coefficient < 0.0)
            .map(|(&symbol, _)| symbol)
    }

    /// The symbol that keeps the objective optimal while making `row` feasible.
    fn dual_entering_symbol(&self, row: &Row) -> Option<Symbol> {
        let mut min_ratio = f64::MAX;
        let mut entering = None;

        for (&symbol, &coefficient) in &row.cells {
            if symbol.is_dummy() || coefficient <= 0.0 {
                continue;
            }
            let ratio = self.objective.coefficient_for(symbol) / coefficient;
            if ratio < min_ratio {
                min_ratio = ratio;
                entering = Some(symbol);
            }
        }

        entering
    }

    /// Find and remove the row to leave the basis (minimum ratio test).
    fn take_leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row)> {
        let mut min_ratio = f64::MAX;
        let mut leaving = None;

        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }

            let coefficient = row.coefficient_for(entering);
            if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(symbol);
                }
            }
        }

        let leaving = leaving?;
        self.rows.shift_remove(&leaving).map(|row| (leaving, row))
    }

    /// Find and remove the row to pivot a non-basic marker into the basis.
    ///
    /// Prefers the restricted row with the most constraining negative
    /// coefficient, then one with a positive coefficient, then an
    /// external row.
    fn take_marker_leaving_row(&mut self, marker: Symbol) -> Option<(Symbol, Row)> {
        let mut negative_ratio = f64::MAX;
        let mut positive_ratio = f64::MAX;
        let mut first = None;
        let mut second = None;
        let mut third = None;

        for (&symbol, row) in &self.rows {
            let coefficient = row.coefficient_for(marker);
            if coefficient == 0.0 {
                continue;
            }

            if symbol.is_external() {
                third = Some(symbol);
            } else if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < negative_ratio {
                    negative_ratio = ratio;
                    first = Some(symbol);
                }
            } else {
                let ratio = row.constant / coefficient;
                if ratio < positive_ratio {
                    positive_ratio = ratio;
                    second = Some(symbol);
                }
            }
        }

        let leaving = first.or(second).or(third)?;
        self.rows.shift_remove(&leaving).map(|row| (leaving, row))
    }

    /// Undo the objective penalty a non-required constraint added.
    fn remove_constraint_effects(&mut self, constraint: &Constraint, tag: &Tag) {
        let error = if tag.marker.is_error() {
            Some(tag.marker)
        } else {
            tag.other.filter(Symbol::is_error)
        };

        if let Some(error) = error {
            let strength = constraint.strength().value();
            match self.rows.get(&error) {
                Some(row) => self.objective.insert_row(row, -strength),
                None => self.objective.insert_symbol(error, -strength),
            }
        }
    }
}
