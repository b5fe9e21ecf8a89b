//! Sparse tableau rows.

use indexmap::IndexMap;
use tether_core::near_zero;

use crate::symbol::Symbol;

/// A row in the simplex tableau: `constant + Σ(coefficient * symbol) = 0`.
///
/// No cell ever holds a near-zero coefficient; such entries are pruned as
/// soon as they are produced. Cells keep insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Row {
    pub(crate) constant: f64,
    pub(crate) cells: IndexMap<Symbol, f64>,
}

impl Row {
    pub(crate) fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: IndexMap::new(),
        }
    }

    /// Add a value to the constant, returning the new constant.
    pub(crate) fn add(&mut self, delta: f64) -> f64 {
        self.constant += delta;
        self.constant
    }

    /// Accumulate a coefficient for a symbol, dropping the cell if it cancels out.
    pub(crate) fn insert_symbol(&mut self, symbol: Symbol, coefficient: f64) {
        let entry = self.cells.entry(symbol).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.shift_remove(&symbol);
        }
    }

    /// Add `other * coefficient` to this row.
    pub(crate) fn insert_row(&mut self, other: &Row, coefficient: f64) {
        self.constant += other.constant * coefficient;
        for (&symbol, &c) in &other.cells {
            self.insert_symbol(symbol, c * coefficient);
        }
    }

    pub(crate) fn remove(&mut self, symbol: Symbol) {
        self.cells.shift_remove(&symbol);
    }

    pub(crate) fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for coefficient in self.cells.values_mut() {
            *coefficient = -*coefficient;
        }
    }

    /// Rewrite the row as the definition of `symbol`.
    ///
    /// Turns `a * symbol + rest = 0` into `symbol = -rest / a`, dropping
    /// `symbol` from the cells. The symbol must be present.
    pub(crate) fn solve_for(&mut self, symbol: Symbol) {
        let coefficient = self
            .cells
            .shift_remove(&symbol)
            .unwrap_or_else(|| panic!("solve_for: {:?} is not in the row", symbol));
        let multiplier = -1.0 / coefficient;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Solve for `rhs` in a row currently expressing `lhs`.
    ///
    /// `lhs` must be absent from the row and `rhs` present.
    pub(crate) fn solve_for_symbols(&mut self, lhs: Symbol, rhs: Symbol) {
        self.insert_symbol(lhs, -1.0);
        self.solve_for(rhs);
    }

    pub(crate) fn coefficient_for(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    /// Replace `symbol` with the expression held by `row`.
    pub(crate) fn substitute(&mut self, symbol: Symbol, row: &Row) {
        if let Some(coefficient) = self.cells.shift_remove(&symbol) {
            self.insert_row(row, coefficient);
        }
    }

    pub(crate) fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    /// The first slack or error symbol in the row.
    pub(crate) fn any_pivotable_symbol(&self) -> Option<Symbol> {
        self.cells.keys().copied().find(Symbol::is_pivotable)
    }
}
