//! Tableau symbols.

/// A tableau column, tagged with the role it plays.
///
/// The payload is an id from [`SymbolGenerator`]; a symbol is never reused
/// across constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Symbol {
    /// Bound once to a caller's `Variable`
    External(usize),
    /// Turns an inequality into an equality; doubles as its marker
    Slack(usize),
    /// Measures how far a non-required constraint is violated; weighted in the objective
    Error(usize),
    /// Marks a required equality; costless and never picked to enter the basis
    Dummy(usize),
}

impl Symbol {
    pub(crate) fn is_external(&self) -> bool {
        matches!(self, Symbol::External(_))
    }

    pub(crate) fn is_slack(&self) -> bool {
        matches!(self, Symbol::Slack(_))
    }

    pub(crate) fn is_error(&self) -> bool {
        matches!(self, Symbol::Error(_))
    }

    pub(crate) fn is_dummy(&self) -> bool {
        matches!(self, Symbol::Dummy(_))
    }

    /// Slack and error symbols may be pivoted into the basis on their own.
    pub(crate) fn is_pivotable(&self) -> bool {
        self.is_slack() || self.is_error()
    }
}

/// Hands out fresh symbols.
#[derive(Debug, Default)]
pub(crate) struct SymbolGenerator {
    next_id: usize,
}

impl SymbolGenerator {
    /// Create a symbol of the given kind, e.g. `generator.next(Symbol::Slack)`.
    pub(crate) fn next(&mut self, kind: fn(usize) -> Symbol) -> Symbol {
        let id = self.next_id;
        self.next_id += 1;
        kind(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_symbols_are_unique() {
        let mut symbols = SymbolGenerator::default();
        let a = symbols.next(Symbol::Slack);
        let b = symbols.next(Symbol::Slack);
        let c = symbols.next(Symbol::Error);
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn test_roles() {
        let mut symbols = SymbolGenerator::default();
        let external = symbols.next(Symbol::External);
        let slack = symbols.next(Symbol::Slack);
        let error = symbols.next(Symbol::Error);
        let dummy = symbols.next(Symbol::Dummy);

        assert!(external.is_external() && !external.is_pivotable());
        assert!(slack.is_slack() && slack.is_pivotable());
        assert!(error.is_error() && error.is_pivotable());
        assert!(dummy.is_dummy() && !dummy.is_pivotable());
    }
}
