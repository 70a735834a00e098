//! Symbol debouncer and text accumulator.
//!
//! The classifier produces a label for every analyzed frame. While a hand is
//! held still the same label arrives again and again; the accumulator keeps
//! only the first of each run. There is no timer: a symbol is suppressed only
//! when it equals the last accepted one, so `A A B A` accumulates `A B A`.

use crate::labels::Symbol;

/// What [`SymbolAccumulator::observe`] did with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Nothing was recognized; state unchanged.
    Absent,
    /// Same as the last accepted symbol; state unchanged.
    Repeated(Symbol),
    /// Appended to the text.
    Accepted(Symbol),
}

/// Accumulated text plus the last accepted symbol.
///
/// Invariant: `last_accepted()` is the last element of `symbols()`, or
/// `None` when no symbol has been accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolAccumulator {
    symbols: Vec<Symbol>,
}

impl SymbolAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one classification result.
    pub fn observe(&mut self, symbol: Option<Symbol>) -> Observation {
        let Some(symbol) = symbol else {
            return Observation::Absent;
        };
        if self.last_accepted() == Some(&symbol) {
            return Observation::Repeated(symbol);
        }
        self.symbols.push(symbol.clone());
        Observation::Accepted(symbol)
    }

    pub fn last_accepted(&self) -> Option<&Symbol> {
        self.symbols.last()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Accumulated text, symbols concatenated in acceptance order.
    pub fn text(&self) -> String {
        self.symbols.iter().map(Symbol::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Drops all accumulated symbols.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Option<Symbol> {
        Symbol::new(s)
    }

    fn feed(acc: &mut SymbolAccumulator, input: &[&str]) {
        for s in input {
            acc.observe(sym(s));
        }
    }

    #[test]
    fn test_first_symbol_is_accepted() {
        let mut acc = SymbolAccumulator::new();
        assert_eq!(acc.observe(sym("A")), Observation::Accepted(Symbol::new("A").unwrap()));
        assert_eq!(acc.text(), "A");
        assert_eq!(acc.last_accepted(), sym("A").as_ref());
    }

    #[test]
    fn test_identical_run_adds_one_entry() {
        let mut acc = SymbolAccumulator::new();
        feed(&mut acc, &["H"; 30]);
        assert_eq!(acc.symbols().len(), 1);
        assert_eq!(acc.text(), "H");
    }

    #[test]
    fn test_repeat_reports_repeated() {
        let mut acc = SymbolAccumulator::new();
        acc.observe(sym("A"));
        assert_eq!(acc.observe(sym("A")), Observation::Repeated(Symbol::new("A").unwrap()));
    }

    #[test]
    fn test_novel_after_repeat() {
        let mut acc = SymbolAccumulator::new();
        feed(&mut acc, &["A", "A", "B", "A"]);
        let texts: Vec<&str> = acc.symbols().iter().map(Symbol::as_str).collect();
        assert_eq!(texts, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_absent_is_noop_everywhere() {
        let mut acc = SymbolAccumulator::new();
        assert_eq!(acc.observe(None), Observation::Absent);
        assert!(acc.is_empty());

        acc.observe(sym("A"));
        let before = acc.clone();
        assert_eq!(acc.observe(None), Observation::Absent);
        assert_eq!(acc, before);
    }

    #[test]
    fn test_absent_does_not_break_a_run() {
        // A gap with no hand between two identical letters still debounces.
        let mut acc = SymbolAccumulator::new();
        acc.observe(sym("L"));
        acc.observe(None);
        assert_eq!(acc.observe(sym("L")), Observation::Repeated(Symbol::new("L").unwrap()));
        assert_eq!(acc.text(), "L");
    }

    #[test]
    fn test_multi_character_labels_concatenate() {
        let mut acc = SymbolAccumulator::new();
        feed(&mut acc, &["LL", "A", "RR"]);
        assert_eq!(acc.text(), "LLARR");
    }

    #[test]
    fn test_last_accepted_tracks_tail() {
        let mut acc = SymbolAccumulator::new();
        let inputs = ["A", "A", "B", "B", "C", "A"];
        for s in inputs {
            acc.observe(sym(s));
            assert_eq!(acc.last_accepted(), acc.symbols().last());
        }
    }

    #[test]
    fn test_clear() {
        let mut acc = SymbolAccumulator::new();
        feed(&mut acc, &["A", "B"]);
        acc.clear();
        assert!(acc.is_empty());
        assert!(acc.last_accepted().is_none());
        assert_eq!(acc.text(), "");
        // After clearing, the previous last symbol is novel again.
        assert!(matches!(acc.observe(sym("B")), Observation::Accepted(_)));
    }
}
