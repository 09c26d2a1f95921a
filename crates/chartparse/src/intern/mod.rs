//! # Symbol Interning
//!
//! Grammar symbols are strings in the grammar definition but are compared
//! constantly while parsing. Each distinct name is interned once and
//! replaced by a small [`Symbol`] key:
//!
//! - **O(1) comparison**: compare keys instead of string contents
//! - **Copy**: states carry symbols by value
//! - **Lookup without insertion**: token types are resolved with
//!   [`SymbolTable::get`], so unknown types never grow the table
//!
//! ```rust
//! use chartparse::intern::SymbolTable;
//!
//! let mut table = SymbolTable::new();
//! let exp = table.intern("exp");
//! assert_eq!(table.intern("exp"), exp);
//! assert_eq!(table.resolve(exp), "exp");
//! assert!(table.get("NUMBER").is_none());
//! ```

use lasso::{Rodeo, Spur};
use std::fmt;

/// An interned grammar symbol (terminal or nonterminal).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    /// Get the raw `Spur` value
    #[must_use]
    pub const fn as_spur(&self) -> Spur {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.0)
    }
}

/// Interner owning the names of all grammar symbols.
pub struct SymbolTable {
    rodeo: Rodeo,
}

impl SymbolTable {
    /// Create a new empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Intern a name, returning its symbol
    ///
    /// Interning the same name twice returns the same symbol.
    pub fn intern(&mut self, name: &str) -> Symbol {
        Symbol(self.rodeo.get_or_intern(name))
    }

    /// Look up a name without interning it
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.rodeo.get(name).map(Symbol)
    }

    /// Resolve a symbol back to its name
    ///
    /// # Panics
    ///
    /// Panics if the symbol was produced by a different table.
    #[must_use]
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.rodeo.resolve(&symbol.0)
    }

    /// Number of interned symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("len", &self.rodeo.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut table = SymbolTable::new();
        let a = table.intern("exp");
        let b = table.intern("exp");
        let c = table.intern("NUMBER");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut table = SymbolTable::new();
        table.intern("exp");

        assert!(table.get("exp").is_some());
        assert!(table.get("missing").is_none());
        assert_eq!(table.len(), 1);
    }
}
