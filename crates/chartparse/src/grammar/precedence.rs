//! Operator precedence declarations
//!
//! Precedence is declared in tiers, loosest-binding first, the way yacc
//! lists `%left`/`%right` lines. Tier `k` gets level `k + 1`; level 0 means
//! "no declared precedence".

use crate::error::GrammarError;
use crate::grammar::Associativity;
use crate::intern::{Symbol, SymbolTable};
use compact_str::CompactString;
use hashbrown::HashMap;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// One declared tier: an associativity shared by a group of symbols
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PrecedenceTier {
    pub associativity: Associativity,
    pub symbols: Vec<CompactString>,
}

impl PrecedenceTier {
    #[must_use]
    pub fn new<I, S>(associativity: Associativity, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            associativity,
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

/// Precedence level and associativity of a symbol or rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Precedence {
    /// Higher binds tighter; 0 is undeclared
    pub level: u32,
    pub associativity: Associativity,
}

/// Symbol -> precedence lookup built from declared tiers
#[derive(Debug, Clone, Default)]
pub struct PrecedenceTable {
    entries: HashMap<Symbol, Precedence>,
    tiers: u32,
}

impl PrecedenceTable {
    /// Build the table, interning every listed symbol.
    ///
    /// # Errors
    ///
    /// [`GrammarError::EmptyPrecedenceTier`] for a tier without symbols and
    /// [`GrammarError::DuplicatePrecedence`] when a symbol is listed twice.
    pub fn from_tiers(
        tiers: &[PrecedenceTier],
        symbols: &mut SymbolTable,
    ) -> Result<Self, GrammarError> {
        let mut entries = HashMap::new();
        for (index, tier) in tiers.iter().enumerate() {
            if tier.symbols.is_empty() {
                return Err(GrammarError::EmptyPrecedenceTier { index });
            }
            let level = u32::try_from(index + 1).unwrap_or(u32::MAX);
            for name in &tier.symbols {
                let symbol = symbols.intern(name);
                let previous = entries.insert(
                    symbol,
                    Precedence {
                        level,
                        associativity: tier.associativity,
                    },
                );
                if previous.is_some() {
                    return Err(GrammarError::DuplicatePrecedence {
                        symbol: name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            entries,
            tiers: u32::try_from(tiers.len()).unwrap_or(u32::MAX),
        })
    }

    #[must_use]
    pub fn get(&self, symbol: Symbol) -> Option<Precedence> {
        self.entries.get(&symbol).copied()
    }

    /// Precedence a rule inherits from its right-hand side: that of the
    /// last symbol with a declared precedence, or level 0 / `Left`.
    #[must_use]
    pub fn for_rhs(&self, rhs: &[Symbol]) -> Precedence {
        rhs.iter()
            .rev()
            .find_map(|&symbol| self.get(symbol))
            .unwrap_or_default()
    }

    /// Number of declared tiers (the highest level in use)
    #[must_use]
    pub const fn tiers(&self) -> u32 {
        self.tiers
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_follow_declaration_order() {
        let mut symbols = SymbolTable::new();
        let table = PrecedenceTable::from_tiers(
            &[
                PrecedenceTier::new(Associativity::Left, ["+", "-"]),
                PrecedenceTier::new(Associativity::Left, ["*"]),
                PrecedenceTier::new(Associativity::Right, ["^"]),
            ],
            &mut symbols,
        )
        .expect("valid table");

        let plus = symbols.get("+").expect("interned");
        let times = symbols.get("*").expect("interned");
        let power = symbols.get("^").expect("interned");

        assert_eq!(table.get(plus).map(|p| p.level), Some(1));
        assert_eq!(table.get(times).map(|p| p.level), Some(2));
        assert_eq!(
            table.get(power),
            Some(Precedence {
                level: 3,
                associativity: Associativity::Right
            })
        );
        assert_eq!(table.tiers(), 3);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut symbols = SymbolTable::new();
        let err = PrecedenceTable::from_tiers(
            &[
                PrecedenceTier::new(Associativity::Left, ["+"]),
                PrecedenceTier::new(Associativity::Right, ["+"]),
            ],
            &mut symbols,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GrammarError::DuplicatePrecedence { symbol: "+".into() }
        );
    }

    #[test]
    fn test_empty_tier_rejected() {
        let mut symbols = SymbolTable::new();
        let tiers = [PrecedenceTier::new(Associativity::Left, Vec::<&str>::new())];
        let err = PrecedenceTable::from_tiers(&tiers, &mut symbols).unwrap_err();
        assert_eq!(err, GrammarError::EmptyPrecedenceTier { index: 0 });
    }

    #[test]
    fn test_rhs_uses_last_declared_symbol() {
        let mut symbols = SymbolTable::new();
        let table = PrecedenceTable::from_tiers(
            &[
                PrecedenceTier::new(Associativity::Left, ["+"]),
                PrecedenceTier::new(Associativity::Left, ["*"]),
            ],
            &mut symbols,
        )
        .expect("valid table");
        let exp = symbols.intern("exp");
        let plus = symbols.intern("+");
        let times = symbols.intern("*");

        assert_eq!(table.for_rhs(&[exp, plus, exp, times, exp]).level, 2);
        assert_eq!(table.for_rhs(&[exp]), Precedence::default());
    }
}
