use crate::error::GrammarError;
use crate::grammar::{
    ActionId, Associativity, Grammar, GrammarRule, Precedence, PrecedenceTable, PrecedenceTier,
};
use crate::intern::SymbolTable;
use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Declarative description of a grammar.
///
/// This is plain data: a host can construct it directly, fill it through
/// [`GrammarBuilder`], or (with the `serialize` feature) load it from a
/// file produced by an offline grammar compiler.
///
/// # Example
///
/// ```rust
/// use chartparse::grammar::{GrammarDefinition, RuleDefinition};
///
/// let definition = GrammarDefinition {
///     precedence: Vec::new(),
///     rules: vec![
///         RuleDefinition::new("list", ["list", "ITEM"], "push"),
///         RuleDefinition::new("list", ["ITEM"], "single"),
///     ],
/// };
/// let grammar = definition.build().expect("valid grammar");
/// assert_eq!(grammar.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GrammarDefinition {
    /// Precedence tiers, loosest-binding first
    #[cfg_attr(feature = "serialize", serde(default))]
    pub precedence: Vec<PrecedenceTier>,
    /// Rules in grammar order; the first one is the start rule
    pub rules: Vec<RuleDefinition>,
}

/// One production in a [`GrammarDefinition`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RuleDefinition {
    pub lhs: CompactString,
    pub rhs: Vec<CompactString>,
    pub action: ActionId,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub precedence: RulePrecedence,
}

impl RuleDefinition {
    #[must_use]
    pub fn new<I, S>(lhs: &str, rhs: I, action: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into_iter().map(Into::into).collect(),
            action: ActionId::from(action),
            precedence: RulePrecedence::Inherit,
        }
    }

    #[must_use]
    pub fn with_precedence(mut self, precedence: RulePrecedence) -> Self {
        self.precedence = precedence;
        self
    }
}

/// How a rule obtains its precedence level and associativity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum RulePrecedence {
    /// From the last right-hand-side symbol with a declared precedence
    #[default]
    Inherit,
    /// From a named symbol of the precedence table (like yacc's `%prec`)
    Of(CompactString),
    /// Given directly
    Explicit {
        level: u32,
        associativity: Associativity,
    },
}

impl GrammarDefinition {
    /// Intern all symbols and assemble the [`Grammar`].
    ///
    /// # Errors
    ///
    /// Any [`GrammarError`] raised by the precedence table, an unknown
    /// `%prec` symbol, an empty rule list, or an empty rule.
    pub fn build(&self) -> Result<Grammar, GrammarError> {
        let mut symbols = SymbolTable::new();
        let table = PrecedenceTable::from_tiers(&self.precedence, &mut symbols)?;

        let mut rules = Vec::with_capacity(self.rules.len());
        for definition in &self.rules {
            let lhs = symbols.intern(&definition.lhs);
            let rhs: Vec<_> = definition
                .rhs
                .iter()
                .map(|name| symbols.intern(name))
                .collect();

            let precedence = match &definition.precedence {
                RulePrecedence::Inherit => table.for_rhs(&rhs),
                RulePrecedence::Of(name) => symbols
                    .get(name)
                    .and_then(|symbol| table.get(symbol))
                    .ok_or_else(|| GrammarError::UnknownPrecedenceSymbol {
                        symbol: name.clone(),
                    })?,
                RulePrecedence::Explicit {
                    level,
                    associativity,
                } => Precedence {
                    level: *level,
                    associativity: *associativity,
                },
            };

            rules.push(GrammarRule::new(
                lhs,
                rhs,
                definition.action.clone(),
                precedence.level,
                precedence.associativity,
            ));
        }

        Grammar::new(symbols, rules, table)
    }
}

/// Fluent front-end for [`GrammarDefinition`].
///
/// Errors are collected and reported by [`GrammarBuilder::build`].
///
/// # Example
///
/// ```rust
/// use chartparse::grammar::{Associativity, GrammarBuilder};
///
/// let grammar = GrammarBuilder::new()
///     .precedence(Associativity::Left, ["-"])
///     .precedence(Associativity::Right, ["UMINUS"])
///     .rule("start", ["exp"], "start")
///     .rule("exp", ["exp", "-", "exp"], "sub")
///     .rule_with_precedence_of("exp", ["-", "exp"], "neg", "UMINUS")
///     .rule("exp", ["NUMBER"], "num")
///     .build()
///     .expect("valid grammar");
///
/// let neg = grammar.get_rule(2).expect("rule 2");
/// assert_eq!(neg.precedence(), 2);
/// assert_eq!(neg.associativity(), Associativity::Right);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    definition: GrammarDefinition,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing definition
    #[must_use]
    pub const fn from_definition(definition: GrammarDefinition) -> Self {
        Self { definition }
    }

    /// Declare the next (tighter-binding) precedence tier
    #[must_use]
    pub fn precedence<I, S>(mut self, associativity: Associativity, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.definition
            .precedence
            .push(PrecedenceTier::new(associativity, symbols));
        self
    }

    /// Add a rule inheriting its precedence from its right-hand side
    #[must_use]
    pub fn rule<I, S>(mut self, lhs: &str, rhs: I, action: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.definition
            .rules
            .push(RuleDefinition::new(lhs, rhs, action));
        self
    }

    /// Add a rule taking the precedence of `symbol`
    #[must_use]
    pub fn rule_with_precedence_of<I, S>(
        mut self,
        lhs: &str,
        rhs: I,
        action: &str,
        symbol: &str,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.definition.rules.push(
            RuleDefinition::new(lhs, rhs, action)
                .with_precedence(RulePrecedence::Of(symbol.into())),
        );
        self
    }

    /// Add a rule with an explicit precedence level and associativity
    #[must_use]
    pub fn rule_with_precedence<I, S>(
        mut self,
        lhs: &str,
        rhs: I,
        action: &str,
        level: u32,
        associativity: Associativity,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.definition.rules.push(
            RuleDefinition::new(lhs, rhs, action).with_precedence(RulePrecedence::Explicit {
                level,
                associativity,
            }),
        );
        self
    }

    #[must_use]
    pub const fn definition(&self) -> &GrammarDefinition {
        &self.definition
    }

    #[must_use]
    pub fn into_definition(self) -> GrammarDefinition {
        self.definition
    }

    /// Build the grammar
    ///
    /// # Errors
    ///
    /// See [`GrammarDefinition::build`].
    pub fn build(&self) -> Result<Grammar, GrammarError> {
        self.definition.build()
    }
}
