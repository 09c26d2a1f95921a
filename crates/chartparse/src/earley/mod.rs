mod chart;
mod config;
mod disambiguation;
mod forest;
mod history;
mod parser;
mod render;
mod state;

pub use chart::Chart;
pub use config::{DebugLevel, ParserConfig};
pub use disambiguation::{AmbiguityResolver, RankConflict, higher_rank};
pub use forest::Derivation;
pub use history::History;
pub use render::{render_chart, render_state};
pub use state::{Matched, ParseState, Rank, StateId};

use crate::error::ParseError;
use crate::grammar::{ComplexPointTable, Grammar, NoSemantics, Semantics};
use crate::lexer::Token;
use tracing::trace;

/// Earley-style chart parser with precedence-driven ambiguity resolution.
///
/// The parser borrows its grammar and complex-point table, so one grammar
/// can serve any number of parsers. Each call to [`ChartParser::parse`]
/// builds a fresh chart; results are read back from it afterwards.
///
/// # Example
///
/// ```rust
/// use chartparse::earley::ChartParser;
/// use chartparse::grammar::{Associativity, ComplexPointTable, GrammarBuilder, NoSemantics};
/// use chartparse::lexer::Token;
///
/// let grammar = GrammarBuilder::new()
///     .precedence(Associativity::Left, ["+"])
///     .precedence(Associativity::Left, ["*"])
///     .rule("start", ["exp"], "start")
///     .rule("exp", ["exp", "+", "exp"], "add")
///     .rule("exp", ["exp", "*", "exp"], "mul")
///     .rule("exp", ["NUMBER"], "num")
///     .build()?;
/// let complex = ComplexPointTable::for_grammar(&grammar);
///
/// let mut parser = ChartParser::new(&grammar, &complex, NoSemantics);
/// let tokens = ["NUMBER", "+", "NUMBER", "*", "NUMBER"].map(Token::new).to_vec();
/// parser.parse(tokens)?;
///
/// let finals = parser.final_states().expect("parse ran");
/// assert_eq!(finals.len(), 1);
/// let tree = parser.derivation(finals[0]).expect("complete state");
/// assert_eq!(
///     tree.to_string(),
///     "start[exp[exp[NUMBER] + exp[exp[NUMBER] * exp[NUMBER]]]]"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ChartParser<'g, S: Semantics = NoSemantics> {
    grammar: &'g Grammar,
    complex: &'g ComplexPointTable,
    semantics: S,
    config: ParserConfig,
    run: Option<ParseRun<S::Value>>,
}

/// Chart and input of the last successful parse
struct ParseRun<V> {
    chart: Chart<V>,
    tokens: Vec<Token<V>>,
}

impl<'g, S: Semantics> ChartParser<'g, S> {
    #[must_use]
    pub fn new(grammar: &'g Grammar, complex: &'g ComplexPointTable, semantics: S) -> Self {
        Self {
            grammar,
            complex,
            semantics,
            config: ParserConfig::default(),
            run: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    #[must_use]
    pub const fn semantics(&self) -> &S {
        &self.semantics
    }

    /// Parse a token sequence.
    ///
    /// Any previous chart is dropped first. Finding no derivation is not an
    /// error; [`ChartParser::final_states`] is then empty.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidToken`] for a token without a usable type and
    /// [`ParseError::AssociativityConflict`] when resolution meets two
    /// derivations with the same precedence level but different
    /// associativity. [`ParseError::StateLimit`] when the chart runs out of
    /// state ids. After an error no chart is kept.
    pub fn parse(&mut self, tokens: Vec<Token<S::Value>>) -> Result<(), ParseError> {
        self.run = None;

        let ctx = parser::ParseContext {
            grammar: self.grammar,
            complex: self.complex,
            semantics: &self.semantics,
            config: &self.config,
            tokens: &tokens,
        };
        let chart = parser::parse(&ctx)?;
        trace!(
            tokens = tokens.len(),
            states = chart.state_count(),
            "parse finished"
        );

        self.run = Some(ParseRun { chart, tokens });
        Ok(())
    }

    /// Accepting states: completed start-rule items from column 0 found in
    /// the last column.
    ///
    /// `None` if no parse has run (or the last one failed with an error).
    #[must_use]
    pub fn final_states(&self) -> Option<Vec<StateId>> {
        let run = self.run.as_ref()?;
        let start = self.grammar.start();
        Some(
            run.chart
                .last()
                .iter()
                .copied()
                .filter(|&id| run.chart.state(id).accepts(self.grammar, start))
                .collect(),
        )
    }

    /// Semantic values of the accepting states
    #[must_use]
    pub fn results(&self) -> Vec<&S::Value> {
        let (Some(run), Some(finals)) = (self.run.as_ref(), self.final_states()) else {
            return Vec::new();
        };
        finals
            .into_iter()
            .filter_map(|id| run.chart.state(id).container())
            .collect()
    }

    /// Whether the last parse found at least one derivation
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.final_states().is_some_and(|finals| !finals.is_empty())
    }

    #[must_use]
    pub fn chart(&self) -> Option<&Chart<S::Value>> {
        self.run.as_ref().map(|run| &run.chart)
    }

    /// Tokens of the last parse
    #[must_use]
    pub fn tokens(&self) -> Option<&[Token<S::Value>]> {
        self.run.as_ref().map(|run| run.tokens.as_slice())
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&ParseState<S::Value>> {
        self.chart()?.get_state(id)
    }

    /// Derivation tree rooted at a completed state
    #[must_use]
    pub fn derivation(&self, id: StateId) -> Option<Derivation> {
        Derivation::build(self.grammar, self.chart()?, id)
    }

    /// Ranking history of a state: its shifts and reductions in input order
    #[must_use]
    pub fn history(&self, id: StateId) -> Option<Vec<Rank>> {
        let chart = self.chart()?;
        let state = chart.get_state(id)?;
        Some(History::new(self.grammar, chart, state).collect())
    }

    /// Chart dump in the diagnostics format
    #[must_use]
    pub fn render_chart(&self) -> Option<String> {
        self.chart()
            .map(|chart| render_chart(self.grammar, chart))
    }
}
