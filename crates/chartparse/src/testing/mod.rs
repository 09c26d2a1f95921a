//! # Testing Utilities
//!
//! Random sentence generation for property tests, benchmarks and fuzzing.
//!
//! [`SentenceGenerator`] expands a grammar's start rule with randomly chosen
//! alternatives. Past the configured depth it only takes each nonterminal's
//! shortest-terminating rule, so every generated sentence is derivable from
//! the grammar as long as every nonterminal can derive some terminal string.
//!
//! ```rust
//! use chartparse::grammar::GrammarBuilder;
//! use chartparse::testing::{GeneratorConfig, SentenceGenerator};
//!
//! let grammar = GrammarBuilder::new()
//!     .rule("start", ["exp"], "start")
//!     .rule("exp", ["exp", "+", "exp"], "add")
//!     .rule("exp", ["NUMBER"], "num")
//!     .build()?;
//!
//! let generator = SentenceGenerator::new(&grammar, GeneratorConfig::default().with_seed(7));
//! let sentence = generator.generate();
//! assert_eq!(sentence.len() % 2, 1);
//! assert_eq!(sentence.first().map(|kind| kind.as_str()), Some("NUMBER"));
//! # Ok::<(), chartparse::error::GrammarError>(())
//! ```

use crate::grammar::{Grammar, RuleId};
use crate::intern::Symbol;
use crate::lexer::Token;
use compact_str::CompactString;
use hashbrown::HashMap;

/// Configuration for sentence generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Depth after which only shortest-terminating rules are chosen
    pub max_depth: usize,
    /// Seed for reproducible generation
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Random sentence generator for one grammar
#[derive(Debug)]
pub struct SentenceGenerator<'g> {
    grammar: &'g Grammar,
    config: GeneratorConfig,
    /// nonterminal -> rule with the lowest derivation height
    shortest: HashMap<Symbol, RuleId>,
}

impl<'g> SentenceGenerator<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar, config: GeneratorConfig) -> Self {
        Self {
            grammar,
            config,
            shortest: shortest_rules(grammar),
        }
    }

    /// Terminal types of one random sentence of the start rule
    #[must_use]
    pub fn generate(&self) -> Vec<CompactString> {
        let mut rng = self
            .config
            .seed
            .map_or_else(SimpleRng::new, SimpleRng::with_seed);
        let mut out = Vec::new();
        self.expand_rule(self.grammar.start(), 0, &mut rng, &mut out);
        out
    }

    /// One random sentence as tokens; `value` supplies each token's value
    /// from its type and index
    pub fn generate_tokens<V>(&self, mut value: impl FnMut(&str, usize) -> Option<V>) -> Vec<Token<V>> {
        self.generate()
            .into_iter()
            .enumerate()
            .map(|(index, kind)| {
                let mut token = Token::new(kind.clone()).with_position(index).with_line(1);
                if let Some(value) = value(&kind, index) {
                    token.set_value(value);
                }
                token
            })
            .collect()
    }

    fn expand_rule(&self, rule: RuleId, depth: usize, rng: &mut SimpleRng, out: &mut Vec<CompactString>) {
        for &symbol in self.grammar.rule(rule).rhs() {
            let alternatives = self.grammar.rules_for(symbol);
            if alternatives.is_empty() {
                out.push(self.grammar.name(symbol).into());
                continue;
            }
            let next = if depth >= self.config.max_depth {
                self.shortest.get(&symbol).copied()
            } else {
                let pick = rng.below(alternatives.len());
                alternatives.get(pick).copied()
            };
            if let Some(next) = next {
                self.expand_rule(next, depth + 1, rng, out);
            }
        }
    }
}

/// Fixed point over derivation heights: terminals have height 0, a rule is
/// one more than its tallest symbol, a nonterminal takes its lowest rule.
fn shortest_rules(grammar: &Grammar) -> HashMap<Symbol, RuleId> {
    let mut height: HashMap<Symbol, usize> = HashMap::new();
    let mut best: HashMap<Symbol, RuleId> = HashMap::new();

    loop {
        let mut changed = false;
        for (id, rule) in grammar.rules() {
            let tallest = rule.rhs().iter().try_fold(0, |tallest, symbol| {
                if grammar.is_nonterminal(*symbol) {
                    height.get(symbol).map(|&h| tallest.max(h))
                } else {
                    Some(tallest)
                }
            });
            let Some(tallest) = tallest else { continue };
            let candidate = tallest + 1;
            if height.get(&rule.lhs()).is_none_or(|&current| candidate < current) {
                height.insert(rule.lhs(), candidate);
                best.insert(rule.lhs(), id);
                changed = true;
            }
        }
        if !changed {
            return best;
        }
    }
}

/// Simple xorshift PRNG; sentence generation needs no stronger randomness
#[derive(Debug, Clone)]
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    const fn new() -> Self {
        Self {
            state: 0x853c_49e6_748f_ea9b,
        }
    }

    /// xorshift never leaves the all-zero state, so 0 maps to the default
    const fn with_seed(seed: u64) -> Self {
        if seed == 0 { Self::new() } else { Self { state: seed } }
    }

    const fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn below(&mut self, bound: usize) -> usize {
        let bound = u64::try_from(bound).unwrap_or(u64::MAX).max(1);
        usize::try_from(self.next_u64() % bound).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn grammar() -> Grammar {
        GrammarBuilder::new()
            .rule("start", ["exp"], "start")
            .rule("exp", ["(", "exp", ")"], "group")
            .rule("exp", ["exp", "+", "exp"], "add")
            .rule("exp", ["NUMBER"], "num")
            .build()
            .expect("valid grammar")
    }

    #[test]
    fn test_rng_determinism() {
        let mut a = SimpleRng::with_seed(12345);
        let mut b = SimpleRng::with_seed(12345);
        assert_eq!(a.next_u64(), b.next_u64());
        assert_eq!(a.next_u64(), b.next_u64());

        let mut zero = SimpleRng::with_seed(0);
        assert_ne!(zero.next_u64(), 0);
    }

    #[test]
    fn test_shortest_rules() {
        let grammar = grammar();
        let shortest = shortest_rules(&grammar);
        let exp = grammar.symbol("exp").expect("interned");
        let start = grammar.symbol("start").expect("interned");

        assert_eq!(shortest.get(&exp).map(|id| id.index()), Some(3));
        assert_eq!(shortest.get(&start).map(|id| id.index()), Some(0));
    }

    #[test]
    fn test_depth_zero_generates_minimal_sentence() {
        let grammar = grammar();
        let generator = SentenceGenerator::new(&grammar, GeneratorConfig::default().with_max_depth(0));
        assert_eq!(generator.generate(), vec![CompactString::from("NUMBER")]);
    }

    #[test]
    fn test_same_seed_same_sentence() {
        let grammar = grammar();
        let config = GeneratorConfig::default().with_seed(99);
        let a = SentenceGenerator::new(&grammar, config.clone()).generate();
        let b = SentenceGenerator::new(&grammar, config).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_tokens_attaches_values() {
        let grammar = grammar();
        let generator = SentenceGenerator::new(&grammar, GeneratorConfig::default().with_seed(3));
        let tokens = generator.generate_tokens(|kind, index| (kind == "NUMBER").then_some(index));

        for (index, token) in tokens.iter().enumerate() {
            assert_eq!(token.position(), Ok(index));
            match token.kind() {
                Ok("NUMBER") => assert_eq!(token.value(), Some(&index)),
                _ => assert_eq!(token.value(), None),
            }
        }
    }
}
