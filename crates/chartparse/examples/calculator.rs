//! Calculator example
//!
//! Evaluates the integer expressions given on the command line (or a few
//! built-in ones) with a precedence-annotated ambiguous grammar.
//!
//! ```text
//! cargo run --example calculator -- "2+3*4" "2^3^2"
//! RUST_LOG=chartparse=debug CHART_DEBUG=1 cargo run --example calculator -- "1-2-3"
//! ```
//!
//! `CHART_DEBUG` takes the debug level (0, 1 or 2) and needs `RUST_LOG` at
//! `debug` to show the chart dumps.

use chartparse::earley::{ChartParser, DebugLevel, ParserConfig};
use chartparse::grammar::{
    ActionId, Associativity, ComplexPointTable, Grammar, GrammarBuilder, Semantics,
};
use chartparse::lexer::Token;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Calculator;

impl Semantics for Calculator {
    type Value = i64;

    fn terminal(&self, token: &Token<i64>) -> i64 {
        token.value().copied().unwrap_or_default()
    }

    fn reduce(&self, action: &ActionId, children: Vec<i64>) -> i64 {
        match (action.as_str(), children.as_slice()) {
            ("add", [a, _, b]) => a.wrapping_add(*b),
            ("sub", [a, _, b]) => a.wrapping_sub(*b),
            ("mul", [a, _, b]) => a.wrapping_mul(*b),
            ("div", [a, _, b]) => a.checked_div(*b).unwrap_or_default(),
            ("pow", [a, _, b]) => a.wrapping_pow(u32::try_from(*b).unwrap_or(0)),
            ("neg", [_, a]) => a.wrapping_neg(),
            ("group", [_, a, _]) => *a,
            (_, [a, ..]) => *a,
            (_, []) => 0,
        }
    }
}

fn calculator_grammar() -> Result<Grammar, chartparse::error::GrammarError> {
    GrammarBuilder::new()
        .precedence(Associativity::Left, ["+", "-"])
        .precedence(Associativity::Left, ["*", "/"])
        .precedence(Associativity::Right, ["^"])
        .precedence(Associativity::Right, ["UMINUS"])
        .rule("start", ["exp"], "start")
        .rule("exp", ["exp", "+", "exp"], "add")
        .rule("exp", ["exp", "-", "exp"], "sub")
        .rule("exp", ["exp", "*", "exp"], "mul")
        .rule("exp", ["exp", "/", "exp"], "div")
        .rule("exp", ["exp", "^", "exp"], "pow")
        .rule_with_precedence_of("exp", ["-", "exp"], "neg", "UMINUS")
        .rule("exp", ["(", "exp", ")"], "group")
        .rule("exp", ["NUMBER"], "num")
        .build()
}

/// Multi-digit numbers, single-character operators, whitespace skipped
fn lex(input: &str) -> Vec<Token<i64>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let token = if let Some(digit) = c.to_digit(10) {
            let mut value = i64::from(digit);
            while let Some(next) = chars.peek().and_then(|&(_, c)| c.to_digit(10)) {
                value = value.saturating_mul(10).saturating_add(i64::from(next));
                chars.next();
            }
            Token::new("NUMBER").with_value(value).with_rule("number")
        } else {
            Token::new(c.to_string()).with_rule("operator")
        };
        tokens.push(token.with_position(offset).with_line(1));
    }
    tokens
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "chartparse=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let debug = match std::env::var("CHART_DEBUG") {
        Ok(level) => DebugLevel::try_from(level.parse::<u8>()?)?,
        Err(_) => DebugLevel::Silent,
    };

    let grammar = calculator_grammar()?;
    let complex = ComplexPointTable::for_grammar(&grammar);
    let mut parser = ChartParser::new(&grammar, &complex, Calculator)
        .with_config(ParserConfig::new().with_debug(debug));

    let mut inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        inputs = ["2+3*4", "2-3-4", "2^3^2", "-2*3", "(2+3)*4"]
            .map(String::from)
            .to_vec();
    }

    for input in &inputs {
        parser.parse(lex(input))?;
        let Some(finals) = parser.final_states() else {
            continue;
        };
        match finals.first() {
            Some(&id) => {
                let value = parser.state(id).and_then(|state| state.container());
                let tree = parser.derivation(id).map(|tree| tree.to_string());
                println!("{input} = {value:?}");
                println!("    {}", tree.unwrap_or_default());
            }
            None => println!("{input}: syntax error"),
        }
    }
    Ok(())
}
