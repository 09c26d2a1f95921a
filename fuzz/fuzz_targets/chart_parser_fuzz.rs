#![no_main]
use chartparse::earley::ChartParser;
use chartparse::grammar::{Associativity, ComplexPointTable, GrammarBuilder, NoSemantics};
use chartparse::lexer::Token;
use libfuzzer_sys::fuzz_target;

// Chart size is quadratic in the token count
const MAX_TOKENS: usize = 48;

const ALPHABET: [&str; 8] = ["NUMBER", "+", "-", "*", "^", "(", ")", "?"];

fuzz_target!(|data: &[u8]| {
    let Ok(grammar) = GrammarBuilder::new()
        .precedence(Associativity::Left, ["+", "-"])
        .precedence(Associativity::Left, ["*"])
        .precedence(Associativity::Right, ["^"])
        .precedence(Associativity::Right, ["UMINUS"])
        .rule("start", ["exp"], "start")
        .rule("exp", ["exp", "+", "exp"], "add")
        .rule("exp", ["exp", "-", "exp"], "sub")
        .rule("exp", ["exp", "*", "exp"], "mul")
        .rule("exp", ["exp", "^", "exp"], "pow")
        .rule_with_precedence_of("exp", ["-", "exp"], "neg", "UMINUS")
        .rule("exp", ["(", "exp", ")"], "group")
        .rule("exp", ["NUMBER"], "num")
        .build()
    else {
        return;
    };
    let complex = ComplexPointTable::for_grammar(&grammar);

    // "?" never appears in the grammar and must simply fail to scan
    let tokens: Vec<Token<()>> = data
        .iter()
        .take(MAX_TOKENS)
        .enumerate()
        .map(|(index, byte)| {
            Token::new(ALPHABET[usize::from(*byte) % ALPHABET.len()]).with_position(index)
        })
        .collect();

    let mut parser = ChartParser::new(&grammar, &complex, NoSemantics);
    if parser.parse(tokens).is_err() {
        return;
    }

    // Consistent precedence leaves at most one derivation
    let finals = parser.final_states().unwrap_or_default();
    assert!(finals.len() <= 1);
    for id in finals {
        let _ = parser.derivation(id);
    }
    let _ = parser.render_chart();
});
