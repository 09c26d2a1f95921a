//! Tests for grammar construction, precedence tables and complex points

use chartparse::error::GrammarError;
use chartparse::grammar::{
    Associativity, ComplexPointTable, ComplexPoints, Grammar, GrammarBuilder, GrammarDefinition,
    RuleDefinition, RuleId, RulePrecedence,
};

fn rule_id(grammar: &Grammar, index: usize) -> RuleId {
    grammar.rule_id(index).expect("rule index in range")
}

fn create_expression_builder() -> GrammarBuilder {
    GrammarBuilder::new()
        .precedence(Associativity::Left, ["+", "-"])
        .precedence(Associativity::Left, ["*"])
        .precedence(Associativity::Right, ["UMINUS"])
        .rule("start", ["exp"], "start")
        .rule("exp", ["exp", "+", "exp"], "add")
        .rule("exp", ["exp", "-", "exp"], "sub")
        .rule("exp", ["exp", "*", "exp"], "mul")
        .rule_with_precedence_of("exp", ["-", "exp"], "neg", "UMINUS")
        .rule("exp", ["(", "exp", ")"], "group")
        .rule("exp", ["NUMBER"], "num")
}

#[test]
fn test_rules_inherit_precedence_from_operators() {
    let grammar = create_expression_builder()
        .build()
        .expect("Failed to build grammar");

    let levels: Vec<(u32, Associativity)> = grammar
        .rules()
        .map(|(_, rule)| (rule.precedence(), rule.associativity()))
        .collect();
    assert_eq!(
        levels,
        vec![
            (0, Associativity::Left),
            (1, Associativity::Left),
            (1, Associativity::Left),
            (2, Associativity::Left),
            (3, Associativity::Right),
            (0, Associativity::Left),
            (0, Associativity::Left),
        ]
    );
    assert_eq!(grammar.precedence().tiers(), 3);
}

#[test]
fn test_start_rule_is_first_rule() {
    let grammar = create_expression_builder()
        .build()
        .expect("Failed to build grammar");

    assert_eq!(grammar.start(), rule_id(&grammar, 0));
    assert!(grammar.rule_id(7).is_none());
    assert_eq!(grammar.describe_rule(grammar.start()), "start -> exp");
    assert_eq!(grammar.len(), 7);
    assert!(grammar.get_rule(7).is_none());
}

#[test]
fn test_empty_grammar_is_rejected() {
    let err = GrammarBuilder::new().build().unwrap_err();
    assert_eq!(err, GrammarError::EmptyGrammar);
}

#[test]
fn test_empty_rule_is_rejected() {
    let err = GrammarBuilder::new()
        .rule("start", ["exp"], "start")
        .rule("exp", Vec::<&str>::new(), "nothing")
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        GrammarError::EmptyRule {
            index: 1,
            lhs: "exp".into()
        }
    );
}

#[test]
fn test_duplicate_precedence_is_rejected() {
    let err = GrammarBuilder::new()
        .precedence(Associativity::Left, ["+"])
        .precedence(Associativity::Right, ["+"])
        .rule("start", ["NUMBER"], "start")
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        GrammarError::DuplicatePrecedence { symbol: "+".into() }
    );
    assert_eq!(err.to_string(), "Duplicate precedence setting: +");
}

#[test]
fn test_unknown_precedence_symbol_is_rejected() {
    let err = GrammarBuilder::new()
        .rule_with_precedence_of("exp", ["-", "exp"], "neg", "UMINUS")
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        GrammarError::UnknownPrecedenceSymbol {
            symbol: "UMINUS".into()
        }
    );
}

#[test]
fn test_derived_complex_points() {
    let grammar = create_expression_builder()
        .build()
        .expect("Failed to build grammar");
    let points = ComplexPoints::derive(&grammar);

    // only `start -> exp` completes `exp` from outside the `exp` rules
    assert_eq!(points.get("exp"), Some(&[(0, 0)][..]));
    assert_eq!(points.iter().count(), 1);

    let table = ComplexPointTable::for_grammar(&grammar);
    assert!(table.contains(grammar.start(), 0));
    assert!(!table.contains(rule_id(&grammar, 1), 0));
    assert!(table.is_registered(grammar.start()));
    assert!(!table.is_registered(rule_id(&grammar, 1)));
}

#[test]
fn test_grammar_without_ambiguity_has_no_complex_points() {
    let grammar = GrammarBuilder::new()
        .rule("list", ["list", "ITEM"], "push")
        .rule("list", ["ITEM"], "single")
        .build()
        .expect("Failed to build grammar");

    assert!(ComplexPoints::derive(&grammar).is_empty());
    assert!(ComplexPointTable::for_grammar(&grammar).is_empty());
}

#[test]
fn test_compile_validates_complex_points() {
    let grammar = create_expression_builder()
        .build()
        .expect("Failed to build grammar");

    let mut points = ComplexPoints::new();
    points.insert("exp", 0, 0);
    points.insert("exp", 0, 0);
    assert_eq!(points.get("exp").map(<[_]>::len), Some(1));
    let table = ComplexPointTable::compile(&grammar, &points).expect("valid points");
    assert!(table.contains(rule_id(&grammar, 0), 0));

    let mut unknown = ComplexPoints::new();
    unknown.insert("stmt", 0, 0);
    assert_eq!(
        ComplexPointTable::compile(&grammar, &unknown).unwrap_err(),
        GrammarError::UnknownSymbol {
            symbol: "stmt".into()
        }
    );

    let mut rule_out_of_range = ComplexPoints::new();
    rule_out_of_range.insert("exp", 42, 0);
    assert_eq!(
        ComplexPointTable::compile(&grammar, &rule_out_of_range).unwrap_err(),
        GrammarError::ComplexPointRuleOutOfRange { rule: 42, rules: 7 }
    );

    let mut position_out_of_range = ComplexPoints::new();
    position_out_of_range.insert("exp", 0, 1);
    assert_eq!(
        ComplexPointTable::compile(&grammar, &position_out_of_range).unwrap_err(),
        GrammarError::ComplexPointPositionOutOfRange {
            rule: 0,
            position: 1,
            len: 1
        }
    );

    // rule 1 is `exp -> exp + exp`, so position 1 holds `+`
    let mut misfiled = ComplexPoints::new();
    misfiled.insert("exp", 1, 1);
    let err = ComplexPointTable::compile(&grammar, &misfiled).unwrap_err();
    assert_eq!(
        err,
        GrammarError::ComplexPointSymbolMismatch {
            symbol: "exp".into(),
            rule: 1,
            position: 1,
            found: "+".into()
        }
    );
    assert_eq!(
        err.to_string(),
        "Complex point 1 of rule 1 is filed under exp, but the rule has + there"
    );
}

#[test]
fn test_definition_round_trips_through_builder() {
    let builder = create_expression_builder();
    let definition = builder.definition().clone();
    let rebuilt = GrammarBuilder::from_definition(definition.clone());

    assert_eq!(rebuilt.into_definition(), definition);
    assert_eq!(definition.rules.len(), 7);
    assert_eq!(
        definition.rules[4].precedence,
        RulePrecedence::Of("UMINUS".into())
    );
}

#[test]
fn test_explicit_rule_precedence() {
    let definition = GrammarDefinition {
        precedence: Vec::new(),
        rules: vec![
            RuleDefinition::new("start", ["exp"], "start"),
            RuleDefinition::new("exp", ["exp", "=", "exp"], "assign").with_precedence(
                RulePrecedence::Explicit {
                    level: 5,
                    associativity: Associativity::Right,
                },
            ),
            RuleDefinition::new("exp", ["ID"], "id"),
        ],
    };
    let grammar = definition.build().expect("Failed to build grammar");
    let assign = grammar.rule(rule_id(&grammar, 1));

    assert_eq!(assign.precedence(), 5);
    assert_eq!(assign.associativity(), Associativity::Right);

    let equals = grammar.symbol("=").expect("interned");
    assert_eq!(grammar.token_precedence(equals).level, 5);
}

#[cfg(feature = "serialize")]
mod serialize {
    use super::*;

    #[test]
    fn test_definition_from_json() {
        let json = r#"{
            "precedence": [
                { "associativity": "left", "symbols": ["+"] },
                { "associativity": "right", "symbols": ["UMINUS"] }
            ],
            "rules": [
                { "lhs": "start", "rhs": ["exp"], "action": "start" },
                { "lhs": "exp", "rhs": ["exp", "+", "exp"], "action": "add" },
                { "lhs": "exp", "rhs": ["-", "exp"], "action": "neg", "precedence": { "of": "UMINUS" } },
                { "lhs": "exp", "rhs": ["NUMBER"], "action": "num" }
            ]
        }"#;

        let definition: GrammarDefinition =
            serde_json::from_str(json).expect("Failed to deserialize grammar");
        let grammar = definition.build().expect("Failed to build grammar");

        assert_eq!(grammar.len(), 4);
        assert_eq!(grammar.rule(rule_id(&grammar, 2)).precedence(), 2);
        assert_eq!(grammar.rule(rule_id(&grammar, 2)).action().as_str(), "neg");
    }

    #[test]
    fn test_definition_serialization_round_trip() {
        let definition = create_expression_builder().into_definition();
        let json = serde_json::to_string(&definition).expect("Failed to serialize");
        let back: GrammarDefinition = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(back, definition);
    }

    #[test]
    fn test_complex_points_json_shape() {
        let grammar = create_expression_builder()
            .build()
            .expect("Failed to build grammar");
        let points = ComplexPoints::derive(&grammar);

        let json = serde_json::to_value(&points).expect("Failed to serialize");
        assert_eq!(json, serde_json::json!({ "exp": [[0, 0]] }));

        let back: ComplexPoints = serde_json::from_value(json).expect("Failed to deserialize");
        assert_eq!(back, points);
    }
}
