//! Tests for the query parser.

use super::*;
use crate::QueryError;

fn ident(name: &str) -> Expr {
    Expr::ident(name)
}

fn num(n: f64) -> Expr {
    Expr::number(n)
}

fn syntax_position(input: &str) -> usize {
    match QueryParser::parse(input) {
        Err(QueryError::Syntax { position, .. }) => position,
        other => panic!("expected syntax error for {input:?}, got {other:?}"),
    }
}

// ==================== Primary Tests ====================

#[test]
fn test_parse_identifier() {
    assert_eq!(QueryParser::parse("unique").unwrap(), ident("unique"));
}

#[test]
fn test_parse_back_identifier() {
    assert_eq!(QueryParser::parse("back:name").unwrap(), ident("back:name"));
}

#[test]
fn test_parse_literals() {
    assert_eq!(QueryParser::parse("3").unwrap(), num(3.0));
    assert_eq!(QueryParser::parse("true").unwrap(), Expr::boolean(true));
    assert_eq!(
        QueryParser::parse("\"Roland Banks\"").unwrap(),
        Expr::string("Roland Banks")
    );
}

#[test]
fn test_parse_negative_number() {
    let expr = QueryParser::parse("cost > -1").unwrap();
    assert_eq!(expr, Expr::binary(BinaryOp::Gt, ident("cost"), num(-1.0)));
}

#[test]
fn test_parse_with_whitespace() {
    assert_eq!(
        QueryParser::parse("  xp   ==\t3\n").unwrap(),
        Expr::binary(BinaryOp::StrictEq, ident("xp"), num(3.0))
    );
}

// ==================== Comparison Tests ====================

#[test]
fn test_parse_every_comparison_operator() {
    let cases = [
        ("==", BinaryOp::StrictEq),
        ("!==", BinaryOp::StrictNotEq),
        ("=", BinaryOp::LooseEq),
        ("!=", BinaryOp::LooseNotEq),
        (">", BinaryOp::Gt),
        ("<", BinaryOp::Lt),
        (">=", BinaryOp::Gte),
        ("<=", BinaryOp::Lte),
    ];

    for (symbol, op) in cases {
        let expr = QueryParser::parse(&format!("xp {symbol} 2")).unwrap();
        assert_eq!(expr, Expr::binary(op, ident("xp"), num(2.0)), "{symbol}");
    }
}

#[test]
fn test_parse_chained_comparison_is_error() {
    let err = QueryParser::parse("xp == 1 == 2").unwrap_err();
    assert!(matches!(err, QueryError::Syntax { position: 8, .. }), "{err}");
}

#[test]
fn test_parse_literal_on_left() {
    let expr = QueryParser::parse("\"01001\" = investigator_access").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::LooseEq,
            Expr::string("01001"),
            ident("investigator_access")
        )
    );
}

// ==================== Containment Tests ====================

#[test]
fn test_parse_containment_list() {
    let expr = QueryParser::parse("xp ?? [1, 3, 5]").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::StrictIn,
            ident("xp"),
            Expr::list(vec![num(1.0), num(3.0), num(5.0)])
        )
    );
}

#[test]
fn test_parse_containment_operators() {
    for (symbol, op) in [
        ("??", BinaryOp::StrictIn),
        ("!??", BinaryOp::StrictNotIn),
        ("?", BinaryOp::LooseIn),
        ("!?", BinaryOp::LooseNotIn),
    ] {
        let expr = QueryParser::parse(&format!("trait {symbol} [\"spell\"]")).unwrap();
        assert!(matches!(expr, Expr::Binary { op: parsed, .. } if parsed == op));
    }
}

#[test]
fn test_parse_empty_list() {
    let expr = QueryParser::parse("xp ?? []").unwrap();
    assert_eq!(
        expr,
        Expr::binary(BinaryOp::StrictIn, ident("xp"), Expr::list(vec![]))
    );
}

#[test]
fn test_parse_list_of_regexes() {
    let expr = QueryParser::parse("name ? [/^the/, /^a/]").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::LooseIn,
            ident("name"),
            Expr::list(vec![Expr::regex("^the"), Expr::regex("^a")])
        )
    );
}

#[test]
fn test_parse_containment_requires_list() {
    assert_eq!(syntax_position("xp ?? 3"), 6);
}

#[test]
fn test_parse_list_outside_containment_is_error() {
    assert_eq!(syntax_position("xp == [1, 2]"), 6);
    assert_eq!(syntax_position("[1, 2]"), 0);
}

#[test]
fn test_parse_unclosed_list() {
    assert_eq!(syntax_position("xp ?? [1, 2"), 6);
    assert_eq!(syntax_position("xp ?? [1 2]"), 9);
}

// ==================== Precedence Tests ====================

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = QueryParser::parse("xp > 0 | cost < 3 & unique").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::Or,
            Expr::binary(BinaryOp::Gt, ident("xp"), num(0.0)),
            Expr::binary(
                BinaryOp::And,
                Expr::binary(BinaryOp::Lt, ident("cost"), num(3.0)),
                ident("unique")
            )
        )
    );
}

#[test]
fn test_and_splits_comparisons() {
    let expr = QueryParser::parse("xp > 0 & cost < 3").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Gt, ident("xp"), num(0.0)),
            Expr::binary(BinaryOp::Lt, ident("cost"), num(3.0))
        )
    );
}

#[test]
fn test_logical_operators_are_left_associative() {
    let expr = QueryParser::parse("a | b | c").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::Or,
            Expr::binary(BinaryOp::Or, ident("a"), ident("b")),
            ident("c")
        )
    );
}

#[test]
fn test_arithmetic_precedence() {
    let expr = QueryParser::parse("health + sanity * 2 > 10").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::Gt,
            Expr::binary(
                BinaryOp::Add,
                ident("health"),
                Expr::binary(BinaryOp::Mul, ident("sanity"), num(2.0))
            ),
            num(10.0)
        )
    );
}

#[test]
fn test_subtraction_is_left_associative() {
    let expr = QueryParser::parse("health - sanity - 1 > 0").unwrap();
    let Expr::Binary { left, .. } = expr else {
        panic!("expected binary");
    };
    assert_eq!(
        *left,
        Expr::binary(
            BinaryOp::Sub,
            Expr::binary(BinaryOp::Sub, ident("health"), ident("sanity")),
            num(1.0)
        )
    );
}

#[test]
fn test_group_overrides_precedence() {
    let expr = QueryParser::parse("(xp == 0 | xp == 2) & cost < 3").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::And,
            Expr::group(Expr::binary(
                BinaryOp::Or,
                Expr::binary(BinaryOp::StrictEq, ident("xp"), num(0.0)),
                Expr::binary(BinaryOp::StrictEq, ident("xp"), num(2.0))
            )),
            Expr::binary(BinaryOp::Lt, ident("cost"), num(3.0))
        )
    );
}

#[test]
fn test_group_in_arithmetic() {
    let expr = QueryParser::parse("(cost + 1) * 2 <= 6").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinaryOp::Lte,
            Expr::binary(
                BinaryOp::Mul,
                Expr::group(Expr::binary(BinaryOp::Add, ident("cost"), num(1.0))),
                num(2.0)
            ),
            num(6.0)
        )
    );
}

// ==================== Regex Placement Tests ====================

#[test]
fn test_parse_regex_operand() {
    let expr = QueryParser::parse("name = /^test/").unwrap();
    assert_eq!(
        expr,
        Expr::binary(BinaryOp::LooseEq, ident("name"), Expr::regex("^test"))
    );
}

#[test]
fn test_regex_as_boolean_is_error() {
    assert_eq!(syntax_position("/test/"), 0);
    assert_eq!(syntax_position("xp > 1 & /test/"), 9);
}

#[test]
fn test_regex_in_ordering_is_error() {
    assert_eq!(syntax_position("xp > /1/"), 5);
}

#[test]
fn test_regex_in_arithmetic_is_error() {
    assert_eq!(syntax_position("cost + /1/ > 2"), 7);
}

// ==================== Error Tests ====================

#[test]
fn test_parse_empty() {
    assert!(matches!(
        QueryParser::parse(""),
        Err(QueryError::Syntax { position: 0, .. })
    ));
    assert!(matches!(
        QueryParser::parse("   "),
        Err(QueryError::Syntax { .. })
    ));
}

#[test]
fn test_parse_unclosed_paren() {
    assert_eq!(syntax_position("(xp == 1"), 0);
}

#[test]
fn test_parse_unexpected_close_paren() {
    assert_eq!(syntax_position("xp == 1)"), 7);
}

#[test]
fn test_parse_trailing_operator() {
    assert_eq!(syntax_position("xp == 1 &"), 9);
}

#[test]
fn test_parse_leading_operator() {
    assert_eq!(syntax_position("& xp"), 0);
}

#[test]
fn test_parse_unknown_character() {
    let err = QueryParser::parse("xp == 1 # 2").unwrap_err();
    assert_eq!(
        err,
        QueryError::Syntax {
            message: "unexpected character '#'".to_string(),
            position: 8,
        }
    );
}

#[test]
fn test_parse_lone_minus_is_error() {
    assert_eq!(syntax_position("cost > -x"), 7);
}

#[test]
fn test_parse_adjacent_operands_is_error() {
    assert_eq!(syntax_position("xp 3"), 3);
}

#[test]
fn test_parse_deeply_nested_groups_is_error() {
    let nested = |depth: usize| format!("{}xp == 1{}", "(".repeat(depth), ")".repeat(depth));

    assert!(QueryParser::parse(&nested(100)).is_ok());
    assert_eq!(syntax_position(&nested(5000)), MAX_NESTING_DEPTH);
}

#[test]
fn test_parse_overlong_operator_chain_is_error() {
    let chain = |terms: usize| vec!["xp == 1"; terms].join(" & ");

    assert!(QueryParser::parse(&chain(100)).is_ok());
    assert!(matches!(
        QueryParser::parse(&chain(1000)),
        Err(QueryError::Syntax { .. })
    ));

    let sum = format!("{} > 0", vec!["cost"; 1000].join(" + "));
    assert!(matches!(QueryParser::parse(&sum), Err(QueryError::Syntax { .. })));
}

#[test]
fn test_parse_long_run_of_unknown_characters_is_error() {
    assert_eq!(syntax_position(&"#".repeat(200_000)), 0);
}
