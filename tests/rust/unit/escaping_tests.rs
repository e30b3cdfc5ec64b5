//! Unit tests for the escaping layer's public contract

use hogql::clickhouse_query_generator::{
    escape_clickhouse_identifier, escape_hogql_identifier, escape_hogql_string, escape_literal,
    Dialect,
};
use hogql::hogql_parser::ast::ConstantValue;

/// Reverse of the backtick quoting, for checking that escaping loses nothing
fn unquote_identifier(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\u{7}'),
            Some('v') => out.push('\u{b}'),
            Some(other) => out.push(other),
            None => panic!("dangling escape in {}", quoted),
        }
    }
    out
}

#[test]
fn test_documented_examples() {
    assert_eq!(escape_clickhouse_identifier("back`tick"), "`back\\`tick`");
    assert_eq!(escape_hogql_string("single'quote"), "'single\\'quote'");
}

#[test]
fn test_safe_identifiers_are_unchanged() {
    for name in ["event", "_private", "$browser", "a1_$", "Timestamp"] {
        assert_eq!(escape_hogql_identifier(name), name);
    }
    for name in ["event", "_private", "Timestamp", "x9"] {
        assert_eq!(escape_clickhouse_identifier(name), name);
    }
}

#[test]
fn test_unsafe_identifiers_are_quoted_losslessly() {
    let names = [
        "123",
        "with space",
        "back`tick",
        "new\nline",
        "tab\tand\\slash",
        "bell\u{7}",
        "1abc",
        "",
    ];
    for name in names {
        let quoted = escape_hogql_identifier(name);
        assert!(quoted.starts_with('`') && quoted.ends_with('`'), "{:?}", quoted);
        assert_eq!(unquote_identifier(&quoted), name);
    }
    assert_eq!(escape_clickhouse_identifier("$browser"), "`$browser`");
}

#[test]
fn test_float_literals_round_trip() {
    let values = [
        0.0,
        1.0,
        -2.5,
        123.0,
        0.1,
        1e-18,
        0.0001,
        0.00001,
        1e15,
        1e16,
        2.3473248237492837e20,
        std::f64::consts::PI,
        -1.7976931348623157e308,
    ];
    for value in values {
        let printed =
            escape_literal(&ConstantValue::Float(value), Dialect::ClickHouse, None).unwrap();
        assert!(
            printed.contains('.') || printed.contains('e'),
            "{} printed as {}",
            value,
            printed
        );
        assert_eq!(printed.parse::<f64>().unwrap(), value, "{}", printed);
    }
}

#[test]
fn test_float_formatting_matches_repr() {
    let cases = [
        (123.0, "123.0"),
        (1e-18, "1e-18"),
        (2.3473248237492837e20, "2.3473248237492837e+20"),
        (0.0001, "0.0001"),
        (0.00001, "1e-05"),
        (1e16, "1e+16"),
        (f64::NAN, "NaN"),
        (f64::INFINITY, "Inf"),
        (f64::NEG_INFINITY, "-Inf"),
    ];
    for (value, expected) in cases {
        assert_eq!(
            escape_literal(&ConstantValue::Float(value), Dialect::HogQL, None).unwrap(),
            expected
        );
    }
}
