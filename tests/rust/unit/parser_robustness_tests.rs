//! Unit tests for HogQL parsing edge cases and error handling
//!
//! Tests malformed expressions and unsupported constructs to ensure they are
//! rejected with a syntax error rather than a panic or a silent fallback.

#[cfg(test)]
mod parser_robustness_tests {
    use hogql::clickhouse_query_generator::{print_expr, DefaultPropertyResolver, PrintContext};
    use hogql::{parse_expr, parse_order_expr, HogQLError};

    /// Malformed expressions never panic and always yield a syntax error
    #[test]
    fn test_malformed_expressions_are_syntax_errors() {
        let malformed = vec![
            "",                   // Empty expression
            "(",                  // Unclosed parenthesis
            ")",                  // Stray parenthesis
            "1 +",                // Dangling operator
            "avg(",               // Unclosed call
            "avg(1,",             // Trailing comma without argument
            "[1, 2",              // Unclosed list
            "'unterminated",      // Unclosed string
            "properties[",        // Unclosed subscript
            "properties[1]",      // Non-string subscript
            "event event",        // Two expressions
            "1 < 2 < 3",          // Chained comparison
            "event; drop",        // Multiple statements
            "avg(x=1)",           // Keyword argument
            "lambda x: x",        // Lambda
            "[x for x in y]",     // Comprehension
            "avg(*args)",         // Star argument
            "event.lower()",      // Call on an attribute
        ];

        for input in malformed {
            match parse_expr(input) {
                Err(HogQLError::Syntax(message)) => {
                    assert!(!message.is_empty(), "empty message for {:?}", input)
                }
                other => panic!("expected a syntax error for {:?}, got {:?}", input, other),
            }
        }
    }

    /// Supported expressions parse and print without errors
    #[test]
    fn test_supported_expressions_round_trip_to_sql() {
        let resolver = DefaultPropertyResolver::new();
        let ctx = PrintContext::new(1, &resolver);
        let cases = vec![
            ("1 + 2 * 3", "plus(1, multiply(2, 3))"),
            ("-(1 + 2)", "-plus(1, 2)"),
            ("person.properties['$os'] = 'Mac'", "(replaceRegexpAll(JSONExtractRaw(person_properties, '$os'), '^\"|\"$', '') = 'Mac')"),
            ("event in ('a', 'b')", "(event IN ('a', 'b'))"),
            ("event not in ['a']", "(event NOT IN ['a'])"),
            ("coalesce(person_properties, '{}')", "coalesce(person_properties, '{}')"),
            ("True and not False", "and(true, not(false))"),
            ("None", "NULL"),
            ("1.5e-18", "1.5e-18"),
            ("event ilike '%sign%'", "(event ILIKE '%sign%')"),
        ];

        for (input, expected) in cases {
            let expr = parse_expr(input).unwrap_or_else(|e| panic!("{:?} failed: {}", input, e));
            assert_eq!(print_expr(&expr, &ctx).unwrap(), expected, "Failed for input: {}", input);
        }
    }

    /// Parsing succeeds but printing rejects names outside the allow-lists
    #[test]
    fn test_validation_happens_at_print_time() {
        let resolver = DefaultPropertyResolver::new();
        let ctx = PrintContext::new(1, &resolver);

        let err = print_expr(&parse_expr("system_shutdown()").unwrap(), &ctx).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported function call 'system_shutdown(...)'");

        let err = print_expr(&parse_expr("toString(1, 2, 3)").unwrap(), &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Function 'toString' expects exactly 1 argument(s), found 3"
        );

        let err: HogQLError = print_expr(&parse_expr("person.email").unwrap(), &ctx)
            .unwrap_err()
            .into();
        assert!(matches!(err, HogQLError::Validation(ref m) if m.contains("email")));
    }

    #[test]
    fn test_order_expressions() {
        assert!(parse_order_expr("timestamp DESC").is_ok());
        assert!(parse_order_expr("count() desc").is_ok());
        assert!(parse_order_expr("timestamp DESC ASC").is_err());
    }
}
