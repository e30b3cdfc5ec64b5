use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClickhouseQueryGeneratorError {
    #[error("Unknown event field '{0}'")]
    UnknownEventField(String),
    #[error("Unknown person field '{0}'")]
    UnknownPersonField(String),
    #[error("Unsupported property access: [{}]", .0.join(", "))]
    UnsupportedPropertyAccess(Vec<String>),
    #[error("Unsupported function call '{0}(...)'")]
    UnsupportedFunction(String),
    #[error("Function '{function}' expects {expected} argument(s), found {found}")]
    InvalidArgumentCount {
        function: String,
        expected: String,
        found: usize,
    },
    #[error("Aggregation '{inner}' cannot be nested inside aggregation '{outer}'")]
    NestedAggregation { outer: String, inner: String },
    #[error("Unsupported constant type: {0}")]
    UnsupportedLiteral(String),
    #[error("Placeholder '{{{0}}}' was not replaced before printing")]
    UnresolvedPlaceholder(String),
    #[error("Cannot alias an expression to the reserved keyword '{0}'")]
    ReservedAlias(String),
    #[error("Only selecting from the 'events' table is supported, found {0}")]
    UnsupportedTable(String),
    #[error("Aggregation found in WHERE clause: {0}")]
    AggregationInWhere(String),
    #[error("SELECT query has no columns")]
    EmptySelect,
    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),
}
