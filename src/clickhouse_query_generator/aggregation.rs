use super::function_registry::is_aggregation;
use crate::hogql_parser::ast::Expr;

/// True if `expr` is, or contains, a call to a registered aggregation.
///
/// Subqueries are opaque: an aggregation inside a nested SELECT does not make the
/// enclosing expression an aggregate.
pub fn contains_aggregation(expr: &Expr) -> bool {
    match expr {
        Expr::Call { name, args } => is_aggregation(name) || args.iter().any(contains_aggregation),
        Expr::BinaryOperation { left, right, .. } => {
            contains_aggregation(left) || contains_aggregation(right)
        }
        Expr::UnaryOperation { operand, .. } => contains_aggregation(operand),
        Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().any(contains_aggregation),
        Expr::Alias { expr, .. } => contains_aggregation(expr),
        Expr::Constant(_) | Expr::Field(_) | Expr::Placeholder(_) | Expr::Select(_) => false,
    }
}
