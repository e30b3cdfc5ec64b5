use std::collections::HashMap;

use super::ast::{Expr, JoinExpr, OrderExpr, SelectQuery};
use crate::errors::HogQLError;

/// Substitute every `{name}` node with the expression bound to `name`.
pub fn replace_placeholders(
    expr: Expr,
    values: &HashMap<String, Expr>,
) -> Result<Expr, HogQLError> {
    let replace = |e: Expr| replace_placeholders(e, values);
    let replace_box = |e: Box<Expr>| replace_placeholders(*e, values).map(Box::new);

    Ok(match expr {
        Expr::Placeholder(name) => match values.get(&name) {
            Some(value) => value.clone(),
            None => {
                return Err(HogQLError::validation(format!(
                    "Placeholder '{{{}}}' is not in the supplied values",
                    name
                )))
            }
        },
        Expr::Constant(_) | Expr::Field(_) => expr,
        Expr::BinaryOperation { op, left, right } => Expr::BinaryOperation {
            op,
            left: replace_box(left)?,
            right: replace_box(right)?,
        },
        Expr::UnaryOperation { op, operand } => Expr::UnaryOperation {
            op,
            operand: replace_box(operand)?,
        },
        Expr::Call { name, args } => Expr::Call {
            name,
            args: args.into_iter().map(replace).collect::<Result<_, _>>()?,
        },
        Expr::And(exprs) => Expr::And(exprs.into_iter().map(replace).collect::<Result<_, _>>()?),
        Expr::Or(exprs) => Expr::Or(exprs.into_iter().map(replace).collect::<Result<_, _>>()?),
        Expr::Alias { alias, expr } => Expr::Alias {
            alias,
            expr: replace_box(expr)?,
        },
        Expr::Select(query) => Expr::Select(Box::new(replace_in_select(*query, values)?)),
    })
}

fn replace_in_select(
    query: SelectQuery,
    values: &HashMap<String, Expr>,
) -> Result<SelectQuery, HogQLError> {
    let replace_all = |exprs: Vec<Expr>| {
        exprs
            .into_iter()
            .map(|e| replace_placeholders(e, values))
            .collect::<Result<Vec<_>, _>>()
    };
    let replace_opt = |e: Option<Box<Expr>>| {
        e.map(|e| replace_placeholders(*e, values).map(Box::new))
            .transpose()
    };

    Ok(SelectQuery {
        select: replace_all(query.select)?,
        select_from: query
            .select_from
            .map(|join| {
                replace_placeholders(*join.table, values).map(|table| JoinExpr {
                    table: Box::new(table),
                })
            })
            .transpose()?,
        where_expr: replace_opt(query.where_expr)?,
        group_by: query.group_by.map(replace_all).transpose()?,
        having: replace_opt(query.having)?,
        order_by: query
            .order_by
            .map(|order_by| {
                order_by
                    .into_iter()
                    .map(|o| {
                        replace_placeholders(o.expr, values).map(|e| OrderExpr::new(e, o.order))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?,
        limit: replace_opt(query.limit)?,
        offset: replace_opt(query.offset)?,
    })
}
