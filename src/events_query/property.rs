//! Structured property filters and actions as HogQL expressions.

use serde_json::Value;

use super::models::{
    Action, ActionStep, PropertyFilter, PropertyFilterType, PropertyOperator, UrlMatching,
};
use crate::clickhouse_query_generator::ClickhouseQueryGeneratorError;
use crate::errors::HogQLError;
use crate::hogql_parser::ast::{BinaryOperator, ConstantValue, Expr};
use crate::hogql_parser::parse_expr;

const CURRENT_URL: &str = "$current_url";

/// Convert one property filter to an expression.
///
/// A list value means "any of" for positive operators and "none of" for
/// `is_not`, `not_icontains` and `not_regex`. An empty list matches everything.
pub fn property_to_expr(filter: &PropertyFilter) -> Result<Expr, HogQLError> {
    let chain: Vec<String> = match filter.filter_type {
        PropertyFilterType::Hogql => return parse_expr(&filter.key),
        PropertyFilterType::Event => vec!["properties".to_string(), filter.key.clone()],
        PropertyFilterType::Person => vec![
            "person".to_string(),
            "properties".to_string(),
            filter.key.clone(),
        ],
    };
    let operator = filter.operator.unwrap_or_default();
    let value = filter.value.as_ref().unwrap_or(&Value::Null);
    match value {
        Value::Array(items) => match items.as_slice() {
            [] => Ok(Expr::constant(true)),
            [single] => value_filter_to_expr(&chain, operator, single),
            _ => {
                let exprs = items
                    .iter()
                    .map(|item| value_filter_to_expr(&chain, operator, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if operator.is_negative() {
                    Expr::And(exprs)
                } else {
                    Expr::Or(exprs)
                })
            }
        },
        _ => value_filter_to_expr(&chain, operator, value),
    }
}

fn value_filter_to_expr(
    chain: &[String],
    operator: PropertyOperator,
    value: &Value,
) -> Result<Expr, HogQLError> {
    let field = Expr::Field(chain.to_vec());
    let expr = match operator {
        PropertyOperator::IsSet => {
            Expr::binary(BinaryOperator::NotEq, field, Expr::Constant(ConstantValue::Null))
        }
        PropertyOperator::IsNotSet => {
            Expr::binary(BinaryOperator::Eq, field, Expr::Constant(ConstantValue::Null))
        }
        PropertyOperator::Icontains => contains_expr(field, value),
        PropertyOperator::NotIcontains => Expr::not(contains_expr(field, value)),
        PropertyOperator::Regex => Expr::call("match", vec![field, json_to_expr(value)?]),
        PropertyOperator::NotRegex => {
            Expr::not(Expr::call("match", vec![field, json_to_expr(value)?]))
        }
        PropertyOperator::Exact => Expr::binary(BinaryOperator::Eq, field, json_to_expr(value)?),
        PropertyOperator::IsNot => {
            Expr::binary(BinaryOperator::NotEq, field, json_to_expr(value)?)
        }
        PropertyOperator::Gt => Expr::binary(BinaryOperator::Gt, field, json_to_expr(value)?),
        PropertyOperator::Gte => Expr::binary(BinaryOperator::GtE, field, json_to_expr(value)?),
        PropertyOperator::Lt => Expr::binary(BinaryOperator::Lt, field, json_to_expr(value)?),
        PropertyOperator::Lte => Expr::binary(BinaryOperator::LtE, field, json_to_expr(value)?),
    };
    Ok(expr)
}

fn contains_expr(field: Expr, value: &Value) -> Expr {
    let needle = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Expr::binary(
        BinaryOperator::ILike,
        field,
        Expr::constant(format!("%{}%", needle)),
    )
}

fn json_to_expr(value: &Value) -> Result<Expr, HogQLError> {
    Ok(Expr::Constant(json_to_constant(value)?))
}

/// JSON scalars and arrays map onto constants; objects have no HogQL literal.
pub fn json_to_constant(value: &Value) -> Result<ConstantValue, HogQLError> {
    match value {
        Value::Null => Ok(ConstantValue::Null),
        Value::Bool(b) => Ok(ConstantValue::Boolean(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(ConstantValue::Integer(i)),
            None => n.as_f64().map(ConstantValue::Float).ok_or_else(|| {
                ClickhouseQueryGeneratorError::UnsupportedLiteral(n.to_string()).into()
            }),
        },
        Value::String(s) => Ok(ConstantValue::String(s.clone())),
        Value::Array(items) => Ok(ConstantValue::List(
            items.iter().map(json_to_constant).collect::<Result<_, _>>()?,
        )),
        Value::Object(_) => {
            Err(ClickhouseQueryGeneratorError::UnsupportedLiteral(value.to_string()).into())
        }
    }
}

/// Any-of over the action's steps; each step is an all-of over its conditions.
pub fn action_to_expr(action: &Action) -> Result<Expr, HogQLError> {
    if action.steps.is_empty() {
        return Err(HogQLError::validation("Action does not have any match groups"));
    }
    let mut steps = action
        .steps
        .iter()
        .map(step_to_expr)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if steps.len() == 1 {
        steps.remove(0)
    } else {
        Expr::Or(steps)
    })
}

fn step_to_expr(step: &ActionStep) -> Result<Expr, HogQLError> {
    for (attribute, value) in [
        ("selector", &step.selector),
        ("tag_name", &step.tag_name),
        ("href", &step.href),
        ("text", &step.text),
    ] {
        if value.is_some() {
            return Err(HogQLError::validation(format!(
                "Action step matching on '{}' is not supported",
                attribute
            )));
        }
    }

    let mut exprs = Vec::new();
    if let Some(event) = &step.event {
        exprs.push(Expr::binary(
            BinaryOperator::Eq,
            Expr::field(&["event"]),
            Expr::constant(event.as_str()),
        ));
    }
    if let Some(url) = &step.url {
        let current_url = Expr::field(&["properties", CURRENT_URL]);
        exprs.push(match step.url_matching.unwrap_or_default() {
            UrlMatching::Exact => {
                Expr::binary(BinaryOperator::Eq, current_url, Expr::constant(url.as_str()))
            }
            UrlMatching::Regex => {
                Expr::call("match", vec![current_url, Expr::constant(url.as_str())])
            }
            UrlMatching::Contains => Expr::binary(
                BinaryOperator::Like,
                current_url,
                Expr::constant(format!("%{}%", url)),
            ),
        });
    }
    for filter in &step.properties {
        exprs.push(property_to_expr(filter)?);
    }

    Ok(match exprs.len() {
        0 => Expr::constant(true),
        1 => exprs.remove(0),
        _ => Expr::And(exprs),
    })
}
