//! Parser for the HogQL expression language.
//!
//! HogQL expressions look like Python expressions restricted to literals, field
//! chains, arithmetic, comparisons, boolean logic and flat function calls. Anything
//! outside that subset is rejected here, at the grammar level.

use std::collections::HashMap;

use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::satisfy;
use nom::combinator::{map, not, opt, peek};
use nom::sequence::terminated;
use nom::Parser;

use ast::{Expr, OrderDirection, OrderExpr};
use common::{is_identifier_char, ws, PResult};
use errors::HogQLParsingError;

use crate::errors::HogQLError;

pub mod ast;
mod common;
pub(crate) mod errors;
mod expression;
mod placeholders;

pub use placeholders::replace_placeholders;

/// Parse a single HogQL expression such as `properties.$browser = 'Chrome'`.
pub fn parse_expr(input: &str) -> Result<Expr, HogQLError> {
    parse_complete(input, expression::parse_expression)
}

/// Parse a template and substitute its `{name}` placeholders.
///
/// Values are bound as AST nodes, so nothing supplied here is ever spliced into the
/// source text.
pub fn parse_expr_with_placeholders(
    template: &str,
    values: &HashMap<String, Expr>,
) -> Result<Expr, HogQLError> {
    let expr = parse_expr(template)?;
    replace_placeholders(expr, values)
}

/// Parse a projection column, which may carry an `as <alias>` suffix.
pub fn parse_select_column(input: &str) -> Result<Expr, HogQLError> {
    parse_complete(input, expression::parse_aliased_expression)
}

/// Parse an ORDER BY item: an expression optionally followed by `ASC` or `DESC`.
pub fn parse_order_expr(input: &str) -> Result<OrderExpr, HogQLError> {
    parse_complete(input, parse_order_expression)
}

fn parse_order_expression(input: &str) -> PResult<'_, OrderExpr> {
    let (input, expr) = expression::parse_expression(input)?;
    let (input, direction) = opt(ws(alt((
        map(direction_keyword("DESC"), |_| OrderDirection::Desc),
        map(direction_keyword("ASC"), |_| OrderDirection::Asc),
    ))))
    .parse(input)?;
    Ok((
        input,
        OrderExpr::new(expr, direction.unwrap_or(OrderDirection::Asc)),
    ))
}

fn direction_keyword<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = HogQLParsingError<'a>> {
    terminated(tag_no_case(kw), not(peek(satisfy(is_identifier_char))))
}

/// Run `parser` over the whole input, rejecting statement separators and leftovers.
fn parse_complete<'a, T>(
    input: &'a str,
    mut parser: impl FnMut(&'a str) -> PResult<'a, T>,
) -> Result<T, HogQLError> {
    match parser(input) {
        Ok((rest, value)) => {
            let rest = rest.trim();
            if rest.starts_with(';') {
                return Err(HogQLError::Syntax(
                    "Multiple statements are not supported".to_string(),
                ));
            }
            if !rest.is_empty() {
                return Err(HogQLError::Syntax(
                    HogQLParsingError::new(rest, "Unexpected trailing input").message(),
                ));
            }
            Ok(value)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            log::debug!("failed to parse HogQL expression {:?}: {}", input, e);
            Err(HogQLError::Syntax(e.message()))
        }
        Err(nom::Err::Incomplete(_)) => {
            Err(HogQLError::Syntax("Unexpected end of input".to_string()))
        }
    }
}
