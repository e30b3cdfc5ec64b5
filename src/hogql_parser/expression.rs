use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::{cut, map, not, opt, peek},
    error::context,
    multi::many0,
    sequence::{preceded, terminated},
    Parser,
};

use super::ast::{BinaryOperator, ConstantValue, Expr, UnaryOperator};
use super::common::{
    fail, keyword, parse_identifier, parse_keyword_callee, parse_keyword_literal,
    parse_number_literal, parse_placeholder_name, parse_string_literal, sym, ws, PResult,
};
use super::errors::HogQLParsingError;

pub fn parse_expression(input: &str) -> PResult<'_, Expr> {
    parse_logical_or(input)
}

/// Projection-level expression: an expression optionally followed by `as <alias>`.
pub fn parse_aliased_expression(input: &str) -> PResult<'_, Expr> {
    let (input, expr) = parse_expression(input)?;
    let (input, alias) = opt(preceded(ws(keyword("as")), ws(parse_identifier))).parse(input)?;
    match alias {
        Some(alias) => Ok((
            input,
            Expr::Alias {
                alias,
                expr: Box::new(expr),
            },
        )),
        None => Ok((input, expr)),
    }
}

fn parse_logical_or(input: &str) -> PResult<'_, Expr> {
    let (input, first) = parse_logical_and(input)?;
    let (input, rest) =
        many0(preceded(ws(keyword("or")), parse_logical_and)).parse(input)?;
    if rest.is_empty() {
        return Ok((input, first));
    }
    let mut exprs = vec![first];
    exprs.extend(rest);
    Ok((input, Expr::Or(exprs)))
}

fn parse_logical_and(input: &str) -> PResult<'_, Expr> {
    let (input, first) = parse_not_expression(input)?;
    let (input, rest) =
        many0(preceded(ws(keyword("and")), parse_not_expression)).parse(input)?;
    if rest.is_empty() {
        return Ok((input, first));
    }
    let mut exprs = vec![first];
    exprs.extend(rest);
    Ok((input, Expr::And(exprs)))
}

// NOT binds looser than comparison: "not a = b" is "not (a = b)"
fn parse_not_expression(input: &str) -> PResult<'_, Expr> {
    alt((
        map(preceded(ws(keyword("not")), parse_not_expression), Expr::not),
        parse_comparison_expression,
    ))
    .parse(input)
}

fn parse_comparison_operator(input: &str) -> PResult<'_, BinaryOperator> {
    ws(alt((
        map(tag("=="), |_| BinaryOperator::Eq),
        map(tag("!="), |_| BinaryOperator::NotEq),
        map(tag("<>"), |_| BinaryOperator::NotEq),
        map(tag("<="), |_| BinaryOperator::LtE),
        map(tag(">="), |_| BinaryOperator::GtE),
        map(tag("<"), |_| BinaryOperator::Lt),
        map(tag(">"), |_| BinaryOperator::Gt),
        map(terminated(tag("="), not(peek(char('>')))), |_| BinaryOperator::Eq),
        map((keyword("not"), multispace0, keyword("in")), |_| {
            BinaryOperator::NotIn
        }),
        map(keyword("in"), |_| BinaryOperator::In),
        map(keyword("ilike"), |_| BinaryOperator::ILike),
        map(keyword("like"), |_| BinaryOperator::Like),
    )))
    .parse(input)
}

fn parse_comparison_expression(input: &str) -> PResult<'_, Expr> {
    let (input, lhs) = parse_additive_expression(input)?;
    let (input, op) = match parse_comparison_operator(input) {
        Ok(found) => found,
        Err(nom::Err::Error(_)) => return Ok((input, lhs)),
        Err(e) => return Err(e),
    };
    let (input, rhs) = parse_additive_expression(input)?;
    if parse_comparison_operator(input).is_ok() {
        return fail(input, "Chained comparisons are not supported");
    }
    Ok((input, Expr::binary(op, lhs, rhs)))
}

fn parse_additive_expression(input: &str) -> PResult<'_, Expr> {
    let (mut remaining_input, mut final_expression) = parse_multiplicative_expression(input)?;
    loop {
        let op_result = ws(alt((
            map(char('+'), |_| BinaryOperator::Add),
            map(terminated(char('-'), not(peek(char('>')))), |_| BinaryOperator::Sub),
        )))
        .parse(remaining_input);

        match op_result {
            Ok((new_input, op)) => {
                let (new_input, rhs) = parse_multiplicative_expression(new_input)?;
                final_expression = Expr::binary(op, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_multiplicative_expression(input: &str) -> PResult<'_, Expr> {
    let (mut remaining_input, mut final_expression) = parse_unary_expression(input)?;
    loop {
        let op_result = ws(alt((
            map(terminated(char('*'), not(peek(char('*')))), |_| BinaryOperator::Mult),
            map(terminated(char('/'), not(peek(char('/')))), |_| BinaryOperator::Div),
            map(char('%'), |_| BinaryOperator::Mod),
        )))
        .parse(remaining_input);

        match op_result {
            Ok((new_input, op)) => {
                let (new_input, rhs) = parse_unary_expression(new_input)?;
                final_expression = Expr::binary(op, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_unary_expression(input: &str) -> PResult<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), parse_unary_expression), |operand| {
            Expr::UnaryOperation {
                op: UnaryOperator::Neg,
                operand: Box::new(operand),
            }
        }),
        preceded(ws(char('+')), parse_unary_expression),
        parse_postfix_expression,
    ))
    .parse(input)
}

/// A primary expression followed by any number of `.attr`, `['key']` or `(args)` trailers.
fn parse_postfix_expression(input: &str) -> PResult<'_, Expr> {
    let (mut input, mut expr) = ws(parse_primary).parse(input)?;
    loop {
        if input.starts_with("->") {
            return fail(input, "Lambdas are not supported");
        }
        if let Ok((rest, _)) = char::<_, HogQLParsingError>('.').parse(input) {
            let (rest, attr) = context(
                "Expected attribute name after '.'",
                cut(preceded(multispace0, parse_identifier)),
            )
            .parse(rest)?;
            expr = extend_chain(input, expr, attr)?;
            input = rest;
        } else if let Ok((rest, _)) = sym('[').parse(input) {
            let (rest, key) = cut(terminated(parse_expression, sym(']'))).parse(rest)?;
            let key = match key {
                Expr::Constant(ConstantValue::String(key)) => key,
                _ => return fail(input, "Only string property access is currently supported"),
            };
            expr = extend_chain(input, expr, key)?;
            input = rest;
        } else if input.starts_with('(') {
            let name = match &expr {
                Expr::Field(chain) if chain.len() == 1 => chain[0].clone(),
                _ => {
                    return fail(
                        input,
                        "Can only call simple functions like 'avg(properties.bla)' or 'total()'",
                    )
                }
            };
            let (rest, args) = parse_call_arguments(input)?;
            expr = Expr::Call { name, args };
            input = rest;
        } else {
            break;
        }
        let (rest, _) = multispace0::<_, HogQLParsingError>.parse(input)?;
        if !(rest.starts_with('.') || rest.starts_with('[') || rest.starts_with('(')) {
            break;
        }
        input = rest;
    }
    Ok((input, expr))
}

fn extend_chain<'a>(
    input: &'a str,
    expr: Expr,
    segment: String,
) -> Result<Expr, nom::Err<HogQLParsingError<'a>>> {
    match expr {
        Expr::Field(mut chain) => {
            chain.push(segment);
            Ok(Expr::Field(chain))
        }
        _ => Err(nom::Err::Failure(HogQLParsingError::new(
            input,
            "Property access is only supported on fields",
        ))),
    }
}

fn parse_call_arguments(input: &str) -> PResult<'_, Vec<Expr>> {
    let (input, _) = sym('(').parse(input)?;
    if let Ok((rest, _)) = sym(')').parse(input) {
        return Ok((rest, vec![]));
    }
    let mut args = vec![];
    let mut input = input;
    loop {
        if is_keyword_argument(input) {
            return fail(input, "Keyword arguments are not supported");
        }
        if input.trim_start().starts_with('*') {
            return fail(input, "Star arguments are not supported");
        }
        let (rest, arg) = parse_expression(input)?;
        if ws(keyword("for")).parse(rest).is_ok() {
            return fail(rest, "Comprehensions are not supported");
        }
        args.push(arg);
        if let Ok((rest, _)) = sym(',').parse(rest) {
            input = rest;
            continue;
        }
        let (rest, _) =
            context("Expected ',' or ')' in call arguments", cut(sym(')'))).parse(rest)?;
        return Ok((rest, args));
    }
}

// `name=value` with nothing between the name and `=`; `event = 'x'` stays a comparison
fn is_keyword_argument(input: &str) -> bool {
    (
        preceded(multispace0, parse_identifier),
        char::<_, HogQLParsingError>('='),
        not(peek(char('='))),
    )
        .parse(input)
        .is_ok()
}

/// Comma-separated items up to `close`. Returns the items and whether a trailing comma was seen.
fn parse_collection_items(input: &str, close: char) -> PResult<'_, (Vec<Expr>, bool)> {
    let mut items = vec![];
    let mut trailing_comma = false;
    let mut input = input;
    loop {
        if let Ok((rest, _)) = sym(close).parse(input) {
            return Ok((rest, (items, trailing_comma)));
        }
        let (rest, item) = parse_expression(input)?;
        if ws(keyword("for")).parse(rest).is_ok() {
            return fail(rest, "Comprehensions are not supported");
        }
        items.push(item);
        match sym(',').parse(rest) {
            Ok((rest, _)) => {
                trailing_comma = true;
                input = rest;
            }
            Err(_) => {
                let (rest, _) = context("Unclosed bracket", cut(sym(close))).parse(rest)?;
                return Ok((rest, (items, false)));
            }
        }
    }
}

/// Collections of constants stay constants; anything else becomes an `array()`/`tuple()` call.
fn collection_expr(items: Vec<Expr>, is_tuple: bool) -> Expr {
    let constants: Option<Vec<ConstantValue>> = items.iter().map(Expr::as_constant).collect();
    match (constants, is_tuple) {
        (Some(values), true) => Expr::Constant(ConstantValue::Tuple(values)),
        (Some(values), false) => Expr::Constant(ConstantValue::List(values)),
        (None, true) => Expr::call("tuple", items),
        (None, false) => Expr::call("array", items),
    }
}

fn parse_list_literal(input: &str) -> PResult<'_, Expr> {
    let (input, _) = sym('[').parse(input)?;
    let (input, (items, _)) = parse_collection_items(input, ']')?;
    Ok((input, collection_expr(items, false)))
}

/// `(expr)` is grouping, `()`, `(a,)` and `(a, b)` are tuples.
fn parse_parenthesized(input: &str) -> PResult<'_, Expr> {
    let (input, _) = sym('(').parse(input)?;
    let (input, (mut items, trailing_comma)) = parse_collection_items(input, ')')?;
    if items.len() == 1 && !trailing_comma {
        return Ok((input, items.remove(0)));
    }
    Ok((input, collection_expr(items, true)))
}

fn parse_primary(input: &str) -> PResult<'_, Expr> {
    if keyword("lambda").parse(input).is_ok() {
        return fail(input, "Lambdas are not supported");
    }
    alt((
        map(parse_number_literal, Expr::Constant),
        map(parse_string_literal, |s| Expr::Constant(ConstantValue::String(s))),
        map(parse_keyword_literal, Expr::Constant),
        map(parse_placeholder_name, |name| Expr::Placeholder(name.to_string())),
        parse_list_literal,
        parse_parenthesized,
        map(parse_keyword_callee, |name| Expr::Field(vec![name])),
        map(parse_identifier, |name| Expr::Field(vec![name])),
    ))
    .parse(input)
}
