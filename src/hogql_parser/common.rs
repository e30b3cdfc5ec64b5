use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{not, opt, peek, recognize},
    error::ParseError,
    sequence::{delimited, pair, terminated},
    IResult, Parser,
};

use super::ast::ConstantValue;
use super::errors::HogQLParsingError;

pub type PResult<'a, T> = IResult<&'a str, T, HogQLParsingError<'a>>;

/// Words that can never be used as a bare field name.
const KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "like", "ilike", "as", "lambda", "for", "if", "else", "is",
];

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// A single punctuation character surrounded by optional whitespace.
pub fn sym<'a>(c: char) -> impl Parser<&'a str, Output = char, Error = HogQLParsingError<'a>> {
    ws(char(c))
}

pub fn fail<'a, T>(input: &'a str, ctx: &'static str) -> PResult<'a, T> {
    Err(nom::Err::Failure(HogQLParsingError::new(input, ctx)))
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Match a keyword that is not immediately followed by more identifier characters,
/// so `or` never matches the start of `order`.
pub fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = HogQLParsingError<'a>> {
    terminated(tag(kw), not(peek(satisfy(is_identifier_char))))
}

fn bare_identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(is_identifier_start),
        take_while(is_identifier_char),
    ))
    .parse(input)
}

/// A backtick-quoted identifier, undoing the escapes produced by the identifier escaper.
fn quoted_identifier(input: &str) -> PResult<'_, String> {
    let (rest, _) = char::<_, HogQLParsingError>('`').parse(input)?;
    let (rest, value) = unescape_until(rest, '`')?;
    Ok((rest, value))
}

/// Parse an identifier. Bare identifiers may not be reserved words.
pub fn parse_identifier(input: &str) -> PResult<'_, String> {
    if input.starts_with('`') {
        return quoted_identifier(input);
    }
    let (rest, ident) = bare_identifier(input)?;
    if is_keyword(ident) {
        return Err(nom::Err::Error(HogQLParsingError::new(
            input,
            "Reserved word used as identifier",
        )));
    }
    Ok((rest, ident.to_string()))
}

/// A reserved word used as a function name, e.g. `if(...)`. Only matches when `(`
/// follows immediately.
pub fn parse_keyword_callee(input: &str) -> PResult<'_, String> {
    let (rest, ident) = bare_identifier(input)?;
    if !is_keyword(ident) || !rest.starts_with('(') {
        return Err(nom::Err::Error(HogQLParsingError::new(
            input,
            "Expected a function name",
        )));
    }
    Ok((rest, ident.to_string()))
}

/// Consume characters up to an unescaped `quote`, translating C-style escapes.
fn unescape_until(input: &str, quote: char) -> PResult<'_, String> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            return Ok((&input[idx + c.len_utf8()..], value));
        }
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 'b')) => value.push('\u{8}'),
            Some((_, 'f')) => value.push('\u{c}'),
            Some((_, 'n')) => value.push('\n'),
            Some((_, 'r')) => value.push('\r'),
            Some((_, 't')) => value.push('\t'),
            Some((_, '0')) => value.push('\0'),
            Some((_, 'a')) => value.push('\u{7}'),
            Some((_, 'v')) => value.push('\u{b}'),
            Some((_, other)) => value.push(other),
            None => break,
        }
    }
    fail(input, "Unterminated string or identifier")
}

pub fn parse_string_literal(input: &str) -> PResult<'_, String> {
    let (rest, quote) = one_of::<_, _, HogQLParsingError>("'\"").parse(input)?;
    unescape_until(rest, quote)
}

fn exponent(input: &str) -> PResult<'_, &str> {
    recognize((one_of("eE"), opt(one_of("+-")), digit1)).parse(input)
}

/// Integer or float literal without sign; unary minus is a separate node.
pub fn parse_number_literal(input: &str) -> PResult<'_, ConstantValue> {
    let (rest, text) = alt((
        recognize((digit1, char('.'), digit0, opt(exponent))),
        recognize((char('.'), digit1, opt(exponent))),
        recognize(pair(digit1, exponent)),
        digit1,
    ))
    .parse(input)?;

    if rest.starts_with(is_identifier_start) {
        return fail(input, "Invalid number literal");
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return match text.parse::<i64>() {
            Ok(i) => Ok((rest, ConstantValue::Integer(i))),
            Err(_) => fail(input, "Integer literal out of range"),
        };
    }
    match text.parse::<f64>() {
        Ok(f) => Ok((rest, ConstantValue::Float(f))),
        Err(_) => fail(input, "Invalid number literal"),
    }
}

/// `true`/`false`/`null` in either the lower-case or the capitalised spelling.
pub fn parse_keyword_literal(input: &str) -> PResult<'_, ConstantValue> {
    alt((
        alt((keyword("true"), keyword("True"))).map(|_| ConstantValue::Boolean(true)),
        alt((keyword("false"), keyword("False"))).map(|_| ConstantValue::Boolean(false)),
        alt((keyword("null"), keyword("None"))).map(|_| ConstantValue::Null),
    ))
    .parse(input)
}

/// `{name}` placeholder.
pub fn parse_placeholder_name(input: &str) -> PResult<'_, &str> {
    delimited(sym('{'), take_while1(is_identifier_char), sym('}')).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier("event rest"), Ok((" rest", "event".to_string())));
        assert_eq!(parse_identifier("$browser"), Ok(("", "$browser".to_string())));
        assert_eq!(parse_identifier("`a b`"), Ok(("", "a b".to_string())));
        assert_eq!(parse_identifier("`back\\`tick`"), Ok(("", "back`tick".to_string())));
        assert!(parse_identifier("and").is_err());
        assert!(parse_identifier("0abc").is_err());
    }

    #[test]
    fn test_parse_string_literal() {
        assert_eq!(parse_string_literal("'abc'"), Ok(("", "abc".to_string())));
        assert_eq!(parse_string_literal("\"abc\" x"), Ok((" x", "abc".to_string())));
        assert_eq!(
            parse_string_literal("'single\\'quote'"),
            Ok(("", "single'quote".to_string()))
        );
        assert_eq!(parse_string_literal("'a\\nb'"), Ok(("", "a\nb".to_string())));
        assert!(parse_string_literal("'open").is_err());
    }

    #[test]
    fn test_parse_number_literal() {
        assert_eq!(parse_number_literal("123"), Ok(("", ConstantValue::Integer(123))));
        assert_eq!(parse_number_literal("1.5"), Ok(("", ConstantValue::Float(1.5))));
        assert_eq!(parse_number_literal(".5)"), Ok((")", ConstantValue::Float(0.5))));
        assert_eq!(parse_number_literal("1e-18"), Ok(("", ConstantValue::Float(1e-18))));
        assert!(parse_number_literal("99999999999999999999").is_err());
        assert!(parse_number_literal("12abc").is_err());
    }

    #[test]
    fn test_keyword_does_not_match_prefix() {
        assert!(keyword("or").parse("order").is_err());
        assert!(keyword("or").parse("or x").is_ok());
    }
}
