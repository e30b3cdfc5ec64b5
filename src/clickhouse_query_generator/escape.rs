//! Escaping of identifiers and literal values for the HogQL and ClickHouse dialects.
//!
//! All text produced here is embedded verbatim into SQL, so nothing user supplied may
//! reach a query without passing through one of these functions.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use regex::Regex;

use super::errors::ClickhouseQueryGeneratorError;
use crate::hogql_parser::ast::ConstantValue;

/// Target dialect for printing and escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    HogQL,
    ClickHouse,
}

/// HogQL identifiers may contain `$`, e.g. `$browser`
static HOGQL_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// ClickHouse identifiers containing `$` must be quoted
static CLICKHOUSE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

fn escape_char(c: char, quote: char, out: &mut String) {
    match c {
        '\u{8}' => out.push_str("\\b"),
        '\u{c}' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\0' => out.push_str("\\0"),
        '\u{7}' => out.push_str("\\a"),
        '\u{b}' => out.push_str("\\v"),
        '\\' => out.push_str("\\\\"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c => out.push(c),
    }
}

fn quote_with(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        escape_char(c, quote, &mut out);
    }
    out.push(quote);
    out
}

fn is_numeric(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

pub fn escape_hogql_identifier(name: &str) -> String {
    if HOGQL_IDENTIFIER.is_match(name) && !is_numeric(name) {
        return name.to_string();
    }
    quote_with(name, '`')
}

pub fn escape_clickhouse_identifier(name: &str) -> String {
    if CLICKHOUSE_IDENTIFIER.is_match(name) && !is_numeric(name) {
        return name.to_string();
    }
    quote_with(name, '`')
}

pub fn escape_identifier(name: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::HogQL => escape_hogql_identifier(name),
        Dialect::ClickHouse => escape_clickhouse_identifier(name),
    }
}

/// Single-quoted string literal, valid in both dialects.
pub fn escape_hogql_string(value: &str) -> String {
    quote_with(value, '\'')
}

pub fn escape_clickhouse_string(value: &str) -> String {
    quote_with(value, '\'')
}

/// Render a float the way Python's `repr` does: shortest round-trip digits, scientific
/// notation below 1e-4 or from 1e16 upwards, and always a `.` or exponent otherwise.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if value != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let plain = format!("{}", value);
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

pub(crate) fn parse_timezone(timezone: &str) -> Result<Tz, ClickhouseQueryGeneratorError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| ClickhouseQueryGeneratorError::InvalidTimezone(timezone.to_string()))
}

fn format_datetime(
    value: &DateTime<Utc>,
    timezone: Option<&str>,
) -> Result<(String, String), ClickhouseQueryGeneratorError> {
    let timezone = timezone.unwrap_or("UTC");
    let tz = parse_timezone(timezone)?;
    let local = value.with_timezone(&tz);
    Ok((
        local.format("%Y-%m-%d %H:%M:%S").to_string(),
        tz.name().to_string(),
    ))
}

fn format_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Render a constant as a literal of `dialect`.
///
/// Date-times are shifted into `timezone` (UTC when absent) before formatting. Only the
/// ClickHouse dialect carries the timezone name as a second `toDateTime` argument.
pub fn escape_literal(
    value: &ConstantValue,
    dialect: Dialect,
    timezone: Option<&str>,
) -> Result<String, ClickhouseQueryGeneratorError> {
    let escape_all = |values: &[ConstantValue]| -> Result<Vec<String>, ClickhouseQueryGeneratorError> {
        values
            .iter()
            .map(|v| escape_literal(v, dialect, timezone))
            .collect()
    };

    Ok(match value {
        ConstantValue::Integer(i) => i.to_string(),
        ConstantValue::Float(f) => format_float(*f),
        ConstantValue::String(s) => quote_with(s, '\''),
        ConstantValue::Boolean(true) => "true".to_string(),
        ConstantValue::Boolean(false) => "false".to_string(),
        ConstantValue::Null => match dialect {
            Dialect::HogQL => "null".to_string(),
            Dialect::ClickHouse => "NULL".to_string(),
        },
        ConstantValue::List(values) => format!("[{}]", escape_all(values)?.join(", ")),
        ConstantValue::Tuple(values) => format!("({})", escape_all(values)?.join(", ")),
        ConstantValue::Uuid(uuid) => match dialect {
            Dialect::HogQL => format!("toUUID({})", quote_with(&uuid.to_string(), '\'')),
            Dialect::ClickHouse => {
                format!("toUUIDOrNull({})", quote_with(&uuid.to_string(), '\''))
            }
        },
        ConstantValue::Date(date) => format!("toDate({})", quote_with(&format_date(date), '\'')),
        ConstantValue::DateTime(datetime) => {
            let (text, tz) = format_datetime(datetime, timezone)?;
            match dialect {
                Dialect::HogQL => format!("toDateTime({})", quote_with(&text, '\'')),
                Dialect::ClickHouse => format!(
                    "toDateTime({}, {})",
                    quote_with(&text, '\''),
                    quote_with(&tz, '\'')
                ),
            }
        }
    })
}
