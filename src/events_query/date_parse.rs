//! Absolute and relative (`-24h`, `-1mStart`) date bounds.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use regex::Regex;

use crate::errors::HogQLError;

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?P<number>\d+)?(?P<unit>[hdwmqy])(?P<position>Start|End)?$").unwrap()
});

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a time bound, trying the absolute formats before the relative syntax.
pub fn parse_date_bound(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, HogQLError> {
    match parse_absolute_date(input) {
        Some(parsed) => Ok(parsed),
        None => relative_date_parse(input, now),
    }
}

/// RFC 3339, or a naive date/datetime taken as UTC.
pub fn parse_absolute_date(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

/// Resolve a relative date such as `-7d`, `-1mStart` or `yEnd` against `now`.
///
/// Hour offsets truncate to the start of the hour, every other unit to midnight.
/// `Start`/`End` snap months and years to their first or last day.
pub fn relative_date_parse(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, HogQLError> {
    let caps = RELATIVE_DATE
        .captures(input)
        .ok_or_else(|| HogQLError::validation(format!("Unable to parse date '{}'", input)))?;
    let out_of_range = || HogQLError::validation(format!("Date '{}' is out of range", input));

    let number: u32 = match caps.name("number") {
        Some(m) => m.as_str().parse().map_err(|_| out_of_range())?,
        None => 0,
    };
    let position = caps.name("position").map(|m| m.as_str());

    if &caps["unit"] == "h" {
        return TimeDelta::try_hours(i64::from(number))
            .and_then(|delta| now.checked_sub_signed(delta))
            .and_then(|shifted| shifted.with_minute(0))
            .and_then(|shifted| shifted.with_second(0))
            .and_then(|shifted| shifted.with_nanosecond(0))
            .ok_or_else(out_of_range);
    }

    let today = now.date_naive();
    let date = match &caps["unit"] {
        "d" => today.checked_sub_days(Days::new(u64::from(number))),
        "w" => today.checked_sub_days(Days::new(7 * u64::from(number))),
        "q" => today.checked_sub_days(Days::new(7 * 13 * u64::from(number))),
        "m" => today
            .checked_sub_months(Months::new(number))
            .and_then(|date| match position {
                Some("Start") => date.with_day(1),
                Some("End") => end_of_month(date),
                _ => Some(date),
            }),
        _ => number
            .checked_mul(12)
            .and_then(|months| today.checked_sub_months(Months::new(months)))
            .and_then(|date| match position {
                Some("Start") => NaiveDate::from_ymd_opt(date.year(), 1, 1),
                Some("End") => NaiveDate::from_ymd_opt(date.year(), 12, 31),
                _ => Some(date),
            }),
    };

    date.and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(out_of_range)
}

fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 15, 13, 45, 30).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test_case("-24h", at(2023, 3, 14, 13) ; "hours truncate to the hour")]
    #[test_case("-1d", at(2023, 3, 14, 0) ; "days")]
    #[test_case("d", at(2023, 3, 15, 0) ; "start of today")]
    #[test_case("-2w", at(2023, 3, 1, 0) ; "weeks")]
    #[test_case("-1q", at(2022, 12, 14, 0) ; "quarters are thirteen weeks")]
    #[test_case("-1m", at(2023, 2, 15, 0) ; "months")]
    #[test_case("-1mStart", at(2023, 2, 1, 0) ; "month start")]
    #[test_case("-1mEnd", at(2023, 2, 28, 0) ; "month end")]
    #[test_case("-1y", at(2022, 3, 15, 0) ; "years")]
    #[test_case("yStart", at(2023, 1, 1, 0) ; "year start")]
    #[test_case("-1yEnd", at(2022, 12, 31, 0) ; "year end")]
    fn test_relative_date_parse(input: &str, expected: DateTime<Utc>) {
        assert_eq!(relative_date_parse(input, now()).unwrap(), expected);
    }

    #[test]
    fn test_month_arithmetic_clamps_day() {
        let end_of_march = Utc.with_ymd_and_hms(2023, 3, 31, 8, 0, 0).unwrap();
        assert_eq!(relative_date_parse("-1m", end_of_march).unwrap(), at(2023, 2, 28, 0));
    }

    #[test]
    fn test_rejects_unknown_syntax() {
        assert!(matches!(
            relative_date_parse("yesterday", now()),
            Err(HogQLError::Validation(_))
        ));
        assert!(relative_date_parse("-5x", now()).is_err());
        assert!(relative_date_parse("-99999999999d", now()).is_err());
    }

    #[test_case("2023-01-02T03:04:05Z", Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap() ; "rfc3339")]
    #[test_case("2023-01-02T05:04:05+02:00", Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap() ; "rfc3339 with offset")]
    #[test_case("2023-01-02T03:04:05", Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap() ; "naive is utc")]
    #[test_case("2023-01-02 03:04:05.250", Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap() + TimeDelta::milliseconds(250) ; "space separated with fraction")]
    #[test_case("2023-01-02T03:04", Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 0).unwrap() ; "minutes only")]
    #[test_case("2023-01-02", at(2023, 1, 2, 0) ; "date only")]
    fn test_absolute_dates(input: &str, expected: DateTime<Utc>) {
        assert_eq!(parse_date_bound(input, now()).unwrap(), expected);
    }

    #[test]
    fn test_relative_input_is_not_absolute() {
        assert_eq!(parse_absolute_date("-1d"), None);
        assert_eq!(parse_date_bound("-1d", now()).unwrap(), at(2023, 3, 14, 0));
    }
}
