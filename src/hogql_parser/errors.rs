use nom::error::{ContextError, ErrorKind, ParseError};
use std::fmt;

/// Context recorded when nom fails without a more specific explanation.
pub const GENERIC_ERROR: &str = "Unexpected input";

#[derive(Debug, PartialEq)]
pub struct HogQLParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> HogQLParsingError<'a> {
    pub fn new(input: &'a str, ctx: &'static str) -> Self {
        HogQLParsingError {
            errors: vec![(input, ctx)],
        }
    }

    /// The innermost specific message with a short excerpt of where it happened.
    pub fn message(&self) -> String {
        let (input, ctx) = self
            .errors
            .iter()
            .find(|(_, ctx)| *ctx != GENERIC_ERROR)
            .or_else(|| self.errors.first())
            .copied()
            .unwrap_or(("", GENERIC_ERROR));
        let excerpt: String = input.chars().take(24).collect();
        if excerpt.is_empty() {
            format!("{} at end of input", ctx)
        } else {
            format!("{} near '{}'", ctx, excerpt)
        }
    }
}

impl<'a> ParseError<&'a str> for HogQLParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        HogQLParsingError::new(input, GENERIC_ERROR)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        // keep whichever branch got further into the input
        let self_rest = self.errors.first().map(|(i, _)| i.len()).unwrap_or(usize::MAX);
        let other_rest = other.errors.first().map(|(i, _)| i.len()).unwrap_or(usize::MAX);
        if other_rest <= self_rest {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for HogQLParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for HogQLParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {:}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for HogQLParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        HogQLParsingError::new(err.input, "Unable to parse")
    }
}
