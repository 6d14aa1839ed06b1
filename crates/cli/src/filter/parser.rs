// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for filter expressions and durations.
//!
//! Parses expressions like `amount >= 10` into [`Clause`] values and
//! durations like `3d` into [`chrono::Duration`].

use chrono::Duration;
use ld_core::{Clause, CompareOp, Filter};
use serde_json::Value;

use crate::error::{Error, Result};

/// Parse a single filter expression.
///
/// # Examples
///
/// ```ignore
/// let clause = parse_clause("amount >= 10")?;
/// let clause = parse_clause("vendor.name = \"Corner Shop\"")?;
/// ```
///
/// # Errors
///
/// Returns an error with a helpful message if the expression is invalid.
pub fn parse_clause(input: &str) -> Result<Clause> {
    let input = input.trim();

    if input.is_empty() {
        return Err(invalid("empty filter expression".to_string()));
    }

    let (field, rest) = split_field(input)?;
    validate_field(field)?;

    let rest = rest.trim_start();
    let (op, rest) = parse_operator(rest)?;

    let value_str = rest.trim();
    if value_str.is_empty() {
        return Err(invalid(format!(
            "missing value in filter expression: \"{input}\""
        )));
    }

    Ok(Clause::new(field, op, parse_value(value_str)))
}

/// Build a filter from every expression, with an optional result limit.
pub fn parse_filter<S: AsRef<str>>(expressions: &[S], limit: Option<usize>) -> Result<Filter> {
    let mut filter = Filter::all();
    for expr in expressions {
        filter = filter.with(parse_clause(expr.as_ref())?);
    }
    if let Some(limit) = limit {
        filter = filter.limit(limit);
    }
    Ok(filter)
}

fn invalid(reason: String) -> Error {
    Error::InvalidFilter { reason }
}

/// Split input into field path and rest.
fn split_field(input: &str) -> Result<(&str, &str)> {
    let end = input
        .find(|c: char| c.is_whitespace() || c == '<' || c == '>' || c == '=' || c == '!')
        .unwrap_or(input.len());

    if end == 0 {
        return Err(invalid(format!(
            "missing field name in filter expression: \"{input}\""
        )));
    }

    Ok((&input[..end], &input[end..]))
}

/// Field paths are dot-separated, non-empty segments.
fn validate_field(field: &str) -> Result<()> {
    if field.split('.').any(str::is_empty) {
        return Err(invalid(format!("invalid field path '{field}'")));
    }
    Ok(())
}

/// Parse an operator from the start of the string.
fn parse_operator(s: &str) -> Result<(CompareOp, &str)> {
    // Two-character operators first
    if let Some(two) = s.get(..2) {
        match two {
            "<=" => return Ok((CompareOp::Le, &s[2..])),
            ">=" => return Ok((CompareOp::Ge, &s[2..])),
            "!=" => return Ok((CompareOp::Ne, &s[2..])),
            "<<" | ">>" | "==" => {
                return Err(invalid(format!(
                    "unknown operator '{two}'. Valid operators: {}",
                    CompareOp::valid_symbols()
                )));
            }
            _ => {}
        }
    }

    match s.chars().next() {
        Some('<') => return Ok((CompareOp::Lt, &s[1..])),
        Some('>') => return Ok((CompareOp::Gt, &s[1..])),
        Some('=') => return Ok((CompareOp::Eq, &s[1..])),
        _ => {}
    }

    // Extract what looks like an operator for the error message
    let op_end = s
        .find(|c: char| c.is_whitespace() || c.is_alphanumeric())
        .unwrap_or(s.len());
    let bad_op = s.get(..op_end).filter(|op| !op.is_empty()).unwrap_or("(none)");

    Err(invalid(format!(
        "unknown operator '{bad_op}'. Valid operators: {}",
        CompareOp::valid_symbols()
    )))
}

/// JSON literal, or the raw text as a string.
fn parse_value(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

/// Parse a duration string like "30s", "1h", "7d".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid_duration("empty duration".to_string()));
    }

    let (num_str, unit) = split_number_unit(s)?;

    let num: i64 = num_str
        .parse()
        .map_err(|_| invalid_duration(format!("invalid number in duration: '{num_str}'")))?;

    if num < 0 {
        return Err(invalid_duration(
            "negative durations are not allowed".to_string(),
        ));
    }

    let duration = match unit {
        "ms" => Duration::try_milliseconds(num),
        "s" => Duration::try_seconds(num),
        "m" => Duration::try_minutes(num),
        "h" => Duration::try_hours(num),
        "d" => Duration::try_days(num),
        "w" => Duration::try_weeks(num),
        "M" => Duration::try_days(num.saturating_mul(30)), // Approximate month
        "y" => Duration::try_days(num.saturating_mul(365)), // Approximate year
        _ => {
            return Err(invalid_duration(format!(
                "unknown duration unit '{unit}'. Valid units: ms, s, m, h, d, w, M, y"
            )))
        }
    };
    duration.ok_or_else(|| invalid_duration(format!("duration out of range: '{s}'")))
}

fn invalid_duration(reason: String) -> Error {
    Error::InvalidDuration { reason }
}

/// Split a duration string into number and unit parts.
fn split_number_unit(s: &str) -> Result<(&str, &str)> {
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '-')
        .unwrap_or(s.len());

    if num_end == 0 {
        return Err(invalid_duration(format!(
            "duration must start with a number: '{s}'"
        )));
    }

    let num_str = &s[..num_end];
    let unit = &s[num_end..];

    if unit.is_empty() {
        return Err(invalid_duration(format!(
            "duration missing unit: '{s}'. Valid units: ms, s, m, h, d, w, M, y"
        )));
    }

    Ok((num_str, unit))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
