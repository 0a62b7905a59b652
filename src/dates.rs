use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::DateParseError;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 3000;

fn dmy_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([0-9]{1,2})-([0-9]{1,2})-([0-9]{4})\s*$")
            .expect("valid DD-MM-YYYY pattern")
    })
}

/// Parses a `DD-MM-YYYY` string into a calendar date.
///
/// Dates that do not exist (30 February, 31 April) are rejected rather than
/// rolled over into the following month.
pub fn parse(value: &str) -> Result<NaiveDate, DateParseError> {
    let captures = dmy_pattern()
        .captures(value)
        .ok_or_else(|| DateParseError::Malformed(value.to_string()))?;

    let component = |index: usize| -> Result<i32, DateParseError> {
        captures[index]
            .parse::<i32>()
            .map_err(|_| DateParseError::Malformed(value.to_string()))
    };
    let day = component(1)?;
    let month = component(2)?;
    let year = component(3)?;

    if !(1..=31).contains(&day)
        || !(1..=12).contains(&month)
        || !(MIN_YEAR..=MAX_YEAR).contains(&year)
    {
        return Err(DateParseError::OutOfRange(value.to_string()));
    }

    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| DateParseError::InvalidCalendarDate(value.to_string()))?;

    if date.year() != year || date.month() != month as u32 || date.day() != day as u32 {
        return Err(DateParseError::InvalidCalendarDate(value.to_string()));
    }

    Ok(date)
}

/// Parses an optional field, treating an absent value as malformed.
pub fn parse_field(value: Option<&str>) -> Result<NaiveDate, DateParseError> {
    match value {
        Some(text) => parse(text),
        None => Err(DateParseError::Malformed(String::new())),
    }
}

pub fn format(date: NaiveDate) -> String {
    format!("{:02}-{:02}-{:04}", date.day(), date.month(), date.year())
}
