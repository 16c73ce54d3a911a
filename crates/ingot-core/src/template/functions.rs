//! Built-in template functions

use super::error::TemplateError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_OUTPUT: &str = "%Y-%m-%dT%H:%M:%S";

/// Function callable as `=name(args)` in a template line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// `geoloc(lat, lng)`: GeoJSON point literal
    GeoLoc,
    /// `datetime(value, format)`: normalized datetime literal
    DateTime,
    /// `randomDate(start, end)`: random date in the inclusive range
    RandomDate,
    /// `split(list)`: one statement per list element
    Split,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "geoloc" => Some(Function::GeoLoc),
            "datetime" => Some(Function::DateTime),
            "randomDate" => Some(Function::RandomDate),
            "split" => Some(Function::Split),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::GeoLoc => "geoloc",
            Function::DateTime => "datetime",
            Function::RandomDate => "randomDate",
            Function::Split => "split",
        }
    }

    /// Number of arguments the function takes
    pub fn arity(self) -> usize {
        match self {
            Function::Split => 1,
            Function::GeoLoc | Function::DateTime | Function::RandomDate => 2,
        }
    }

    /// Evaluate the function into one or more object literals
    pub(crate) fn evaluate<R: Rng + ?Sized>(
        self,
        line: usize,
        args: &[String],
        rng: &mut R,
    ) -> Result<Vec<String>, TemplateError> {
        match self {
            Function::GeoLoc => {
                let lat = parse_coordinate(line, &args[0])?;
                let lng = parse_coordinate(line, &args[1])?;
                Ok(vec![format!(
                    "\"{}\"^^<geo:geojson>",
                    escape_literal(&geojson_point(lat, lng))
                )])
            }
            Function::DateTime => {
                let parsed = parse_datetime(line, &args[0], &args[1])?;
                Ok(vec![format!("\"{}\"", parsed.format(DATETIME_OUTPUT))])
            }
            Function::RandomDate => {
                let date = random_date(line, &args[0], &args[1], rng)?;
                Ok(vec![format!("\"{}\"", date.format(DATE_FORMAT))])
            }
            Function::Split => Ok(split_list(&args[0])
                .into_iter()
                .map(|element| format!("\"{}\"", escape_literal(&element)))
                .collect()),
        }
    }
}

/// GeoJSON payload for a point, longitude first, eight decimals
pub fn geojson_point(lat: f64, lng: f64) -> String {
    format!(
        "{{\"type\":\"Point\",\"coordinates\":[{:.8},{:.8}]}}",
        lng, lat
    )
}

/// Escape a value for embedding inside a double-quoted literal
pub(crate) fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn parse_coordinate(line: usize, value: &str) -> Result<f64, TemplateError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TemplateError::invalid_argument(line, "geoloc", value, "not a number"))
}

fn parse_datetime(line: usize, value: &str, format: &str) -> Result<NaiveDateTime, TemplateError> {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(parsed);
    }
    NaiveDate::parse_from_str(value, format)
        .map(|date| date.and_time(NaiveTime::default()))
        .map_err(|e| TemplateError::invalid_argument(line, "datetime", value, e.to_string()))
}

fn random_date<R: Rng + ?Sized>(
    line: usize,
    start: &str,
    end: &str,
    rng: &mut R,
) -> Result<NaiveDate, TemplateError> {
    let parse = |value: &str| {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| TemplateError::invalid_argument(line, "randomDate", value, e.to_string()))
    };
    let start_date = parse(start)?;
    let end_date = parse(end)?;
    if end_date < start_date {
        return Err(TemplateError::invalid_argument(
            line,
            "randomDate",
            end,
            format!("end date is before start date {start}"),
        ));
    }

    let span = (end_date - start_date).num_days();
    let offset = rng.random_range(0..=span);
    start_date
        .checked_add_signed(Duration::days(offset))
        .ok_or_else(|| TemplateError::invalid_argument(line, "randomDate", end, "date out of range"))
}

/// Split a bracketed list into its elements
///
/// Elements may be quoted with `'` or `"`; commas inside quotes are kept.
/// A value without brackets is a single element.
fn split_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return vec![trimmed.to_string()];
    };

    let mut elements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted = false;

    let mut push = |current: &mut String, quoted: &mut bool| {
        let element = current.trim();
        if *quoted || !element.is_empty() {
            elements.push(element.to_string());
        }
        current.clear();
        *quoted = false;
    };

    for c in inner.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                quoted = true;
            }
            (None, ',') => push(&mut current, &mut quoted),
            (None, c) => current.push(c),
        }
    }
    push(&mut current, &mut quoted);
    elements
}
