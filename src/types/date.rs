use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::validation::ViolationKind;

const ISO_DATE: &str = "%Y-%m-%d";

/// Parses an optional publish date.
///
/// `null` is no date. Strings must be `YYYY-MM-DD`; numbers are UNIX seconds read in
/// UTC and truncated to the calendar date.
pub fn parse_date(value: &Value) -> Result<Option<NaiveDate>, ViolationKind> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if is_iso_shaped(s) => NaiveDate::parse_from_str(s, ISO_DATE)
            .map(Some)
            .map_err(|_| ViolationKind::InvalidDate),
        Value::String(_) => Err(ViolationKind::InvalidDate),
        Value::Number(n) => {
            let secs = match n.as_i64() {
                Some(secs) => Some(secs),
                None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64),
            };
            secs.and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|ts| Some(ts.date_naive()))
                .ok_or(ViolationKind::InvalidDate)
        }
        _ => Err(ViolationKind::WrongType { expected: "date" }),
    }
}

/// Exactly `DDDD-DD-DD`; chrono alone also takes signs, padding and single digits.
fn is_iso_shaped(s: &str) -> bool {
    s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}
