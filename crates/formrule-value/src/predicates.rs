//! Shape predicates
//!
//! Every rule classifies values through these functions, so the notion of
//! "a string", "a number" or "countable" lives in exactly one place.

use crate::value::FieldValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

/// `YYYY-MM-DD` or `YYYY-MM-DDTHH:mm`, the HTML date and datetime-local input formats
static DATE_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9]\d{3}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])(T([01]\d|2[0-3]):[0-5]\d)?$")
        .expect("date input regex is valid")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_+\-]+(\.[A-Za-z0-9_+\-]+)*@[A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?)+$",
    )
    .expect("email regex is valid")
});

/// Anything other than `Undefined` and `Null`
#[must_use]
pub fn is_defined(value: &FieldValue) -> bool {
    !matches!(value, FieldValue::Undefined | FieldValue::Null)
}

#[must_use]
pub fn is_string(value: &FieldValue) -> bool {
    matches!(value, FieldValue::String(_))
}

/// Finite numbers only; NaN and infinities are rejected
#[must_use]
pub fn is_number(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Number(n) if n.is_finite())
}

#[must_use]
pub fn is_boolean(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Bool(_))
}

#[must_use]
pub fn is_array(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Array(_))
}

#[must_use]
pub fn is_date(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Date(_))
}

#[must_use]
pub fn is_file_list(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Files(_))
}

#[must_use]
pub fn is_regexp(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Regex(_))
}

#[must_use]
pub fn is_plain_object(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Object(_))
}

/// True for anything that is not an object with at least one key
#[must_use]
pub fn is_empty_object(value: &FieldValue) -> bool {
    value.as_object().is_none_or(std::collections::BTreeMap::is_empty)
}

/// Text, lists and file collections have a length
#[must_use]
pub fn is_countable(value: &FieldValue) -> bool {
    countable_len(value).is_some()
}

/// Length of a countable value (characters for text)
#[must_use]
pub fn countable_len(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::String(s) => Some(s.chars().count()),
        FieldValue::Array(items) => Some(items.len()),
        FieldValue::Files(files) => Some(files.len()),
        _ => None,
    }
}

/// Missing, null, or countable with zero length
#[must_use]
pub fn is_empty(value: &FieldValue) -> bool {
    !is_defined(value) || countable_len(value) == Some(0)
}

/// Text in the strict date input grammar
#[must_use]
pub fn is_date_string(value: &FieldValue) -> bool {
    value.as_str().is_some_and(|s| DATE_INPUT_RE.is_match(s))
}

/// Parse a date input string as a UTC instant
///
/// Returns `None` when the text is outside the grammar or names a day that
/// does not exist (e.g. `2023-02-31`).
#[must_use]
pub fn parse_date_string(text: &str) -> Option<DateTime<Utc>> {
    if !DATE_INPUT_RE.is_match(text) {
        return None;
    }

    if text.len() == 10 {
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
    } else {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
            .ok()
            .map(|dt| dt.and_utc())
    }
}

#[must_use]
pub fn is_email(value: &FieldValue) -> bool {
    value.as_str().is_some_and(|s| EMAIL_RE.is_match(s))
}

/// Dotted-quad IPv4 address without leading zeros
#[must_use]
pub fn is_ip_address(value: &FieldValue) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok())
}
