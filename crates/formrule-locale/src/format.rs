//! Placeholder substitution

use crate::message::Constraints;
use chrono::SecondsFormat;
use formrule_value::FieldValue;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z0-9\-_]+)\}").expect("placeholder regex is valid"));

const KILOBYTE_UNIT: u64 = 1000;
const SIZES: [&str; 6] = ["Byte", "KB", "MB", "GB", "TB", "PB"];

/// Replace `{key}` segments with text from the constraint payload
///
/// Keys the payload does not have, or whose value has no display form
/// (objects, files, missing values), are left as written.
#[must_use]
pub fn format(template: &str, constraints: Option<&Constraints>) -> String {
    let Some(constraints) = constraints else {
        return template.to_string();
    };

    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            constraints
                .placeholder(&caps[1])
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Display form of a value for messages
///
/// Returns `None` for shapes that have no natural text form.
#[must_use]
pub fn display_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Undefined | FieldValue::Null | FieldValue::Object(_) | FieldValue::Files(_) => {
            None
        }
        FieldValue::Bool(b) => Some(b.to_string()),
        FieldValue::Number(n) => Some(display_number(*n)),
        FieldValue::String(s) => Some(s.clone()),
        FieldValue::Date(date) => Some(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        FieldValue::Array(items) => Some(display_list(items)),
        FieldValue::Regex(re) => Some(format!("/{}/", re.as_str())),
    }
}

/// Comma-joined display of a list; items without a text form become empty
#[must_use]
pub fn display_list(items: &[FieldValue]) -> String {
    items
        .iter()
        .map(|item| display_value(item).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

fn display_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        n.to_string()
    }
}

/// Human-readable byte size, e.g. `1.5 MB`
///
/// `kilobyte_unit` defaults to 1000; pass 1024 for binary units. Zero bytes
/// read as `n/a`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bytes_to_size(bytes: u64, kilobyte_unit: Option<u64>) -> String {
    if bytes == 0 {
        return "n/a".to_string();
    }

    let unit = kilobyte_unit.filter(|u| *u >= 2).unwrap_or(KILOBYTE_UNIT);

    let mut index = 0;
    let mut scale: u64 = 1;
    while index < SIZES.len() - 1 && bytes / scale >= unit {
        match scale.checked_mul(unit) {
            Some(next) => scale = next,
            None => break,
        }
        index += 1;
    }

    if index == 0 {
        return format!("{bytes} {}", SIZES[0]);
    }

    let scaled = format!("{:.1}", bytes as f64 / scale as f64);
    let trimmed = scaled.strip_suffix(".0").unwrap_or(&scaled);
    format!("{trimmed} {}", SIZES[index])
}
