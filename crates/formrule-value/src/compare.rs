//! Value comparison
//!
//! Equality is structural and never coerces between shapes. Ordering only
//! makes sense for numbers and points in time: dates and date input strings
//! are turned into millisecond timestamps first, and any operand that is not
//! a finite number afterwards makes the comparison `false`.

use crate::predicates::parse_date_string;
use crate::value::FieldValue;
use std::fmt;
use std::str::FromStr;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Operator {
    /// Textual form of the operator
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    /// Whether this is one of the ordering operators
    #[must_use]
    pub fn is_ordering(self) -> bool {
        !matches!(self, Operator::Eq | Operator::Ne)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            other => Err(crate::Error::UnknownOperator(other.to_string())),
        }
    }
}

/// Numeric view of a value for ordering comparisons
///
/// Dates and date input strings become millisecond timestamps; numbers pass
/// through unchanged (including NaN). Everything else has no numeric view.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn timestamp_of(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Date(date) => Some(date.timestamp_millis() as f64),
        FieldValue::String(text) => {
            // Date-shaped text that names no real day is not a number
            if crate::predicates::is_date_string(value) {
                Some(parse_date_string(text).map_or(f64::NAN, |d| d.timestamp_millis() as f64))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Compare two values with the given operator
#[must_use]
pub fn compare(a: &FieldValue, b: &FieldValue, operator: Operator) -> bool {
    let ordered = |test: fn(f64, f64) -> bool| match (timestamp_of(a), timestamp_of(b)) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => test(a, b),
        _ => false,
    };

    match operator {
        Operator::Eq => a == b,
        Operator::Ne => a != b,
        Operator::Gt => ordered(|a, b| a > b),
        Operator::Ge => ordered(|a, b| a >= b),
        Operator::Lt => ordered(|a, b| a < b),
        Operator::Le => ordered(|a, b| a <= b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use regex::Regex;
    use serde_json::json;

    const ORDERING: [Operator; 4] = [Operator::Gt, Operator::Ge, Operator::Lt, Operator::Le];

    fn v(value: impl Into<FieldValue>) -> FieldValue {
        value.into()
    }

    #[test]
    fn test_equal_values() {
        let now = Utc::now();
        let pairs = vec![
            (v(""), v("")),
            (v("1"), v("1")),
            (v(1), v(1)),
            (v(-1.1), v(-1.1)),
            (v(true), v(true)),
            (FieldValue::Null, FieldValue::Null),
            (FieldValue::Undefined, FieldValue::Undefined),
            (v(json!({})), v(json!({}))),
            (v(json!({"key": 1})), v(json!({"key": 1}))),
            (v(vec![1]), v(vec![1])),
            (v(Regex::new("1").unwrap()), v(Regex::new("1").unwrap())),
            (v(now), v(now)),
            (v("2023-01-01T23:00"), v("2023-01-01T23:00")),
        ];

        for (a, b) in pairs {
            assert!(compare(&a, &b, Operator::Eq), "{a:?} == {b:?}");
            assert!(!compare(&a, &b, Operator::Ne), "!({a:?} != {b:?})");
        }
    }

    #[test]
    fn test_not_equal_values() {
        let pairs = vec![
            (v(1), v(0)),
            (v(1.2), v(1.1)),
            (v(1), v("1")),
            (v(json!({})), v(json!({"key": 1}))),
            (v(true), v(false)),
            (FieldValue::Null, FieldValue::Undefined),
            (v(vec![1]), v(vec![2])),
            (v(Regex::new("1").unwrap()), v(Regex::new("2").unwrap())),
            (v("2023-01-01"), v("2023-01-02")),
        ];

        for (a, b) in pairs {
            assert!(compare(&a, &b, Operator::Ne), "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_greater_than() {
        let now = Utc::now();
        let pairs = vec![
            (v(1), v(0)),
            (v(0), v(-1)),
            (v(-1), v(-1.1)),
            (v("2023-02-01"), v("2023-01-01")),
            (v("2023-01-01T00:01"), v("2023-01-01T00:00")),
            (v(now + Duration::days(1)), v(now)),
        ];

        for (a, b) in pairs {
            assert!(compare(&a, &b, Operator::Gt), "{a:?} > {b:?}");
            assert!(compare(&a, &b, Operator::Ge), "{a:?} >= {b:?}");
            assert!(compare(&b, &a, Operator::Lt), "{b:?} < {a:?}");
            assert!(compare(&b, &a, Operator::Le), "{b:?} <= {a:?}");
        }
    }

    #[test]
    fn test_inclusive_bounds() {
        let now = Utc::now();
        for (a, b) in [
            (v(1), v(1)),
            (v(now), v(now)),
            (v("2023-01-01"), v("2023-01-01")),
            (v("2023-01-01T00:00"), v("2023-01-01T00:00")),
        ] {
            assert!(compare(&a, &b, Operator::Ge));
            assert!(compare(&a, &b, Operator::Le));
            assert!(!compare(&a, &b, Operator::Gt));
            assert!(!compare(&a, &b, Operator::Lt));
        }
    }

    #[test]
    fn test_date_mixed_with_date_string() {
        let day = crate::predicates::parse_date_string("2023-01-01").unwrap();
        assert!(compare(&v(day + Duration::hours(1)), &v("2023-01-01"), Operator::Gt));
        assert!(compare(&v("2023-01-01T00:00"), &v(day), Operator::Ge));
    }

    #[test]
    fn test_non_finite_ordering_is_false() {
        let pairs = [
            (f64::NAN, f64::NAN),
            (f64::NAN, f64::INFINITY),
            (f64::NAN, f64::NEG_INFINITY),
            (f64::INFINITY, f64::INFINITY),
            (f64::INFINITY, f64::NEG_INFINITY),
        ];

        for (a, b) in pairs {
            for op in ORDERING {
                assert!(!compare(&v(a), &v(b), op), "{a} {op} {b}");
            }
        }
    }

    #[test]
    fn test_non_numeric_ordering_is_false() {
        for op in ORDERING {
            assert!(!compare(&v("b"), &v("a"), op));
            assert!(!compare(&v(1), &v("1"), op));
            assert!(!compare(&FieldValue::Undefined, &v(1), op));
            assert!(!compare(&v(vec![2]), &v(vec![1]), op));
            assert!(!compare(&v("2023-02-31"), &v("2023-01-01"), op));
        }
    }

    #[test]
    fn test_operator_text() {
        for op in [Operator::Eq, Operator::Ne, Operator::Gt, Operator::Ge, Operator::Lt, Operator::Le] {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("=~".parse::<Operator>().is_err());
        assert!(Operator::Gt.is_ordering());
        assert!(!Operator::Ne.is_ordering());
    }
}
