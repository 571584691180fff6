//! Built-in rule factories
//!
//! Every factory takes its constraint, the locale the failure message is
//! drawn from and an optional override message, and returns a [`Rule`].
//! Comparison rules accept either literal values or a [`Ref`] to other
//! fields of the same form.

use crate::result::RuleResult;
use crate::rule::Rule;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use formrule_locale::{
    Constraints, FileType, Locale, LocaleKey, Message, MessageArgs, bytes_to_size, create_message,
};
use formrule_value::{
    Condition, FieldValue, FormValues, Operator, Ref, compare, predicates,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{trace, warn};

static PATTERN_CACHE: LazyLock<DashMap<String, Option<Regex>>> = LazyLock::new(DashMap::new);

/// What a comparison rule compares the field value against
#[derive(Debug, Clone)]
pub enum Operand {
    /// Literal values
    Values(Vec<FieldValue>),

    /// Current values of other fields
    Ref(Ref),
}

impl From<Ref> for Operand {
    fn from(reference: Ref) -> Self {
        Operand::Ref(reference)
    }
}

impl From<FieldValue> for Operand {
    /// An array value is taken as a list of candidates
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Array(values) => Operand::Values(values),
            other => Operand::Values(vec![other]),
        }
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Operand::Values(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! operand_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Values(vec![FieldValue::from(value)])
                }
            }
        )*
    };
}

operand_from_scalar!(&str, String, bool, f64, i32, u32, i64, u64, usize, DateTime<Utc>);

fn failure(
    locale: &Locale,
    key: LocaleKey,
    message: Option<&Message>,
    value: &FieldValue,
    args: &MessageArgs,
) -> RuleResult {
    let message = message.unwrap_or_else(|| locale.get(key));
    RuleResult::from(create_message(message, value, args))
}

fn shape(
    check: fn(&FieldValue) -> bool,
    key: LocaleKey,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    let locale = Arc::clone(locale);
    Rule::from_fn(move |value: &FieldValue, _: &FormValues| {
        if check(value) {
            RuleResult::Valid
        } else {
            failure(&locale, key, message.as_ref(), value, &MessageArgs::default())
        }
    })
}

/// Value must be a string
pub fn string(locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    shape(predicates::is_string, LocaleKey::String, locale, message)
}

/// Value must be a finite number
pub fn number(locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    shape(predicates::is_number, LocaleKey::Number, locale, message)
}

/// Value must be an array
pub fn array(locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    shape(predicates::is_array, LocaleKey::Array, locale, message)
}

/// Value must be a boolean
pub fn boolean(locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    shape(predicates::is_boolean, LocaleKey::Boolean, locale, message)
}

/// Value must be an e-mail address
pub fn email(locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    shape(predicates::is_email, LocaleKey::Email, locale, message)
}

/// Value must be a dotted-quad IPv4 address
pub fn ip_address(locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    shape(predicates::is_ip_address, LocaleKey::IpAddress, locale, message)
}

/// Every file must be at most `size` bytes
///
/// `kilobyte_unit` only affects how the limit is printed in the message.
/// Values that are not file lists fail.
pub fn file_size(
    size: u64,
    kilobyte_unit: Option<u64>,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    let locale = Arc::clone(locale);
    let formatted_size = bytes_to_size(size, kilobyte_unit);

    Rule::from_fn(move |value: &FieldValue, _: &FormValues| {
        let passed = value
            .as_files()
            .is_some_and(|files| files.iter().all(|file| file.size <= size));

        if passed {
            return RuleResult::Valid;
        }

        let args = MessageArgs::with_constraints(Constraints::Size {
            size,
            formatted_size: formatted_size.clone(),
        });
        failure(&locale, LocaleKey::FileSize, message.as_ref(), value, &args)
    })
}

/// Every file must have an accepted MIME type
///
/// Values that are not file lists fail.
pub fn file_type(file_type: FileType, locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    let locale = Arc::clone(locale);

    Rule::from_fn(move |value: &FieldValue, _: &FormValues| {
        let passed = value
            .as_files()
            .is_some_and(|files| files.iter().all(|file| file_type.matches(&file.mime_type)));

        if passed {
            return RuleResult::Valid;
        }

        let args = MessageArgs::with_constraints(Constraints::Type(file_type.clone()));
        failure(&locale, LocaleKey::FileType, message.as_ref(), value, &args)
    })
}

#[derive(Debug, Clone, Copy)]
enum LengthCheck {
    Exact,
    Min,
    Max,
}

impl LengthCheck {
    fn accepts(self, len: usize, bound: usize) -> bool {
        match self {
            LengthCheck::Exact => len == bound,
            LengthCheck::Min => len >= bound,
            LengthCheck::Max => len <= bound,
        }
    }

    /// Message key for the failing value's shape
    fn locale_key(self, value: &FieldValue) -> LocaleKey {
        let array = predicates::is_array(value);
        let files = predicates::is_file_list(value);

        match self {
            LengthCheck::Exact if array => LocaleKey::LengthArray,
            LengthCheck::Exact if files => LocaleKey::LengthFile,
            LengthCheck::Exact => LocaleKey::LengthString,
            LengthCheck::Min if array => LocaleKey::MinLengthArray,
            LengthCheck::Min if files => LocaleKey::MinLengthFile,
            LengthCheck::Min => LocaleKey::MinLengthString,
            LengthCheck::Max if array => LocaleKey::MaxLengthArray,
            LengthCheck::Max if files => LocaleKey::MaxLengthFile,
            LengthCheck::Max => LocaleKey::MaxLengthString,
        }
    }
}

fn length_rule(
    check: LengthCheck,
    bound: usize,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    let locale = Arc::clone(locale);

    Rule::from_fn(move |value: &FieldValue, _: &FormValues| {
        let passed = predicates::countable_len(value).is_some_and(|len| check.accepts(len, bound));

        if passed {
            return RuleResult::Valid;
        }

        let args = MessageArgs::with_constraints(Constraints::Length(bound));
        failure(&locale, check.locale_key(value), message.as_ref(), value, &args)
    })
}

/// Text, list or file count must be exactly `length`
pub fn length(length: usize, locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    length_rule(LengthCheck::Exact, length, locale, message)
}

/// Text, list or file count must be at least `length`
pub fn min_length(length: usize, locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    length_rule(LengthCheck::Min, length, locale, message)
}

/// Text, list or file count must be at most `length`
pub fn max_length(length: usize, locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    length_rule(LengthCheck::Max, length, locale, message)
}

/// Shared body of the equality and ordering rules
///
/// Literal lists pass when any value is equal (`==`) or when every value
/// satisfies the operator (`!=` and orderings). References combine per
/// their condition, except `!=` which always requires every field to differ.
fn comparison(
    operand: Operand,
    operator: Operator,
    key: LocaleKey,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    let locale = Arc::clone(locale);

    Rule::from_fn(move |value: &FieldValue, form_values: &FormValues| {
        let check = |other: &FieldValue| compare(value, other, operator);

        let args = match &operand {
            Operand::Ref(reference) => {
                let resolved = reference.resolve(form_values);
                let condition = match operator {
                    Operator::Ne => Condition::All,
                    _ => reference.condition(),
                };

                if condition.combine(resolved.iter().map(check)) {
                    return RuleResult::Valid;
                }
                MessageArgs::with_reference(reference.clone(), resolved)
            }
            Operand::Values(values) => {
                let condition = match operator {
                    Operator::Eq => Condition::Any,
                    _ => Condition::All,
                };

                if condition.combine(values.iter().map(check)) {
                    return RuleResult::Valid;
                }
                MessageArgs::with_constraints(Constraints::Values(values.clone()))
            }
        };

        trace!("Comparison {} failed for {}", operator, value.type_name());
        failure(&locale, key, message.as_ref(), value, &args)
    })
}

/// Value must equal (`not == false`) or differ from (`not == true`) the operand
pub fn equal_to(
    operand: impl Into<Operand>,
    not: bool,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    if not {
        comparison(operand.into(), Operator::Ne, LocaleKey::Neq, locale, message)
    } else {
        comparison(operand.into(), Operator::Eq, LocaleKey::Eq, locale, message)
    }
}

/// Value must be less than (`strict`) or at most the operand
pub fn less_than(
    operand: impl Into<Operand>,
    strict: bool,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    if strict {
        comparison(operand.into(), Operator::Lt, LocaleKey::Lt, locale, message)
    } else {
        comparison(operand.into(), Operator::Le, LocaleKey::Lte, locale, message)
    }
}

/// Value must be greater than (`strict`) or at least the operand
pub fn greater_than(
    operand: impl Into<Operand>,
    strict: bool,
    locale: &Arc<Locale>,
    message: Option<Message>,
) -> Rule {
    if strict {
        comparison(operand.into(), Operator::Gt, LocaleKey::Gt, locale, message)
    } else {
        comparison(operand.into(), Operator::Ge, LocaleKey::Gte, locale, message)
    }
}

/// String value must match (or, with `not`, must not match) a regex
pub fn regexp(regexp: Regex, not: bool, locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    let locale = Arc::clone(locale);
    let key = if not {
        LocaleKey::RegexpNot
    } else {
        LocaleKey::Regexp
    };

    Rule::from_fn(move |value: &FieldValue, _: &FormValues| {
        let passed = value
            .as_str()
            .is_some_and(|text| regexp.is_match(text) != not);

        if passed {
            return RuleResult::Valid;
        }

        let args = MessageArgs::with_constraints(Constraints::Regexp(regexp.clone()));
        failure(&locale, key, message.as_ref(), value, &args)
    })
}

/// String value must match a digit template such as `###-####`
///
/// Each `#` stands for one ASCII digit; every other character is literal.
pub fn pattern(template: &str, locale: &Arc<Locale>, message: Option<Message>) -> Rule {
    let locale = Arc::clone(locale);
    let compiled = pattern_regex(template);
    let template = template.to_string();

    Rule::from_fn(move |value: &FieldValue, _: &FormValues| {
        let passed = match (&compiled, value.as_str()) {
            (Some(re), Some(text)) => re.is_match(text),
            _ => false,
        };

        if passed {
            return RuleResult::Valid;
        }

        let args = MessageArgs::with_constraints(Constraints::Pattern(template.clone()));
        failure(&locale, LocaleKey::Pattern, message.as_ref(), value, &args)
    })
}

/// Compiled, anchored regex for a digit template
///
/// Results are cached process-wide by template. A template that fails to
/// compile yields `None` and the rule using it never passes.
pub fn pattern_regex(template: &str) -> Option<Regex> {
    if let Some(cached) = PATTERN_CACHE.get(template) {
        trace!("Pattern cache hit: {}", template);
        return cached.value().clone();
    }

    let compiled = match Regex::new(&pattern_source(template)) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Pattern template {:?} did not compile: {}", template, e);
            None
        }
    };

    PATTERN_CACHE.insert(template.to_string(), compiled.clone());
    compiled
}

fn pattern_source(template: &str) -> String {
    fn flush(source: &mut String, literal: &mut String, digits: &mut usize) {
        if !literal.is_empty() {
            source.push_str(&regex::escape(literal));
            literal.clear();
        }
        if *digits > 0 {
            source.push_str(&format!("[0-9]{{{digits}}}"));
            *digits = 0;
        }
    }

    let mut source = String::from("^");
    let mut literal = String::new();
    let mut digits = 0;

    for ch in template.chars() {
        if ch == '#' {
            if !literal.is_empty() {
                flush(&mut source, &mut literal, &mut digits);
            }
            digits += 1;
        } else {
            if digits > 0 {
                flush(&mut source, &mut literal, &mut digits);
            }
            literal.push(ch);
        }
    }

    flush(&mut source, &mut literal, &mut digits);
    source.push('$');
    source
}
