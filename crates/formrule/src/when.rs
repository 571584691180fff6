//! Conditional rule sets

use crate::pipeline::Validate;
use crate::result::ValidationResult;
use crate::validator::Validator;
use crate::{Error, Result};
use formrule_value::{FieldValue, FormValues, Ref};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Builds the rule set of one branch on a fresh validator
pub type BranchFn = Arc<dyn Fn(Validator) -> Validator + Send + Sync>;

/// Custom branch condition: `(resolved reference values, field value, form)`
pub type CheckFn = Arc<dyn Fn(&[FieldValue], &FieldValue, &FormValues) -> bool + Send + Sync>;

/// How the referenced values select a branch
#[derive(Clone)]
pub enum Is {
    /// Resolved values must equal this literal, combined per the
    /// reference's condition
    Value(FieldValue),

    /// Custom predicate
    Check(CheckFn),
}

impl fmt::Debug for Is {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Is::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Is::Check(_) => f.write_str("Check(<fn>)"),
        }
    }
}

/// Options for [`when`]
#[derive(Clone)]
pub struct WhenOptions {
    is: Is,
    then: Option<BranchFn>,
    otherwise: Option<BranchFn>,
}

impl WhenOptions {
    /// Take the `then` branch when the referenced values equal `value`
    pub fn is(value: impl Into<FieldValue>) -> Self {
        Self {
            is: Is::Value(value.into()),
            then: None,
            otherwise: None,
        }
    }

    /// Take the `then` branch when `check` returns `true`
    pub fn is_fn(
        check: impl Fn(&[FieldValue], &FieldValue, &FormValues) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            is: Is::Check(Arc::new(check)),
            then: None,
            otherwise: None,
        }
    }

    /// Rules applied when the condition holds
    #[must_use]
    pub fn then(mut self, branch: impl Fn(Validator) -> Validator + Send + Sync + 'static) -> Self {
        self.then = Some(Arc::new(branch));
        self
    }

    /// Rules applied when the condition does not hold
    #[must_use]
    pub fn otherwise(
        mut self,
        branch: impl Fn(Validator) -> Validator + Send + Sync + 'static,
    ) -> Self {
        self.otherwise = Some(Arc::new(branch));
        self
    }
}

impl fmt::Debug for WhenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhenOptions")
            .field("is", &self.is)
            .field("then", &self.then.is_some())
            .field("otherwise", &self.otherwise.is_some())
            .finish()
    }
}

pub(crate) struct When {
    base: Validator,
    reference: Ref,
    options: WhenOptions,
}

/// Build a pipeline that picks a rule set from the values of other fields
///
/// On every evaluation the reference is resolved and checked against
/// `options`; the chosen branch builds its rules on an empty validator that
/// shares `base`'s locale and custom rules. A missing branch passes.
///
/// # Errors
///
/// Returns [`Error::MissingBranch`] when neither `then` nor `otherwise` is set.
///
/// # Example
///
/// ```rust
/// use formrule::{FieldValue, FormValues, Ref, Validator, WhenOptions, when};
/// use serde_json::json;
///
/// let validate = when(
///     &Validator::new(),
///     Ref::field("contact"),
///     WhenOptions::is("email").then(|v| v.required().email()),
/// )
/// .unwrap();
///
/// let form = FormValues::from(json!({ "contact": "email" }));
/// assert!(!validate.validate_blocking(&FieldValue::from("nope"), &form).is_valid());
///
/// let form = FormValues::from(json!({ "contact": "phone" }));
/// assert!(validate.validate_blocking(&FieldValue::from("nope"), &form).is_valid());
/// ```
pub fn when(base: &Validator, reference: Ref, options: WhenOptions) -> Result<Validate> {
    if options.then.is_none() && options.otherwise.is_none() {
        return Err(Error::MissingBranch);
    }

    Ok(Validate::from_when(When {
        base: base.clone_empty(),
        reference,
        options,
    }))
}

/// Equality used for literal conditions: numbers follow IEEE rules, so NaN
/// never matches
fn strict_eq(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
        _ => a == b,
    }
}

impl When {
    fn matches(&self, value: &FieldValue, form_values: &FormValues) -> bool {
        let resolved = self.reference.resolve(form_values);

        match &self.options.is {
            Is::Value(expected) => self
                .reference
                .condition()
                .combine(resolved.iter().map(|other| strict_eq(other, expected))),
            Is::Check(check) => check(&resolved, value, form_values),
        }
    }

    pub(crate) async fn run(&self, value: &FieldValue, form_values: &FormValues) -> ValidationResult {
        let matched = self.matches(value, form_values);
        trace!("Condition on {} evaluated to {}", self.reference, matched);

        let branch = if matched {
            self.options.then.as_ref()
        } else {
            self.options.otherwise.as_ref()
        };

        let Some(branch) = branch else {
            return ValidationResult::Valid;
        };

        let validate = branch(self.base.clone_empty()).compile();
        validate.validate(value, form_values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> FormValues {
        FormValues::from(value)
    }

    #[test]
    fn test_missing_branch_is_rejected() {
        let result = when(&Validator::new(), Ref::field("a"), WhenOptions::is(1));
        assert!(matches!(result, Err(Error::MissingBranch)));
    }

    #[tokio::test]
    async fn test_literal_condition_with_all() {
        let validate = when(
            &Validator::new(),
            Ref::fields(["a", "b"]).unwrap(),
            WhenOptions::is(1).then(|v| v.gt(10)),
        )
        .unwrap();

        let value = FieldValue::from(5);
        let both = form(json!({ "a": 1, "b": 1 }));
        let one = form(json!({ "a": 1, "b": 2 }));

        assert!(!validate.validate(&value, &both).await.is_valid());
        assert!(validate.validate(&value, &one).await.is_valid());
    }

    #[tokio::test]
    async fn test_literal_condition_with_any() {
        let validate = when(
            &Validator::new(),
            Ref::fields(["a", "b"]).unwrap().any(),
            WhenOptions::is(1).then(|v| v.gt(10)),
        )
        .unwrap();

        let one = form(json!({ "a": 1, "b": 2 }));
        let none = form(json!({ "a": 3, "b": 2 }));

        assert!(!validate.validate(&FieldValue::from(5), &one).await.is_valid());
        assert!(validate.validate(&FieldValue::from(5), &none).await.is_valid());
    }

    #[tokio::test]
    async fn test_otherwise_branch() {
        let validate = when(
            &Validator::new(),
            Ref::field("kind"),
            WhenOptions::is("number")
                .then(|v| v.number())
                .otherwise(|v| v.string()),
        )
        .unwrap();

        let numeric = form(json!({ "kind": "number" }));
        let text = form(json!({ "kind": "text" }));

        assert!(validate.validate(&FieldValue::from(1), &numeric).await.is_valid());
        assert_eq!(
            validate.validate(&FieldValue::from(1), &text).await,
            ValidationResult::Error("The value must be a string.".into())
        );
    }

    #[tokio::test]
    async fn test_custom_check_receives_resolved_values() {
        let validate = when(
            &Validator::new(),
            Ref::fields(["min", "max"]).unwrap(),
            WhenOptions::is_fn(|resolved, value, _| {
                resolved.len() == 2 && value.as_f64().is_some_and(|n| n > 0.0)
            })
            .then(|v| v.required_with("checked")),
        )
        .unwrap();

        let empty = form(json!({}));
        assert!(validate.validate(&FieldValue::from(-1), &empty).await.is_valid());
    }

    #[tokio::test]
    async fn test_branch_required_applies_to_empty_values() {
        let validate = when(
            &Validator::new(),
            Ref::field("agree"),
            WhenOptions::is(true).then(|v| v.required()),
        )
        .unwrap();

        assert_eq!(
            validate
                .validate(&FieldValue::from(""), &form(json!({ "agree": true })))
                .await,
            ValidationResult::Error("This field is required.".into())
        );
        assert!(validate
            .validate(&FieldValue::from(""), &form(json!({ "agree": false })))
            .await
            .is_valid());
    }

    #[test]
    fn test_strict_eq_on_nan() {
        assert!(!strict_eq(&FieldValue::Number(f64::NAN), &FieldValue::Number(f64::NAN)));
        assert!(strict_eq(&FieldValue::from("a"), &FieldValue::from("a")));
    }
}
