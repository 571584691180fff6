#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # formrule
//!
//! Composable validation rules for form fields.
//!
//! A [`Validator`] accumulates named rules in registration order and compiles
//! them into a [`Validate`] pipeline. The pipeline checks the required flag,
//! then runs every rule in order (synchronous and asynchronous rules alike)
//! and stops at the first failure. Rules can compare a field against other
//! fields of the same form through a [`Ref`], and [`when`] switches between
//! rule sets depending on the values of referenced fields.
//!
//! ## Example Usage
//!
//! ```rust
//! use formrule::{FieldValue, FormValues, Ref, ValidationResult, Validator};
//! use serde_json::json;
//!
//! let validate = Validator::new()
//!     .required()
//!     .number()
//!     .gt(Ref::field("min"))
//!     .compile();
//!
//! let form = FormValues::from(json!({ "min": 10, "value": 12 }));
//! let result = validate.validate_blocking(&form.resolve("value"), &form);
//! assert_eq!(result, ValidationResult::Valid);
//!
//! let result = validate.validate_blocking(&FieldValue::from(5), &form);
//! assert_eq!(
//!     result,
//!     ValidationResult::Error("The value must be greater than the field named min.".into())
//! );
//! ```

/// Process-wide configuration: locale store and custom rule table.
pub mod config;
/// Compiled validation pipelines.
pub mod pipeline;
/// Rule results and validation results.
pub mod result;
/// Rule predicates.
pub mod rule;
/// Built-in rule factories.
pub mod rules;
/// The rule registry builder.
pub mod validator;
/// Conditional rule sets.
pub mod when;

pub use config::{Config, CustomRuleFn};
pub use pipeline::Validate;
pub use result::{RuleResult, ValidationResult};
pub use rule::Rule;
pub use rules::Operand;
pub use validator::Validator;
pub use when::{Is, WhenOptions, when};

pub use formrule_locale::{
    Constraints, FileType, Locale, LocaleKey, Message, MessageArgs, PartialLocale,
};
pub use formrule_value::{Condition, FieldValue, FileEntry, FileList, FormValues, Ref};

use thiserror::Error;

/// Errors that can occur while configuring validators
///
/// Validation failures are never errors; they are reported through
/// [`ValidationResult`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Either `then` or `otherwise` is required for a conditional rule")]
    MissingBranch,

    #[error("Unknown custom rule: {0}")]
    UnknownRule(String),

    #[error("Locale error: {0}")]
    Locale(#[from] formrule_locale::Error),

    #[error("Value error: {0}")]
    Value(#[from] formrule_value::Error),
}

/// Crate-local result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Create a validator bound to the process-wide configuration
#[must_use]
pub fn validator() -> Validator {
    Config::global().validator()
}
