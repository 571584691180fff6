//! Rule registry builder

use crate::config::CustomRules;
use crate::pipeline::Validate;
use crate::result::RuleResult;
use crate::rule::Rule;
use crate::rules::{self, Operand};
use crate::when::{WhenOptions, when};
use crate::{Error, Result};
use formrule_locale::{FileType, Locale, Message};
use formrule_value::{FieldValue, FormValues, Ref};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

/// Accumulates the rules of one field and compiles them into a [`Validate`]
///
/// Rules run in registration order. Each rule gets a generated name; kinds
/// that can appear several times (comparisons, regexes, patterns, custom
/// rules) get a sequence number appended so every registration is kept,
/// while registering a single-use kind (type checks, length and file rules)
/// a second time is ignored.
///
/// # Example
///
/// ```rust
/// use formrule::{FieldValue, FormValues, ValidationResult, Validator};
///
/// let validate = Validator::new().string().min_length(3).compile();
/// let form = FormValues::new();
///
/// assert!(validate.validate_blocking(&FieldValue::from("abc"), &form).is_valid());
/// assert_eq!(
///     validate.validate_blocking(&FieldValue::from("ab"), &form),
///     ValidationResult::Error("At least 3 characters must be entered.".into())
/// );
/// ```
pub struct Validator {
    rules: IndexMap<String, Rule>,
    last_rule_id: usize,
    required: bool,
    required_message: Option<Message>,
    locale: Arc<Locale>,
    custom: Arc<CustomRules>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator with the default English locale and no custom rules
    #[must_use]
    pub fn new() -> Self {
        Self::with_locale(Arc::new(Locale::default()))
    }

    /// Validator drawing its messages from the given locale
    #[must_use]
    pub fn with_locale(locale: Arc<Locale>) -> Self {
        Self::from_parts(locale, Arc::new(CustomRules::new()))
    }

    pub(crate) fn from_parts(locale: Arc<Locale>, custom: Arc<CustomRules>) -> Self {
        Self {
            rules: IndexMap::new(),
            last_rule_id: 0,
            required: false,
            required_message: None,
            locale,
            custom,
        }
    }

    /// A new, empty validator sharing this one's locale and custom rules
    #[must_use]
    pub fn clone_empty(&self) -> Self {
        Self::from_parts(Arc::clone(&self.locale), Arc::clone(&self.custom))
    }

    #[must_use]
    pub fn locale(&self) -> &Arc<Locale> {
        &self.locale
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Generated rule names, in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Mark the field as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.required_message = None;
        self
    }

    /// Mark the field as required, with an override message
    #[must_use]
    pub fn required_with(mut self, message: impl Into<Message>) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    /// Add a rule under a name derived from `kind`
    ///
    /// A name that is already registered keeps its first rule.
    #[must_use]
    pub fn register(mut self, kind: &str, rule: Rule, repeatable: bool) -> Self {
        let name = self.rule_name(kind, repeatable);

        if self.rules.contains_key(&name) {
            debug!("Rule {} already registered, keeping the first one", name);
            return self;
        }

        trace!("Registering rule {}", name);
        self.rules.insert(name, rule);
        self
    }

    fn rule_name(&mut self, kind: &str, repeatable: bool) -> String {
        if repeatable {
            self.last_rule_id += 1;
            format!("rule.{kind}{}", self.last_rule_id)
        } else {
            format!("rule.{kind}")
        }
    }

    /// Freeze the current rules and required flag into a pipeline
    ///
    /// Later changes to this builder do not affect the returned pipeline.
    #[must_use]
    pub fn compile(&self) -> Validate {
        debug!(
            "Compiling {} rule(s), required: {}",
            self.rules.len(),
            self.required
        );
        Validate::from_rules(
            Arc::new(self.rules.clone()),
            self.required,
            self.required_message.clone(),
            Arc::clone(&self.locale),
        )
    }

    /// Value must be a string
    #[must_use]
    pub fn string(self) -> Self {
        let rule = rules::string(&self.locale, None);
        self.register("string", rule, false)
    }

    #[must_use]
    pub fn string_with(self, message: impl Into<Message>) -> Self {
        let rule = rules::string(&self.locale, Some(message.into()));
        self.register("string", rule, false)
    }

    /// Value must be a finite number
    #[must_use]
    pub fn number(self) -> Self {
        let rule = rules::number(&self.locale, None);
        self.register("number", rule, false)
    }

    #[must_use]
    pub fn number_with(self, message: impl Into<Message>) -> Self {
        let rule = rules::number(&self.locale, Some(message.into()));
        self.register("number", rule, false)
    }

    /// Value must be an array
    #[must_use]
    pub fn array(self) -> Self {
        let rule = rules::array(&self.locale, None);
        self.register("array", rule, false)
    }

    #[must_use]
    pub fn array_with(self, message: impl Into<Message>) -> Self {
        let rule = rules::array(&self.locale, Some(message.into()));
        self.register("array", rule, false)
    }

    /// Value must be a boolean
    #[must_use]
    pub fn boolean(self) -> Self {
        let rule = rules::boolean(&self.locale, None);
        self.register("boolean", rule, false)
    }

    #[must_use]
    pub fn boolean_with(self, message: impl Into<Message>) -> Self {
        let rule = rules::boolean(&self.locale, Some(message.into()));
        self.register("boolean", rule, false)
    }

    /// Value must be an e-mail address
    #[must_use]
    pub fn email(self) -> Self {
        let rule = rules::email(&self.locale, None);
        self.register("email", rule, false)
    }

    #[must_use]
    pub fn email_with(self, message: impl Into<Message>) -> Self {
        let rule = rules::email(&self.locale, Some(message.into()));
        self.register("email", rule, false)
    }

    /// Value must be an IPv4 address
    #[must_use]
    pub fn ip(self) -> Self {
        let rule = rules::ip_address(&self.locale, None);
        self.register("ip", rule, false)
    }

    #[must_use]
    pub fn ip_with(self, message: impl Into<Message>) -> Self {
        let rule = rules::ip_address(&self.locale, Some(message.into()));
        self.register("ip", rule, false)
    }

    /// Every uploaded file must be at most `size` bytes
    #[must_use]
    pub fn file_size(self, size: u64) -> Self {
        let rule = rules::file_size(size, None, &self.locale, None);
        self.register("fileSize", rule, false)
    }

    #[must_use]
    pub fn file_size_with(self, size: u64, message: impl Into<Message>) -> Self {
        let rule = rules::file_size(size, None, &self.locale, Some(message.into()));
        self.register("fileSize", rule, false)
    }

    /// Like [`Validator::file_size`], printing the limit with the given
    /// kilobyte unit (e.g. 1024)
    #[must_use]
    pub fn file_size_unit(self, size: u64, kilobyte_unit: u64) -> Self {
        let rule = rules::file_size(size, Some(kilobyte_unit), &self.locale, None);
        self.register("fileSize", rule, false)
    }

    #[must_use]
    pub fn file_size_unit_with(
        self,
        size: u64,
        kilobyte_unit: u64,
        message: impl Into<Message>,
    ) -> Self {
        let rule = rules::file_size(size, Some(kilobyte_unit), &self.locale, Some(message.into()));
        self.register("fileSize", rule, false)
    }

    /// Every uploaded file must have an accepted MIME type
    #[must_use]
    pub fn file_type(self, file_type: impl Into<FileType>) -> Self {
        let rule = rules::file_type(file_type.into(), &self.locale, None);
        self.register("fileType", rule, false)
    }

    #[must_use]
    pub fn file_type_with(self, file_type: impl Into<FileType>, message: impl Into<Message>) -> Self {
        let rule = rules::file_type(file_type.into(), &self.locale, Some(message.into()));
        self.register("fileType", rule, false)
    }

    /// Text length, item count or file count must be exactly `length`
    #[must_use]
    pub fn length(self, length: usize) -> Self {
        let rule = rules::length(length, &self.locale, None);
        self.register("length", rule, false)
    }

    #[must_use]
    pub fn length_with(self, length: usize, message: impl Into<Message>) -> Self {
        let rule = rules::length(length, &self.locale, Some(message.into()));
        self.register("length", rule, false)
    }

    #[must_use]
    pub fn min_length(self, length: usize) -> Self {
        let rule = rules::min_length(length, &self.locale, None);
        self.register("minLength", rule, false)
    }

    #[must_use]
    pub fn min_length_with(self, length: usize, message: impl Into<Message>) -> Self {
        let rule = rules::min_length(length, &self.locale, Some(message.into()));
        self.register("minLength", rule, false)
    }

    #[must_use]
    pub fn max_length(self, length: usize) -> Self {
        let rule = rules::max_length(length, &self.locale, None);
        self.register("maxLength", rule, false)
    }

    #[must_use]
    pub fn max_length_with(self, length: usize, message: impl Into<Message>) -> Self {
        let rule = rules::max_length(length, &self.locale, Some(message.into()));
        self.register("maxLength", rule, false)
    }

    /// Value must equal one of the literals, or the referenced fields
    #[must_use]
    pub fn eq(self, operand: impl Into<Operand>) -> Self {
        let rule = rules::equal_to(operand, false, &self.locale, None);
        self.register("eq", rule, true)
    }

    #[must_use]
    pub fn eq_with(self, operand: impl Into<Operand>, message: impl Into<Message>) -> Self {
        let rule = rules::equal_to(operand, false, &self.locale, Some(message.into()));
        self.register("eq", rule, true)
    }

    /// Value must differ from every literal, or every referenced field
    #[must_use]
    pub fn neq(self, operand: impl Into<Operand>) -> Self {
        let rule = rules::equal_to(operand, true, &self.locale, None);
        self.register("neq", rule, true)
    }

    #[must_use]
    pub fn neq_with(self, operand: impl Into<Operand>, message: impl Into<Message>) -> Self {
        let rule = rules::equal_to(operand, true, &self.locale, Some(message.into()));
        self.register("neq", rule, true)
    }

    #[must_use]
    pub fn lt(self, operand: impl Into<Operand>) -> Self {
        let rule = rules::less_than(operand, true, &self.locale, None);
        self.register("lt", rule, true)
    }

    #[must_use]
    pub fn lt_with(self, operand: impl Into<Operand>, message: impl Into<Message>) -> Self {
        let rule = rules::less_than(operand, true, &self.locale, Some(message.into()));
        self.register("lt", rule, true)
    }

    #[must_use]
    pub fn lte(self, operand: impl Into<Operand>) -> Self {
        let rule = rules::less_than(operand, false, &self.locale, None);
        self.register("lte", rule, true)
    }

    #[must_use]
    pub fn lte_with(self, operand: impl Into<Operand>, message: impl Into<Message>) -> Self {
        let rule = rules::less_than(operand, false, &self.locale, Some(message.into()));
        self.register("lte", rule, true)
    }

    #[must_use]
    pub fn gt(self, operand: impl Into<Operand>) -> Self {
        let rule = rules::greater_than(operand, true, &self.locale, None);
        self.register("gt", rule, true)
    }

    #[must_use]
    pub fn gt_with(self, operand: impl Into<Operand>, message: impl Into<Message>) -> Self {
        let rule = rules::greater_than(operand, true, &self.locale, Some(message.into()));
        self.register("gt", rule, true)
    }

    #[must_use]
    pub fn gte(self, operand: impl Into<Operand>) -> Self {
        let rule = rules::greater_than(operand, false, &self.locale, None);
        self.register("gte", rule, true)
    }

    #[must_use]
    pub fn gte_with(self, operand: impl Into<Operand>, message: impl Into<Message>) -> Self {
        let rule = rules::greater_than(operand, false, &self.locale, Some(message.into()));
        self.register("gte", rule, true)
    }

    /// String value must match the regex
    #[must_use]
    pub fn regexp(self, regexp: Regex) -> Self {
        let rule = rules::regexp(regexp, false, &self.locale, None);
        self.register("regexp", rule, true)
    }

    #[must_use]
    pub fn regexp_with(self, regexp: Regex, message: impl Into<Message>) -> Self {
        let rule = rules::regexp(regexp, false, &self.locale, Some(message.into()));
        self.register("regexp", rule, true)
    }

    /// String value must not match the regex
    #[must_use]
    pub fn not_regexp(self, regexp: Regex) -> Self {
        let rule = rules::regexp(regexp, true, &self.locale, None);
        self.register("notRegexp", rule, true)
    }

    #[must_use]
    pub fn not_regexp_with(self, regexp: Regex, message: impl Into<Message>) -> Self {
        let rule = rules::regexp(regexp, true, &self.locale, Some(message.into()));
        self.register("notRegexp", rule, true)
    }

    /// String value must match a digit template; `#` stands for one digit
    #[must_use]
    pub fn pattern(self, template: &str) -> Self {
        let rule = rules::pattern(template, &self.locale, None);
        self.register("pattern", rule, true)
    }

    #[must_use]
    pub fn pattern_with(self, template: &str, message: impl Into<Message>) -> Self {
        let rule = rules::pattern(template, &self.locale, Some(message.into()));
        self.register("pattern", rule, true)
    }

    /// Custom synchronous predicate
    ///
    /// Returning `false` or an empty message fails with the rule's generated
    /// name.
    #[must_use]
    pub fn by<F, R>(self, predicate: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> R + Send + Sync + 'static,
        R: Into<RuleResult>,
    {
        self.register("by", Rule::from_fn(predicate), true)
    }

    /// Custom asynchronous predicate
    #[must_use]
    pub fn by_async<F, Fut, R>(self, predicate: F) -> Self
    where
        F: Fn(FieldValue, FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<RuleResult>,
    {
        self.register("by", Rule::from_async(predicate), true)
    }

    /// Run an already compiled pipeline as one rule
    #[must_use]
    pub fn by_validate(self, validate: Validate) -> Self {
        self.register("by", Rule::from(validate), true)
    }

    /// Add a conditional rule set, see [`when`]
    ///
    /// Unlike other rules it also runs on empty values, so a branch calling
    /// `required()` applies even when this validator is optional.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBranch`] when neither branch is set.
    pub fn when(self, reference: Ref, options: WhenOptions) -> Result<Self> {
        let validate = when(&self, reference, options)?;
        Ok(self.register("when", Rule::from(validate), true))
    }

    /// Add a rule from the custom rule table
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRule`] when no rule is registered under `name`.
    pub fn custom(self, name: &str, args: &[FieldValue]) -> Result<Self> {
        let factory = self
            .custom
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRule(name.to_string()))?;

        let rule = factory(args);
        Ok(self.register(name, rule, true))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("required", &self.required)
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
