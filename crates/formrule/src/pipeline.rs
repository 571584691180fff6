//! Compiled validation pipelines

use crate::result::{RuleResult, ValidationResult};
use crate::rule::Rule;
use crate::when::When;
use formrule_locale::{Locale, LocaleKey, Message, MessageArgs};
use formrule_value::{FieldValue, FormValues, predicates};
use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A compiled validator for one field
///
/// Cheap to clone; clones share the same frozen rule set. Evaluations do not
/// share any mutable state, so one pipeline can serve overlapping calls.
#[derive(Clone)]
pub struct Validate {
    inner: Arc<Pipeline>,
}

enum Pipeline {
    Rules(CompiledRules),
    When(When),
}

struct CompiledRules {
    rules: Arc<IndexMap<String, Rule>>,
    required: bool,
    required_message: Option<Message>,
    locale: Arc<Locale>,
}

impl Validate {
    pub(crate) fn from_rules(
        rules: Arc<IndexMap<String, Rule>>,
        required: bool,
        required_message: Option<Message>,
        locale: Arc<Locale>,
    ) -> Self {
        Self {
            inner: Arc::new(Pipeline::Rules(CompiledRules {
                rules,
                required,
                required_message,
                locale,
            })),
        }
    }

    pub(crate) fn from_when(when: When) -> Self {
        Self {
            inner: Arc::new(Pipeline::When(when)),
        }
    }

    /// Validate a field value against the current form values
    pub fn validate<'a>(
        &'a self,
        value: &'a FieldValue,
        form_values: &'a FormValues,
    ) -> BoxFuture<'a, ValidationResult> {
        match &*self.inner {
            Pipeline::Rules(rules) => rules.run(value, form_values).boxed(),
            Pipeline::When(when) => when.run(value, form_values).boxed(),
        }
    }

    pub(crate) fn is_conditional(&self) -> bool {
        matches!(&*self.inner, Pipeline::When(_))
    }

    /// Validate on the current thread, blocking until every rule has finished
    ///
    /// Asynchronous rules that need a specific runtime (timers, I/O) must be
    /// awaited through [`Validate::validate`] inside that runtime instead.
    #[must_use]
    pub fn validate_blocking(
        &self,
        value: &FieldValue,
        form_values: &FormValues,
    ) -> ValidationResult {
        futures::executor::block_on(self.validate(value, form_values))
    }
}

impl CompiledRules {
    async fn run(&self, value: &FieldValue, form_values: &FormValues) -> ValidationResult {
        if predicates::is_empty(value) {
            if self.required {
                trace!("Empty value on a required field");
                let message = self
                    .required_message
                    .as_ref()
                    .unwrap_or_else(|| self.locale.get(LocaleKey::Required));
                return ValidationResult::Error(
                    message.resolve(value, &MessageArgs::default()),
                );
            }

            // Conditional sets run even here, their branches may require the field.
            trace!("Empty value on an optional field, running conditional rules only");
            for (name, rule) in self.rules.iter().filter(|(_, rule)| rule.is_conditional()) {
                if let Some(failure) = failure(name, rule.evaluate(value, form_values).await) {
                    return failure;
                }
            }
            return ValidationResult::Valid;
        }

        for (name, rule) in self.rules.iter() {
            if let Some(failure) = failure(name, rule.evaluate(value, form_values).await) {
                return failure;
            }
        }

        ValidationResult::Valid
    }
}

fn failure(name: &str, result: RuleResult) -> Option<ValidationResult> {
    match result {
        RuleResult::Valid => None,
        RuleResult::Invalid => {
            debug!("Rule {} failed without a message", name);
            Some(ValidationResult::Error(name.to_string()))
        }
        RuleResult::Message(message) => {
            debug!("Rule {} failed", name);
            Some(ValidationResult::Error(message))
        }
        RuleResult::Messages(messages) => {
            debug!("Rule {} failed with {} message(s)", name, messages.len());
            Some(ValidationResult::Errors(messages))
        }
    }
}

impl fmt::Debug for Validate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner {
            Pipeline::Rules(rules) => f
                .debug_struct("Validate")
                .field("rules", &rules.rules.keys().collect::<Vec<_>>())
                .field("required", &rules.required)
                .finish_non_exhaustive(),
            Pipeline::When(_) => f.write_str("Validate(<when>)"),
        }
    }
}
