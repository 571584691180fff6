//! Rule predicates

use crate::pipeline::Validate;
use crate::result::RuleResult;
use formrule_value::{FieldValue, FormValues};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Synchronous rule body
pub type SyncRuleFn = Arc<dyn Fn(&FieldValue, &FormValues) -> RuleResult + Send + Sync>;

/// Asynchronous rule body; the returned future owns what it needs
pub type AsyncRuleFn =
    Arc<dyn Fn(&FieldValue, &FormValues) -> BoxFuture<'static, RuleResult> + Send + Sync>;

/// One predicate over a field value and its form
#[derive(Clone)]
pub enum Rule {
    Sync(SyncRuleFn),
    Async(AsyncRuleFn),

    /// A compiled pipeline used as a single rule
    Nested(Validate),
}

impl Rule {
    /// Wrap a synchronous predicate
    ///
    /// The predicate can return anything convertible to a [`RuleResult`]:
    /// `bool`, a message, a message list or an optional message.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> R + Send + Sync + 'static,
        R: Into<RuleResult>,
    {
        Rule::Sync(Arc::new(move |value: &FieldValue, form_values: &FormValues| {
            f(value, form_values).into()
        }))
    }

    /// Wrap an asynchronous predicate
    ///
    /// The predicate receives owned copies of the value and the form so the
    /// future it returns is free of borrows.
    pub fn from_async<F, Fut, R>(f: F) -> Self
    where
        F: Fn(FieldValue, FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<RuleResult>,
    {
        Rule::Async(Arc::new(move |value: &FieldValue, form_values: &FormValues| {
            let pending = f(value.clone(), form_values.clone());
            async move { pending.await.into() }.boxed()
        }))
    }

    /// Run the rule, waiting for it if it is asynchronous
    pub async fn evaluate(&self, value: &FieldValue, form_values: &FormValues) -> RuleResult {
        match self {
            Rule::Sync(f) => f(value, form_values),
            Rule::Async(f) => f(value, form_values).await,
            Rule::Nested(validate) => validate.validate(value, form_values).await.into(),
        }
    }

    /// Whether this rule is a conditional set built by [`crate::when`]
    pub(crate) fn is_conditional(&self) -> bool {
        matches!(self, Rule::Nested(validate) if validate.is_conditional())
    }
}

impl From<Validate> for Rule {
    fn from(validate: Validate) -> Self {
        Rule::Nested(validate)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Sync(_) => f.write_str("Rule::Sync(<fn>)"),
            Rule::Async(_) => f.write_str("Rule::Async(<fn>)"),
            Rule::Nested(_) => f.write_str("Rule::Nested(<pipeline>)"),
        }
    }
}
