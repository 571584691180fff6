//! Cross-field references

use crate::form::FormValues;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How the results for several referenced fields are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Every referenced field must satisfy the check
    #[default]
    All,

    /// At least one referenced field must satisfy the check
    Any,
}

impl Condition {
    /// Combine per-field outcomes according to this condition
    pub fn combine<I: IntoIterator<Item = bool>>(self, outcomes: I) -> bool {
        let mut outcomes = outcomes.into_iter();
        match self {
            Condition::All => outcomes.all(|ok| ok),
            Condition::Any => outcomes.any(|ok| ok),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All => f.write_str("all"),
            Condition::Any => f.write_str("any"),
        }
    }
}

impl FromStr for Condition {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "all" | "and" => Ok(Condition::All),
            "any" | "or" => Ok(Condition::Any),
            other => Err(crate::Error::UnknownCondition(other.to_string())),
        }
    }
}

/// A pointer to one or more other fields of the same form
///
/// The path list is fixed at construction and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    paths: Arc<[String]>,
    condition: Condition,
}

impl Ref {
    /// Reference a single field
    pub fn field(path: impl Into<String>) -> Self {
        Self {
            paths: Arc::from(vec![path.into()]),
            condition: Condition::All,
        }
    }

    /// Reference several fields, combined with [`Condition::All`] by default
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EmptyReference`] when no path is given.
    pub fn fields<I, S>(paths: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(crate::Error::EmptyReference);
        }

        Ok(Self {
            paths: Arc::from(paths),
            condition: Condition::All,
        })
    }

    /// Use the given combination condition
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Require at least one referenced field to match
    #[must_use]
    pub fn any(self) -> Self {
        self.with_condition(Condition::Any)
    }

    /// Require every referenced field to match
    #[must_use]
    pub fn all(self) -> Self {
        self.with_condition(Condition::All)
    }

    /// Referenced paths, in declaration order
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Read the current value of every referenced path
    ///
    /// One value per path, in path order; missing paths become `Undefined`.
    #[must_use]
    pub fn resolve(&self, form_values: &FormValues) -> Vec<FieldValue> {
        self.paths
            .iter()
            .map(|path| form_values.resolve(path))
            .collect()
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.condition, self.paths.join(", "))
    }
}
