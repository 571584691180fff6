//! Rule and validation results

/// What a single rule reports for one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleResult {
    /// The value satisfies the rule
    Valid,

    /// The value fails the rule without a message
    ///
    /// The pipeline reports the rule's generated name instead.
    Invalid,

    /// The value fails with a message
    Message(String),

    /// The value fails with several messages
    Messages(Vec<String>),
}

impl RuleResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, RuleResult::Valid)
    }
}

impl From<bool> for RuleResult {
    fn from(valid: bool) -> Self {
        if valid {
            RuleResult::Valid
        } else {
            RuleResult::Invalid
        }
    }
}

impl From<String> for RuleResult {
    fn from(message: String) -> Self {
        if message.is_empty() {
            RuleResult::Invalid
        } else {
            RuleResult::Message(message)
        }
    }
}

impl From<&str> for RuleResult {
    fn from(message: &str) -> Self {
        RuleResult::from(message.to_string())
    }
}

impl From<Vec<String>> for RuleResult {
    fn from(messages: Vec<String>) -> Self {
        RuleResult::Messages(messages)
    }
}

impl From<Option<String>> for RuleResult {
    fn from(message: Option<String>) -> Self {
        message.map_or(RuleResult::Invalid, RuleResult::from)
    }
}

impl From<ValidationResult> for RuleResult {
    fn from(result: ValidationResult) -> Self {
        match result {
            ValidationResult::Valid => RuleResult::Valid,
            ValidationResult::Error(message) => RuleResult::from(message),
            ValidationResult::Errors(messages) => RuleResult::Messages(messages),
        }
    }
}

/// What a compiled pipeline reports for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every check passed
    Valid,

    /// The first failing rule's message, or its name if it gave none
    Error(String),

    /// The first failing rule's message list
    Errors(Vec<String>),
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// First error text, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Error(message) => Some(message),
            ValidationResult::Errors(messages) => messages.first().map(String::as_str),
        }
    }

    /// All error texts
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        match self {
            ValidationResult::Valid => Vec::new(),
            ValidationResult::Error(message) => vec![message.as_str()],
            ValidationResult::Errors(messages) => messages.iter().map(String::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_results_are_invalid() {
        assert_eq!(RuleResult::from(false), RuleResult::Invalid);
        assert_eq!(RuleResult::from(""), RuleResult::Invalid);
        assert_eq!(RuleResult::from(None::<String>), RuleResult::Invalid);
        assert_eq!(RuleResult::from(true), RuleResult::Valid);
    }

    #[test]
    fn test_messages_are_kept() {
        assert_eq!(RuleResult::from("bad"), RuleResult::Message("bad".into()));
        assert_eq!(
            RuleResult::from(vec!["a".to_string(), "b".to_string()]),
            RuleResult::Messages(vec!["a".into(), "b".into()])
        );
        assert!(!RuleResult::from(Vec::<String>::new()).is_valid());
    }

    #[test]
    fn test_validation_result_accessors() {
        let errors = ValidationResult::Errors(vec!["a".into(), "b".into()]);
        assert_eq!(errors.error(), Some("a"));
        assert_eq!(errors.errors(), vec!["a", "b"]);
        assert!(ValidationResult::Valid.errors().is_empty());
        assert_eq!(RuleResult::from(errors), RuleResult::Messages(vec!["a".into(), "b".into()]));
    }
}
