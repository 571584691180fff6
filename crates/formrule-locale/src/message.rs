//! Messages and failure context

use crate::format::{display_list, format};
use formrule_value::{FieldValue, Ref};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Function form of a message: receives the field value and failure context
pub type MessageFn = Arc<dyn Fn(&FieldValue, &MessageArgs) -> String + Send + Sync>;

/// A validation message: literal template text or a function producing it
#[derive(Clone)]
pub enum Message {
    /// Template text with `{placeholder}` segments
    Text(String),

    /// Computed from the value and the failure context
    Dynamic(MessageFn),
}

impl Message {
    /// Literal template message
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text(text.into())
    }

    /// Message computed at failure time
    pub fn from_fn(f: impl Fn(&FieldValue, &MessageArgs) -> String + Send + Sync + 'static) -> Self {
        Message::Dynamic(Arc::new(f))
    }

    /// Resolve to template text, without placeholder substitution
    #[must_use]
    pub fn resolve(&self, value: &FieldValue, args: &MessageArgs) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Dynamic(f) => f(value, args),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::text(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

/// Accepted file types: a list of MIME types or a pattern over them
#[derive(Debug, Clone)]
pub enum FileType {
    /// Exact MIME types
    Types(Vec<String>),

    /// MIME types matching a regular expression
    Pattern(Regex),
}

impl FileType {
    /// Check a MIME type against this constraint
    #[must_use]
    pub fn matches(&self, mime_type: &str) -> bool {
        match self {
            FileType::Types(types) => types.iter().any(|t| t == mime_type),
            FileType::Pattern(re) => re.is_match(mime_type),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Types(types) => f.write_str(&types.join(",")),
            FileType::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for FileType {
    fn from(mime_type: &str) -> Self {
        FileType::Types(vec![mime_type.to_string()])
    }
}

impl From<String> for FileType {
    fn from(mime_type: String) -> Self {
        FileType::Types(vec![mime_type])
    }
}

impl From<Vec<&str>> for FileType {
    fn from(types: Vec<&str>) -> Self {
        FileType::Types(types.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for FileType {
    fn from(types: Vec<String>) -> Self {
        FileType::Types(types)
    }
}

impl From<Regex> for FileType {
    fn from(re: Regex) -> Self {
        FileType::Pattern(re)
    }
}

/// The constraint a failed rule was checking; one variant per rule family
#[derive(Debug, Clone)]
pub enum Constraints {
    /// Maximum file size in bytes, with its display form
    Size { size: u64, formatted_size: String },

    /// Accepted file types
    Type(FileType),

    /// Length bound
    Length(usize),

    /// Regular expression
    Regexp(Regex),

    /// Digit pattern template
    Pattern(String),

    /// Literal comparison values
    Values(Vec<FieldValue>),

    /// Referenced fields and the values they resolved to
    Resolved {
        fields: Vec<String>,
        resolved: Vec<FieldValue>,
    },
}

impl Constraints {
    /// Display text for a template placeholder, if this payload has that key
    #[must_use]
    pub fn placeholder(&self, key: &str) -> Option<String> {
        match (self, key) {
            (Constraints::Size { size, .. }, "size") => Some(size.to_string()),
            (Constraints::Size { formatted_size, .. }, "formattedSize") => {
                Some(formatted_size.clone())
            }
            (Constraints::Type(file_type), "type") => Some(file_type.to_string()),
            (Constraints::Length(length), "length") => Some(length.to_string()),
            (Constraints::Regexp(re), "regexp") => Some(format!("/{}/", re.as_str())),
            (Constraints::Pattern(pattern), "pattern") => Some(pattern.clone()),
            (Constraints::Values(values), "values") => Some(display_list(values)),
            (Constraints::Resolved { fields, .. }, "fields") => Some(fields.join(",")),
            (Constraints::Resolved { resolved, .. }, "resolved") => Some(display_list(resolved)),
            _ => None,
        }
    }
}

/// Context handed to a message when a rule fails
#[derive(Debug, Clone, Default)]
pub struct MessageArgs {
    /// The field reference the rule compared against, if any
    pub reference: Option<Ref>,

    /// The violated constraint, if the rule has one
    pub constraints: Option<Constraints>,
}

impl MessageArgs {
    /// Context carrying only a constraint payload
    #[must_use]
    pub fn with_constraints(constraints: Constraints) -> Self {
        Self {
            reference: None,
            constraints: Some(constraints),
        }
    }

    /// Context for a rule that compared against referenced fields
    #[must_use]
    pub fn with_reference(reference: Ref, resolved: Vec<FieldValue>) -> Self {
        Self {
            constraints: Some(Constraints::Resolved {
                fields: reference.paths().to_vec(),
                resolved,
            }),
            reference: Some(reference),
        }
    }
}

/// Resolve a message and fill its placeholders from the constraint payload
#[must_use]
pub fn create_message(message: &Message, value: &FieldValue, args: &MessageArgs) -> String {
    format(&message.resolve(value, args), args.constraints.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message() {
        let message = Message::from("Required");
        assert_eq!(
            message.resolve(&FieldValue::Null, &MessageArgs::default()),
            "Required"
        );
    }

    #[test]
    fn test_dynamic_message_receives_value_and_args() {
        let message = Message::from_fn(|value, args| {
            format!(
                "{}:{}",
                value.as_str().unwrap_or("?"),
                args.reference.is_some()
            )
        });

        let args = MessageArgs::with_reference(Ref::field("other"), vec![FieldValue::from(1)]);
        assert_eq!(message.resolve(&FieldValue::from("x"), &args), "x:true");
    }

    #[test]
    fn test_create_message_formats_constraints() {
        let message = Message::from("Must be one of {values}.");
        let args = MessageArgs::with_constraints(Constraints::Values(vec![
            FieldValue::from("a"),
            FieldValue::from(2),
        ]));
        assert_eq!(
            create_message(&message, &FieldValue::Undefined, &args),
            "Must be one of a,2."
        );
    }

    #[test]
    fn test_reference_placeholders() {
        let reference = Ref::fields(["start", "end"]).unwrap();
        let args = MessageArgs::with_reference(
            reference,
            vec![FieldValue::from(1), FieldValue::from("b")],
        );
        let constraints = args.constraints.as_ref().unwrap();
        assert_eq!(constraints.placeholder("fields").as_deref(), Some("start,end"));
        assert_eq!(constraints.placeholder("resolved").as_deref(), Some("1,b"));
        assert_eq!(constraints.placeholder("values"), None);
    }

    #[test]
    fn test_file_type() {
        let list = FileType::from(vec!["image/png", "image/jpeg"]);
        assert!(list.matches("image/png"));
        assert!(!list.matches("image/gif"));
        assert_eq!(list.to_string(), "image/png,image/jpeg");

        let pattern = FileType::from(Regex::new("^image/").unwrap());
        assert!(pattern.matches("image/gif"));
        assert!(!pattern.matches("application/pdf"));
        assert_eq!(pattern.to_string(), "/^image//");
    }

    #[test]
    fn test_size_placeholders() {
        let size = Constraints::Size {
            size: 1_000_000,
            formatted_size: "1 MB".to_string(),
        };
        assert_eq!(size.placeholder("size").as_deref(), Some("1000000"));
        assert_eq!(size.placeholder("formattedSize").as_deref(), Some("1 MB"));
        assert_eq!(size.placeholder("length"), None);
    }
}
