#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # formrule-locale
//!
//! Validation messages and locale tables.
//!
//! A failed rule produces a [`Message`] (literal template or function) and a
//! [`MessageArgs`] describing the violated constraint. [`create_message`]
//! resolves the message and substitutes `{placeholder}` segments from the
//! constraint payload. A [`Locale`] maps every rule kind to its default
//! message and can be replaced wholesale or patched from YAML/JSON files.
//!
//! ## Example Usage
//!
//! ```rust
//! use formrule_locale::{create_message, Constraints, Locale, LocaleKey, MessageArgs};
//! use formrule_value::FieldValue;
//!
//! let locale = Locale::default();
//! let args = MessageArgs::with_constraints(Constraints::Length(2));
//! let text = create_message(locale.get(LocaleKey::MinLengthString), &FieldValue::from("a"), &args);
//! assert_eq!(text, "At least 2 characters must be entered.");
//! ```

/// Placeholder substitution and value display.
pub mod format;
/// Locale keys and tables.
pub mod locale;
/// Messages and failure context.
pub mod message;

pub use format::{bytes_to_size, display_value, format};
pub use locale::{Locale, LocaleKey, PartialLocale};
pub use message::{Constraints, FileType, Message, MessageArgs, MessageFn, create_message};

use thiserror::Error;

/// Errors that can occur while building or loading locales
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown locale key: {0}")]
    UnknownLocaleKey(String),

    #[error("Locale is missing key: {0}")]
    MissingLocaleKey(String),

    #[error("Invalid locale format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-local result type for locale operations.
pub type Result<T> = std::result::Result<T, Error>;
