#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # formrule-value
//!
//! Value model shared by the formrule crates.
//!
//! A form field can hold text, numbers, booleans, dates, lists, nested
//! objects or uploaded files. This crate provides the tagged [`FieldValue`]
//! type for those shapes, the [`FormValues`] snapshot a validator reads
//! sibling fields from, the [`Ref`] descriptor used by cross-field rules,
//! shape predicates and the value comparator.
//!
//! ## Example Usage
//!
//! ```rust
//! use formrule_value::{compare, FormValues, Operator, Ref};
//! use serde_json::json;
//!
//! let form = FormValues::from(json!({ "start": "2023-01-01", "end": "2023-02-01" }));
//! let start = Ref::field("start");
//!
//! let resolved = start.resolve(&form);
//! assert!(compare(&form.resolve("end"), &resolved[0], Operator::Gt));
//! ```

/// Ordering and equality over field values.
pub mod compare;
/// Form values snapshot and path lookup.
pub mod form;
/// Shape classification for field values.
pub mod predicates;
/// Cross-field references.
pub mod reference;
/// The tagged field value type.
pub mod value;

pub use compare::{Operator, compare, timestamp_of};
pub use form::FormValues;
pub use reference::{Condition, Ref};
pub use value::{FieldValue, FileEntry, FileList};

use thiserror::Error;

/// Errors that can occur when building value-level descriptors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("A field reference needs at least one path")]
    EmptyReference,

    #[error("Unknown comparison operator '{0}'")]
    UnknownOperator(String),

    #[error("Unknown reference condition '{0}'")]
    UnknownCondition(String),
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
