//! Locale tables with file loading

use crate::message::Message;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// Every message slot a locale must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocaleKey {
    Required,
    String,
    Number,
    Array,
    Boolean,
    Email,
    IpAddress,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Regexp,
    RegexpNot,
    Pattern,
    FileSize,
    FileType,
    LengthString,
    LengthArray,
    LengthFile,
    MinLengthString,
    MinLengthArray,
    MinLengthFile,
    MaxLengthString,
    MaxLengthArray,
    MaxLengthFile,
}

impl LocaleKey {
    /// Number of keys
    pub const COUNT: usize = 27;

    /// All keys in table order
    pub const ALL: [LocaleKey; Self::COUNT] = [
        LocaleKey::Required,
        LocaleKey::String,
        LocaleKey::Number,
        LocaleKey::Array,
        LocaleKey::Boolean,
        LocaleKey::Email,
        LocaleKey::IpAddress,
        LocaleKey::Eq,
        LocaleKey::Neq,
        LocaleKey::Lt,
        LocaleKey::Lte,
        LocaleKey::Gt,
        LocaleKey::Gte,
        LocaleKey::Regexp,
        LocaleKey::RegexpNot,
        LocaleKey::Pattern,
        LocaleKey::FileSize,
        LocaleKey::FileType,
        LocaleKey::LengthString,
        LocaleKey::LengthArray,
        LocaleKey::LengthFile,
        LocaleKey::MinLengthString,
        LocaleKey::MinLengthArray,
        LocaleKey::MinLengthFile,
        LocaleKey::MaxLengthString,
        LocaleKey::MaxLengthArray,
        LocaleKey::MaxLengthFile,
    ];

    /// Key name as it appears in locale files
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LocaleKey::Required => "required",
            LocaleKey::String => "string",
            LocaleKey::Number => "number",
            LocaleKey::Array => "array",
            LocaleKey::Boolean => "boolean",
            LocaleKey::Email => "email",
            LocaleKey::IpAddress => "ipAddress",
            LocaleKey::Eq => "eq",
            LocaleKey::Neq => "neq",
            LocaleKey::Lt => "lt",
            LocaleKey::Lte => "lte",
            LocaleKey::Gt => "gt",
            LocaleKey::Gte => "gte",
            LocaleKey::Regexp => "regexp",
            LocaleKey::RegexpNot => "regexp.not",
            LocaleKey::Pattern => "pattern",
            LocaleKey::FileSize => "fileSize",
            LocaleKey::FileType => "fileType",
            LocaleKey::LengthString => "length.string",
            LocaleKey::LengthArray => "length.array",
            LocaleKey::LengthFile => "length.file",
            LocaleKey::MinLengthString => "minLength.string",
            LocaleKey::MinLengthArray => "minLength.array",
            LocaleKey::MinLengthFile => "minLength.file",
            LocaleKey::MaxLengthString => "maxLength.string",
            LocaleKey::MaxLengthArray => "maxLength.array",
            LocaleKey::MaxLengthFile => "maxLength.file",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn default_text(self) -> &'static str {
        match self {
            LocaleKey::Required => "This field is required.",
            LocaleKey::String => "The value must be a string.",
            LocaleKey::Number => "The value must be a number.",
            LocaleKey::Array => "The value must be a array.",
            LocaleKey::Boolean => "The value must be a boolean.",
            LocaleKey::Email => "The value must be a valid e-mail address.",
            LocaleKey::IpAddress => "The value must be a valid IP address.",
            LocaleKey::Eq => "The value must be equal to {values}.",
            LocaleKey::Neq => "The value must not be equal to {values}.",
            LocaleKey::Lt => "The value must be less than {values}.",
            LocaleKey::Lte => "The value must be less than or equal to {values}.",
            LocaleKey::Gt => "The value must be greater than {values}.",
            LocaleKey::Gte => "The value must be greater than or equal to {values}.",
            LocaleKey::Regexp => "The value must match the format {regexp}.",
            LocaleKey::RegexpNot => "Value must not match the format {regexp}.",
            LocaleKey::Pattern => "The value must match the format {pattern}.",
            LocaleKey::FileSize => "The file size can be up to {formattedSize}.",
            LocaleKey::FileType => "Invalid file type must be file type {type}",
            LocaleKey::LengthString => "You have to enter {length} characters.",
            LocaleKey::LengthArray => "You must select {length} items.",
            LocaleKey::LengthFile => "You must select {length} files.",
            LocaleKey::MinLengthString => "At least {length} characters must be entered.",
            LocaleKey::MinLengthArray => "At least {length} items must be selected.",
            LocaleKey::MinLengthFile => "At least {length} files must be selected.",
            LocaleKey::MaxLengthString => "Up to {length} characters can be entered.",
            LocaleKey::MaxLengthArray => "Up to {length} items can be selected.",
            LocaleKey::MaxLengthFile => "Up to {length} files can be selected.",
        }
    }

    /// Text used when the rule compared against referenced fields
    fn default_reference_text(self) -> Option<&'static str> {
        match self {
            LocaleKey::Eq => Some("This field must be equal to {fields} named field."),
            LocaleKey::Neq => Some("This field must not be equal to {fields} named field."),
            LocaleKey::Lt => Some("The value must be less than the field named {fields}."),
            LocaleKey::Lte => {
                Some("The value must be less than or equal to the field named {fields}.")
            }
            LocaleKey::Gt => Some("The value must be greater than the field named {fields}."),
            LocaleKey::Gte => {
                Some("The value must be greater than or equal to the field named {fields}.")
            }
            _ => None,
        }
    }

    fn default_message(self) -> Message {
        let text = self.default_text();
        match self.default_reference_text() {
            Some(reference_text) => Message::from_fn(move |_, args| {
                if args.reference.is_some() {
                    reference_text.to_string()
                } else {
                    text.to_string()
                }
            }),
            None => Message::text(text),
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LocaleKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::UnknownLocaleKey(s.to_string()))
    }
}

/// A complete message table: one message per [`LocaleKey`]
#[derive(Clone)]
pub struct Locale {
    entries: [Message; LocaleKey::COUNT],
}

impl Default for Locale {
    /// English messages
    fn default() -> Self {
        Self {
            entries: std::array::from_fn(|i| LocaleKey::ALL[i].default_message()),
        }
    }
}

impl Locale {
    /// Message registered for a key
    #[must_use]
    pub fn get(&self, key: LocaleKey) -> &Message {
        &self.entries[key.index()]
    }

    /// Build a table from explicit entries
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingLocaleKey`] for the first key without an entry.
    pub fn from_entries(mut entries: HashMap<LocaleKey, Message>) -> Result<Self> {
        if let Some(missing) = LocaleKey::ALL.iter().find(|key| !entries.contains_key(key)) {
            return Err(Error::MissingLocaleKey(missing.to_string()));
        }

        let mut table = Locale::default();
        for key in LocaleKey::ALL {
            if let Some(message) = entries.remove(&key) {
                table.entries[key.index()] = message;
            }
        }
        Ok(table)
    }

    /// New table with the given entries laid over this one
    #[must_use]
    pub fn merge(&self, partial: PartialLocale) -> Self {
        let mut merged = self.clone();
        for (key, message) in partial.entries {
            trace!("Overriding locale entry {}", key);
            merged.entries[key.index()] = message;
        }
        merged
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(LocaleKey::ALL.iter().map(|key| (key.as_str(), self.get(*key))))
            .finish()
    }
}

/// A subset of locale entries, used to patch a [`Locale`]
#[derive(Debug, Clone, Default)]
pub struct PartialLocale {
    entries: HashMap<LocaleKey, Message>,
}

impl PartialLocale {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one entry
    #[must_use]
    pub fn set(mut self, key: LocaleKey, message: impl Into<Message>) -> Self {
        self.entries.insert(key, message.into());
        self
    }

    /// Parse a flat `key: text` YAML document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for malformed YAML and
    /// [`Error::UnknownLocaleKey`] for keys outside the table.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_yaml::from_str(yaml)
            .map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))?;
        Self::from_raw(raw)
    }

    /// Parse a flat `{"key": "text"}` JSON document
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for malformed JSON and
    /// [`Error::UnknownLocaleKey`] for keys outside the table.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))?;
        Self::from_raw(raw)
    }

    /// Load entries from a file; `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read, otherwise the
    /// parse errors of [`PartialLocale::from_yaml_str`] and
    /// [`PartialLocale::from_json_str`].
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading locale file: {:?}", path);

        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    fn from_raw(raw: HashMap<String, String>) -> Result<Self> {
        let entries = raw
            .into_iter()
            .map(|(key, text)| Ok((key.parse::<LocaleKey>()?, Message::Text(text))))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocaleKey, &Message)> {
        self.entries.iter()
    }
}
