//! Process configuration: current locale and custom rule table
//!
//! A [`Config`] is a cheap handle to shared state. Validators created from it
//! take a snapshot of the locale and the custom rules at creation time, so
//! swapping the locale later never changes an existing validator.

use crate::Result;
use crate::rule::Rule;
use crate::validator::Validator;
use arc_swap::ArcSwap;
use formrule_locale::{Locale, PartialLocale};
use formrule_value::FieldValue;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// Builds a rule from the arguments given to [`Validator::custom`]
pub type CustomRuleFn = Arc<dyn Fn(&[FieldValue]) -> Rule + Send + Sync>;

/// Custom rules by name
pub type CustomRules = HashMap<String, CustomRuleFn>;

static GLOBAL: LazyLock<Config> = LazyLock::new(Config::default);

/// Shared locale store and custom rule table
#[derive(Clone, Default)]
pub struct Config {
    inner: Arc<ConfigInner>,
}

struct ConfigInner {
    locale: ArcSwap<Locale>,
    rules: ArcSwap<CustomRules>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            locale: ArcSwap::from_pointee(Locale::default()),
            rules: ArcSwap::from_pointee(CustomRules::new()),
        }
    }
}

impl Config {
    /// Fresh configuration with the English locale and no custom rules
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration starting from the given locale
    #[must_use]
    pub fn with_locale(locale: Locale) -> Self {
        let config = Self::default();
        config.set_locale(locale);
        config
    }

    /// The process-wide configuration
    pub fn global() -> &'static Config {
        &GLOBAL
    }

    /// Current locale
    #[must_use]
    pub fn locale(&self) -> Arc<Locale> {
        self.inner.locale.load_full()
    }

    /// Replace the whole locale
    pub fn set_locale(&self, locale: Locale) {
        debug!("Replacing locale");
        self.inner.locale.store(Arc::new(locale));
    }

    /// Lay the given entries over the current locale
    pub fn merge_locale(&self, partial: PartialLocale) {
        debug!("Merging {} locale entries", partial.len());
        self.inner
            .locale
            .rcu(|current| current.merge(partial.clone()));
    }

    /// Merge a YAML or JSON locale file into the current locale
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Locale`] when the file cannot be read or parsed.
    pub fn load_locale_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let partial = PartialLocale::load_file(path)?;
        info!("Loaded {} locale entries from {:?}", partial.len(), path);
        self.merge_locale(partial);
        Ok(())
    }

    /// Register a custom rule usable through [`Validator::custom`]
    ///
    /// Registering a name again replaces the earlier factory for validators
    /// created afterwards.
    pub fn register_rule(
        &self,
        name: impl Into<String>,
        factory: impl Fn(&[FieldValue]) -> Rule + Send + Sync + 'static,
    ) {
        let name = name.into();
        let factory: CustomRuleFn = Arc::new(factory);
        debug!("Registering custom rule {}", name);

        self.inner.rules.rcu(|current| {
            let mut rules = CustomRules::clone(current);
            rules.insert(name.clone(), Arc::clone(&factory));
            rules
        });
    }

    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.inner.rules.load().contains_key(name)
    }

    /// A new validator bound to the current locale and custom rules
    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::from_parts(self.locale(), self.inner.rules.load_full())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = self.inner.rules.load();
        f.debug_struct("Config")
            .field("custom_rules", &rules.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
