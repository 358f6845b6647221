use crate::config::{Config, ConfigExt, FromConfigValue};
use crate::error::ConfigCastError;

/// Declaration of one typed rule option: read `key` as `T`, fall back to
/// `default`, and optionally accept a legacy key name.
///
/// Rules declare their options as a handful of these and resolve them once,
/// when the rule is constructed from its config section.
///
/// ```
/// use inspekt::config::{Config, LayeredConfig};
/// use inspekt::property::Property;
///
/// let max_line_length = Property::new("maxLineLength", 120usize).deprecated_alias("maxLength");
/// let config = LayeredConfig::empty();
/// assert_eq!(max_line_length.resolve(&config).unwrap(), 120);
/// ```
#[derive(Clone, Debug)]
pub struct Property<T> {
    key: &'static str,
    legacy_key: Option<&'static str>,
    default: T,
}

impl<T: FromConfigValue + Clone> Property<T> {
    pub fn new(key: &'static str, default: T) -> Self {
        Self { key, legacy_key: None, default }
    }

    pub fn deprecated_alias(mut self, legacy_key: &'static str) -> Self {
        self.legacy_key = Some(legacy_key);
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn resolve(&self, config: &dyn Config) -> Result<T, ConfigCastError> {
        match self.legacy_key {
            Some(legacy_key) => {
                config.value_or_default_aliased(self.key, legacy_key, self.default.clone())
            }
            None => config.value_or_default(self.key, self.default.clone()),
        }
    }
}
