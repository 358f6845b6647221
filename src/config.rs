use parking_lot::Mutex;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigCastError;

/// Key deciding whether a rule set or a rule runs.
pub const ACTIVE_KEY: &str = "active";
/// Key deciding whether a correctable rule may rewrite the tree.
pub const AUTO_CORRECT_KEY: &str = "autoCorrect";
/// Key overriding the severity declared by a rule.
pub const SEVERITY_KEY: &str = "severity";
/// Glob patterns of paths a rule set or rule must not run on.
pub const EXCLUDES_KEY: &str = "excludes";
/// Glob patterns of paths a rule set or rule is restricted to.
pub const INCLUDES_KEY: &str = "includes";

/// Separator used to render the path of nested sections, e.g. `style>MaxLineLength`.
pub const PATH_SEPARATOR: &str = ">";

pub type Section = Arc<BTreeMap<String, ConfigValue>>;

/// A single configured value.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<ConfigValue>),
    Section(Section),
}

impl ConfigValue {
    fn is_section(&self) -> bool {
        matches!(self, Self::Section(_))
    }

    fn as_section(&self) -> Option<&Section> {
        match self {
            Self::Section(section) => Some(section),
            _ => None,
        }
    }

    /// Scalars rendered as plain text. Lists and sections have no such form.
    fn as_scalar_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::List(_) | Self::Section(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Section(_) => write!(f, "{{section}}"),
        }
    }
}

impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::String(s),
            toml::Value::Integer(i) => Self::Integer(i),
            toml::Value::Float(f) => Self::Float(f),
            toml::Value::Boolean(b) => Self::Boolean(b),
            toml::Value::Datetime(d) => Self::String(d.to_string()),
            toml::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            toml::Value::Table(table) => Self::Section(section_from_table(table)),
        }
    }
}

pub(crate) fn section_from_table(table: toml::Table) -> Section {
    Arc::new(
        table
            .into_iter()
            .map(|(key, value)| (key, ConfigValue::from(value)))
            .collect(),
    )
}

/// Conversion of a stored [ConfigValue] into a concrete Rust type.
///
/// Returning `None` means the stored value has the wrong shape, which the
/// caller turns into a [ConfigCastError].
pub trait FromConfigValue: Sized {
    /// Human readable name of the expected shape, used in error messages.
    const EXPECTED: &'static str;

    fn from_config_value(value: &ConfigValue) -> Option<Self>;
}

impl FromConfigValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value.as_scalar_string()
    }
}

impl FromConfigValue for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Boolean(b) => Some(*b),
            ConfigValue::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromConfigValue for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Integer(i) => Some(*i),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

macro_rules! integer_from_config_value {
    ($($ty:ty),*) => {
        $(
            impl FromConfigValue for $ty {
                const EXPECTED: &'static str = "an integer";

                fn from_config_value(value: &ConfigValue) -> Option<Self> {
                    i64::from_config_value(value).and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

integer_from_config_value!(i32, u32, usize);

impl FromConfigValue for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<String> {
    const EXPECTED: &'static str = "a list of strings";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::List(items) => items.iter().map(ConfigValue::as_scalar_string).collect(),
            // A single string is read as a comma separated list.
            ConfigValue::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<Regex> {
    const EXPECTED: &'static str = "a list of regular expressions";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        Vec::<String>::from_config_value(value)?
            .iter()
            .map(|pattern| Regex::new(pattern).ok())
            .collect()
    }
}

/// A legacy key that was read because its replacement was absent.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deprecation {
    pub path: String,
    pub key: String,
    pub replacement: String,
}

impl fmt::Display for Deprecation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key `{}` in `{}` is deprecated, use `{}` instead",
            self.key, self.path, self.replacement
        )
    }
}

/// Deprecation notices recorded while reading a config tree. Every view of
/// the tree shares the same log, so whoever owns the root sees notices
/// recorded through any sub-config.
#[derive(Clone, Debug, Default)]
pub struct DeprecationLog(Arc<Mutex<Vec<Deprecation>>>);

impl DeprecationLog {
    pub fn record(&self, deprecation: Deprecation) {
        let mut log = self.0.lock();
        if !log.contains(&deprecation) {
            log.push(deprecation);
        }
    }

    /// Remove and return every recorded notice.
    pub fn drain(&self) -> Vec<Deprecation> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A view on one section of the configuration tree.
pub trait Config: fmt::Debug + Send + Sync {
    /// Path of this section, `None` for the root.
    fn parent_path(&self) -> Option<&str>;

    /// Effective value stored under `key` in this section.
    fn value(&self, key: &str) -> Option<ConfigValue>;

    /// View on the child section `key`. Never fails: a missing section is an
    /// empty view that still knows its path.
    fn sub_config(&self, key: &str) -> Arc<dyn Config>;

    fn deprecations(&self) -> &DeprecationLog;
}

/// Typed accessors available on every [Config].
pub trait ConfigExt: Config {
    /// Read `key` as `T`, falling back to `default` when it is absent.
    fn value_or_default<T: FromConfigValue>(&self, key: &str, default: T) -> Result<T, ConfigCastError> {
        Ok(self.value_or_none(key)?.unwrap_or(default))
    }

    fn value_or_none<T: FromConfigValue>(&self, key: &str) -> Result<Option<T>, ConfigCastError> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => cast(self.parent_path(), key, &value).map(Some),
        }
    }

    /// Read `key`, then `legacy_key`, then fall back to `default`. Reading
    /// the legacy key records a deprecation notice.
    fn value_or_default_aliased<T: FromConfigValue>(
        &self,
        key: &str,
        legacy_key: &str,
        default: T,
    ) -> Result<T, ConfigCastError> {
        if let Some(value) = self.value(key) {
            return cast(self.parent_path(), key, &value);
        }
        match self.value(legacy_key) {
            None => Ok(default),
            Some(value) => {
                self.deprecations().record(Deprecation {
                    path: display_path(self.parent_path()),
                    key: legacy_key.to_string(),
                    replacement: key.to_string(),
                });
                cast(self.parent_path(), legacy_key, &value)
            }
        }
    }

    fn is_active(&self, default: bool) -> Result<bool, ConfigCastError> {
        self.value_or_default(ACTIVE_KEY, default)
    }

    fn auto_correct(&self, default: bool) -> Result<bool, ConfigCastError> {
        self.value_or_default(AUTO_CORRECT_KEY, default)
    }
}

impl<C: Config + ?Sized> ConfigExt for C {}

fn cast<T: FromConfigValue>(
    path: Option<&str>,
    key: &str,
    value: &ConfigValue,
) -> Result<T, ConfigCastError> {
    T::from_config_value(value).ok_or_else(|| ConfigCastError {
        path: display_path(path),
        key: key.to_string(),
        expected: T::EXPECTED,
        found: value.to_string(),
    })
}

fn display_path(path: Option<&str>) -> String {
    path.unwrap_or("<root>").to_string()
}

fn child_path(path: Option<&str>, key: &str) -> String {
    match path {
        None => key.to_string(),
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{key}"),
    }
}

/// User values layered over a default configuration.
///
/// Precedence is decided per key: a user section that sets one key still
/// inherits every other key of the matching default section.
#[derive(Clone, Debug, Default)]
pub struct LayeredConfig {
    path: Option<String>,
    user: Option<Section>,
    defaults: Option<Section>,
    deprecations: DeprecationLog,
}

impl LayeredConfig {
    /// A configuration without any value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(user: Section) -> Self {
        Self { user: Some(user), ..Self::default() }
    }

    pub fn layered(user: Section, defaults: Section) -> Self {
        Self {
            user: Some(user),
            defaults: Some(defaults),
            ..Self::default()
        }
    }

    /// Keep this config's values and use `defaults` for every key it lacks.
    pub fn with_defaults(mut self, defaults: Section) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn into_shared(self) -> Arc<dyn Config> {
        Arc::new(self)
    }

    pub(crate) fn into_user_section(self) -> Option<Section> {
        self.user
    }

    fn child(section: &Option<Section>, key: &str) -> Option<Section> {
        section
            .as_ref()
            .and_then(|s| s.get(key))
            .and_then(ConfigValue::as_section)
            .cloned()
    }

    fn scalar(section: &Option<Section>, key: &str) -> Option<ConfigValue> {
        section
            .as_ref()
            .and_then(|s| s.get(key))
            .filter(|value| !value.is_section())
            .cloned()
    }
}

impl Config for LayeredConfig {
    fn parent_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn value(&self, key: &str) -> Option<ConfigValue> {
        Self::scalar(&self.user, key).or_else(|| Self::scalar(&self.defaults, key))
    }

    fn sub_config(&self, key: &str) -> Arc<dyn Config> {
        Arc::new(LayeredConfig {
            path: Some(child_path(self.parent_path(), key)),
            user: Self::child(&self.user, key),
            defaults: Self::child(&self.defaults, key),
            deprecations: self.deprecations.clone(),
        })
    }

    fn deprecations(&self) -> &DeprecationLog {
        &self.deprecations
    }
}

/// Read-through wrapper that reports `autoCorrect = false` everywhere while
/// delegating every other key to the wrapped config.
#[derive(Clone, Debug)]
pub struct DisabledAutoCorrectConfig {
    inner: Arc<dyn Config>,
}

impl DisabledAutoCorrectConfig {
    pub fn new(inner: Arc<dyn Config>) -> Self {
        Self { inner }
    }
}

impl Config for DisabledAutoCorrectConfig {
    fn parent_path(&self) -> Option<&str> {
        self.inner.parent_path()
    }

    fn value(&self, key: &str) -> Option<ConfigValue> {
        if key == AUTO_CORRECT_KEY {
            Some(ConfigValue::Boolean(false))
        } else {
            self.inner.value(key)
        }
    }

    fn sub_config(&self, key: &str) -> Arc<dyn Config> {
        Arc::new(DisabledAutoCorrectConfig::new(self.inner.sub_config(key)))
    }

    fn deprecations(&self) -> &DeprecationLog {
        self.inner.deprecations()
    }
}
