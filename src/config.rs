//! The hierarchical configuration store: rule set -> rule -> property.
//!
//! The store consumes an already-merged configuration (file/CLI merging is
//! the host's concern) and is read-only for the whole run, so it can be
//! shared across concurrently processed files. Lookups never fail on missing
//! keys; a present value that cannot be coerced to the requested type is a
//! fatal [`ConfigError`].

use std::cell::RefCell;
use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::finding::Notice;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
    Table(Config),
}

impl ConfigValue {
    fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Int(_) => "integer",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::List(_) => "list",
            ConfigValue::Table(_) => "table",
        }
    }

    fn from_toml(value: toml::Value, scope: &str) -> Result<Self, ConfigError> {
        match value {
            toml::Value::String(s) => Ok(ConfigValue::String(s)),
            toml::Value::Integer(i) => Ok(ConfigValue::Int(i)),
            toml::Value::Boolean(b) => Ok(ConfigValue::Bool(b)),
            toml::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        toml::Value::String(s) => list.push(s),
                        other => {
                            return Err(ConfigError::TypeMismatch {
                                key: scope.to_string(),
                                expected: "list of strings",
                                found: other.type_str().to_string(),
                            });
                        }
                    }
                }
                Ok(ConfigValue::List(list))
            }
            toml::Value::Table(table) => Ok(ConfigValue::Table(Config::from_table(
                table,
                scope.to_string(),
            )?)),
            other => Err(ConfigError::TypeMismatch {
                key: scope.to_string(),
                expected: "string, integer, boolean, list or table",
                found: other.type_str().to_string(),
            }),
        }
    }
}

/// A read-only view into the configuration tree.
///
/// Values live behind an `Arc`, so cloning a config or scoping into a
/// sub-table is cheap and thread-safe. `scope` records the key path from the
/// root, purely for error messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: Arc<FxHashMap<String, ConfigValue>>,
    scope: String,
}

impl Config {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(source)?;
        Self::from_table(table, String::new())
    }

    /// Build a store from an already-merged table. How file and command-line
    /// layers were merged into it is the host's concern.
    pub fn from_toml_table(table: toml::Table) -> Result<Self, ConfigError> {
        Self::from_table(table, String::new())
    }

    fn from_table(table: toml::Table, scope: String) -> Result<Self, ConfigError> {
        let mut values = FxHashMap::default();
        for (key, value) in table {
            let child_scope = join_scope(&scope, &key);
            values.insert(key, ConfigValue::from_toml(value, &child_scope)?);
        }
        Ok(Self { values: Arc::new(values), scope })
    }

    fn full_key(&self, key: &str) -> String {
        join_scope(&self.scope, key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// A view scoped to a nested table. A missing key yields an empty view;
    /// a present non-table value is a configuration error.
    pub fn sub(&self, key: &str) -> Result<Config, ConfigError> {
        match self.values.get(key) {
            None => Ok(Config {
                values: Arc::new(FxHashMap::default()),
                scope: self.full_key(key),
            }),
            Some(ConfigValue::Table(config)) => Ok(config.clone()),
            Some(other) => Err(self.mismatch(key, "table", other)),
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        match self.values.get(key) {
            None => Ok(default.to_string()),
            Some(ConfigValue::String(value)) => Ok(value.clone()),
            Some(other) => Err(self.mismatch(key, "string", other)),
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(ConfigValue::Int(value)) => Ok(*value),
            // Older configuration formats quote numeric values.
            Some(ConfigValue::String(value)) => value
                .trim()
                .parse()
                .map_err(|_| self.mismatch(key, "integer", &ConfigValue::String(value.clone()))),
            Some(other) => Err(self.mismatch(key, "integer", other)),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(ConfigValue::Bool(value)) => Ok(*value),
            Some(ConfigValue::String(value)) => value
                .trim()
                .parse()
                .map_err(|_| self.mismatch(key, "boolean", &ConfigValue::String(value.clone()))),
            Some(other) => Err(self.mismatch(key, "boolean", other)),
        }
    }

    /// A list of strings. Accepts a native list or a single comma-separated
    /// string (older configuration formats only supported the latter);
    /// entries are trimmed and empty entries dropped.
    pub fn get_string_list(&self, key: &str, default: &[&str]) -> Result<Vec<String>, ConfigError> {
        match self.values.get(key) {
            None => Ok(default.iter().map(|s| (*s).to_string()).collect()),
            Some(ConfigValue::List(values)) => Ok(values.clone()),
            Some(ConfigValue::String(value)) => Ok(split_csv(value)),
            Some(other) => Err(self.mismatch(key, "list of strings", other)),
        }
    }

    fn mismatch(&self, key: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
        ConfigError::TypeMismatch {
            key: self.full_key(key),
            expected,
            found: found.type_name().to_string(),
        }
    }
}

fn join_scope(scope: &str, key: &str) -> String {
    if scope.is_empty() {
        key.to_string()
    } else {
        format!("{scope}.{key}")
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compile a "simple pattern" into an anchored full-match regex.
///
/// `*` matches any sequence, `?` matches a single character, a literal `.`
/// is escaped; any other regex syntax passes through unchanged. The result
/// matches whole strings only, never as a search. `key` is the configuration
/// key the pattern came from, used in the error.
pub fn simple_pattern_to_regex(pattern: &str, key: &str) -> Result<Regex, ConfigError> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    for ch in pattern.chars() {
        match ch {
            '.' => translated.push_str("\\."),
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => translated.push(other),
        }
    }
    Regex::new(&format!("^(?:{translated})$")).map_err(|err| ConfigError::InvalidPattern {
        key: key.to_string(),
        pattern: pattern.to_string(),
        source: Box::new(err),
    })
}

/// A rule's typed view over its own slice of the configuration store.
///
/// Rules resolve their properties once at construction and cache the results
/// in their own fields, so each deprecated-key probe records its notice at
/// most once per rule instance. The `*_with_fallback` getters implement the
/// migration contract: the canonical key always wins, otherwise the
/// deprecated key is probed (and flagged), otherwise the built-in default
/// applies. The two keys are never combined.
#[derive(Debug, Default, Clone)]
pub struct RuleConfig {
    config: Config,
    rule_id: String,
    deprecations: RefCell<Vec<Notice>>,
}

impl RuleConfig {
    pub fn new(config: Config, rule_id: impl Into<String>) -> Self {
        Self { config, rule_id: rule_id.into(), deprecations: RefCell::new(Vec::new()) }
    }

    pub fn has(&self, key: &str) -> bool {
        self.config.has(key)
    }

    pub fn sub(&self, key: &str) -> Result<Config, ConfigError> {
        self.config.sub(key)
    }

    pub fn int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.config.get_int(key, default)
    }

    pub fn bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.config.get_bool(key, default)
    }

    pub fn string(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        self.config.get_string(key, default)
    }

    pub fn string_list(&self, key: &str, default: &[&str]) -> Result<Vec<String>, ConfigError> {
        self.config.get_string_list(key, default)
    }

    pub fn int_with_fallback(
        &self,
        key: &str,
        deprecated: &str,
        default: i64,
    ) -> Result<i64, ConfigError> {
        let key = self.probe(key, deprecated);
        self.config.get_int(key, default)
    }

    pub fn bool_with_fallback(
        &self,
        key: &str,
        deprecated: &str,
        default: bool,
    ) -> Result<bool, ConfigError> {
        let key = self.probe(key, deprecated);
        self.config.get_bool(key, default)
    }

    pub fn string_list_with_fallback(
        &self,
        key: &str,
        deprecated: &str,
        default: &[&str],
    ) -> Result<Vec<String>, ConfigError> {
        let key = self.probe(key, deprecated);
        self.config.get_string_list(key, default)
    }

    /// Resolve a list-valued property where every entry is a simple pattern,
    /// compiled once at rule construction.
    pub fn patterns(&self, key: &str, default: &[&str]) -> Result<Vec<Regex>, ConfigError> {
        let full_key = self.config.full_key(key);
        self.string_list(key, default)?
            .iter()
            .map(|pattern| simple_pattern_to_regex(pattern, &full_key))
            .collect()
    }

    pub fn patterns_with_fallback(
        &self,
        key: &str,
        deprecated: &str,
        default: &[&str],
    ) -> Result<Vec<Regex>, ConfigError> {
        let key = self.probe(key, deprecated);
        self.patterns(key, default)
    }

    /// Picks the canonical key when present, otherwise the deprecated key
    /// (recording a notice). When neither is present the canonical key is
    /// returned so the caller falls through to its default.
    fn probe<'k>(&self, key: &'k str, deprecated: &'k str) -> &'k str {
        if !self.config.has(key) && self.config.has(deprecated) {
            tracing::warn!(
                rule = %self.rule_id,
                "config key `{deprecated}` is deprecated, use `{key}` instead"
            );
            self.deprecations.borrow_mut().push(Notice::DeprecatedKey {
                rule_id: self.rule_id.clone(),
                deprecated: deprecated.to_string(),
                canonical: key.to_string(),
            });
            deprecated
        } else {
            key
        }
    }

    pub(crate) fn take_deprecations(&self) -> Vec<Notice> {
        self.deprecations.take()
    }
}
