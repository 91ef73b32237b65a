//! Assembling rule sets from the configuration store.
//!
//! A provider is purely compositional: it owns the ordered list of rule
//! registrations (metadata + constructor) and instantiates a fresh
//! [`RuleSet`] per analyzed file. Whether a rule is active is decided here,
//! exactly once, before construction; inactive rules are never built and can
//! therefore never report.

use regex::Regex;

use crate::config::{Config, RuleConfig, simple_pattern_to_regex};
use crate::error::ConfigError;
use crate::finding::{Notice, Severity};
use crate::rule::{Rule, RuleMetadata};

pub type RuleFactory = Box<dyn Fn(&RuleConfig) -> Result<Box<dyn Rule>, ConfigError> + Send + Sync>;

/// A registered rule: static metadata plus its constructor.
pub struct RuleDescriptor {
    pub metadata: &'static RuleMetadata,
    pub factory: RuleFactory,
}

/// Activation inputs that do not live in the configuration store.
#[derive(Debug, Clone, Default)]
pub struct ActivationPolicy {
    /// Version of the host tool. Rules whose `active_by_default_since` lies
    /// above it stay inactive unless switched on explicitly. `None` means
    /// "newest": every default-active rule qualifies.
    pub tool_version: Option<(u32, u32, u32)>,
    /// Rule ids (or aliases) forced active regardless of configuration.
    pub force_include: Vec<String>,
}

pub(crate) struct ActiveRule {
    pub(crate) rule: Box<dyn Rule>,
    pub(crate) metadata: &'static RuleMetadata,
    pub(crate) severity: Severity,
}

/// A named, ordered collection of constructed rule instances, plus the
/// path-exclusion patterns resolved for the set.
///
/// A rule set carries per-file mutable state (the rules' traversal scratch),
/// so it is built fresh for every concurrently processed file; only the
/// configuration store and the metadata behind it are shared.
pub struct RuleSet {
    pub id: String,
    pub(crate) rules: Vec<ActiveRule>,
    pub(crate) exclusions: Vec<Regex>,
    pub(crate) build_notices: Vec<Notice>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("id", &self.id)
            .field("rules", &self.rules.iter().map(|r| r.metadata.id).collect::<Vec<_>>())
            .field("exclusions", &self.exclusions)
            .field("build_notices", &self.build_notices)
            .finish()
    }
}

impl RuleSet {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|active| active.metadata.id).collect()
    }
}

/// Assembles a rule set from the configuration store.
pub struct RuleSetProvider {
    id: String,
    descriptors: Vec<RuleDescriptor>,
}

impl RuleSetProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), descriptors: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Registers a rule. Registration order is execution order, both for
    /// callbacks at a node and for same-node finding ordering.
    pub fn register(
        mut self,
        metadata: &'static RuleMetadata,
        factory: impl Fn(&RuleConfig) -> Result<Box<dyn Rule>, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        self.descriptors.push(RuleDescriptor { metadata, factory: Box::new(factory) });
        self
    }

    /// Builds the rule set: decides activation, resolves severities and
    /// per-rule options, compiles the set-level exclusion patterns. Any
    /// coercion failure aborts the whole build.
    pub fn instantiate(
        &self,
        config: &Config,
        policy: &ActivationPolicy,
    ) -> Result<RuleSet, ConfigError> {
        let set_config = config.sub(&self.id)?;

        let mut exclusions = Vec::new();
        for pattern in set_config.get_string_list("excludes", &[])? {
            exclusions.push(simple_pattern_to_regex(
                &pattern,
                &format!("{}.excludes", self.id),
            )?);
        }

        let mut rules = Vec::new();
        let mut build_notices = Vec::new();

        for descriptor in &self.descriptors {
            let metadata = descriptor.metadata;
            let rule_config = self.rule_table(&set_config, metadata)?;

            if !self.is_active(&rule_config, metadata, policy)? {
                continue;
            }

            let severity = resolve_severity(&rule_config, metadata)?;
            let typed = RuleConfig::new(rule_config, metadata.id);
            let rule = (descriptor.factory)(&typed)?;
            build_notices.extend(typed.take_deprecations());

            rules.push(ActiveRule { rule, metadata, severity });
        }

        Ok(RuleSet {
            id: self.id.clone(),
            rules,
            exclusions,
            build_notices,
        })
    }

    /// The rule's config table, probing legacy ids when the canonical id has
    /// no table of its own.
    fn rule_table(
        &self,
        set_config: &Config,
        metadata: &'static RuleMetadata,
    ) -> Result<Config, ConfigError> {
        if !set_config.has(metadata.id) {
            for alias in metadata.aliases {
                if set_config.has(alias) {
                    return set_config.sub(alias);
                }
            }
        }
        set_config.sub(metadata.id)
    }

    fn is_active(
        &self,
        rule_config: &Config,
        metadata: &'static RuleMetadata,
        policy: &ActivationPolicy,
    ) -> Result<bool, ConfigError> {
        let forced = policy
            .force_include
            .iter()
            .any(|id| id == metadata.id || metadata.aliases.contains(&id.as_str()));
        if forced {
            return Ok(true);
        }

        let default_active = match metadata.active_by_default_since {
            Some(since) => policy.tool_version.is_none_or(|version| version >= since),
            None => false,
        };
        rule_config.get_bool("active", default_active)
    }
}

fn resolve_severity(
    rule_config: &Config,
    metadata: &'static RuleMetadata,
) -> Result<Severity, ConfigError> {
    let name = rule_config.get_string("severity", metadata.default_severity.as_str())?;
    name.parse().map_err(|_| ConfigError::UnknownSeverity {
        key: format!("{}.severity", metadata.id),
        value: name,
    })
}
