use std::fmt;

use crate::config::Config;
use crate::finding::Severity;
use crate::rule::{CorrectableRule, Rule, RuleInstance};

type RuleFactory = dyn Fn(&dyn Config) -> anyhow::Result<RuleInstance> + Send + Sync;

/// Metadata of a rule plus the constructor building it from its config
/// section. Constructing is deferred so inactive rules are never built.
pub struct RuleDefinition {
    id: String,
    description: String,
    severity: Severity,
    aliases: Vec<String>,
    active_by_default: bool,
    auto_correct_by_default: bool,
    correctable: bool,
    requires_resolution: bool,
    factory: Box<RuleFactory>,
}

impl RuleDefinition {
    fn with_factory(id: impl Into<String>, correctable: bool, factory: Box<RuleFactory>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            severity: Severity::default(),
            aliases: Vec::new(),
            active_by_default: false,
            auto_correct_by_default: true,
            correctable,
            requires_resolution: false,
            factory,
        }
    }

    /// Declare a rule that only reports.
    pub fn inspecting<R, F>(id: impl Into<String>, factory: F) -> Self
    where
        R: Rule + 'static,
        F: Fn(&dyn Config) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self::with_factory(
            id,
            false,
            Box::new(move |config: &dyn Config| -> anyhow::Result<RuleInstance> {
                Ok(RuleInstance::inspecting(factory(config)?))
            }),
        )
    }

    /// Declare a rule that can also rewrite the tree.
    pub fn correctable<R, F>(id: impl Into<String>, factory: F) -> Self
    where
        R: CorrectableRule + 'static,
        F: Fn(&dyn Config) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self::with_factory(
            id,
            true,
            Box::new(move |config: &dyn Config| -> anyhow::Result<RuleInstance> {
                Ok(RuleInstance::correctable(factory(config)?))
            }),
        )
    }

    pub fn active_by_default(mut self) -> Self {
        self.active_by_default = true;
        self
    }

    pub fn auto_correct_by_default(mut self, auto_correct: bool) -> Self {
        self.auto_correct_by_default = auto_correct;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Another name suppression markers may use for this rule.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// The rule needs a resolution context and is skipped on files without one.
    pub fn requires_resolution(mut self) -> Self {
        self.requires_resolution = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn default_severity(&self) -> Severity {
        self.severity
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn is_active_by_default(&self) -> bool {
        self.active_by_default
    }

    pub fn is_auto_correct_by_default(&self) -> bool {
        self.auto_correct_by_default
    }

    pub fn is_correctable(&self) -> bool {
        self.correctable
    }

    pub fn needs_resolution(&self) -> bool {
        self.requires_resolution
    }

    /// Build the rule from its own config section.
    pub fn build(&self, config: &dyn Config) -> anyhow::Result<RuleInstance> {
        (self.factory)(config)
    }
}

impl fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("active_by_default", &self.active_by_default)
            .field("correctable", &self.correctable)
            .finish_non_exhaustive()
    }
}

/// A named group of rule definitions, in the order the provider declared
/// them.
#[derive(Debug)]
pub struct RuleSet {
    id: String,
    rules: Vec<RuleDefinition>,
}

impl RuleSet {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), rules: Vec::new() }
    }

    /// Add a rule. A rule with the same id replaces the earlier one in place.
    pub fn with_rule(mut self, rule: RuleDefinition) -> Self {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn rule(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rule(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Factory of one rule set, registered by a plugin before the run.
pub trait RuleSetProvider: Send + Sync {
    /// Stable id, also the name of the rule set's config section.
    fn rule_set_id(&self) -> &str;

    /// Build the rule set. `config` is the rule set's own section.
    fn instance(&self, config: &dyn Config) -> RuleSet;
}
