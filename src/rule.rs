use crate::finding::{Finding, Severity};
use crate::frontend::ResolutionContext;
use crate::location::Location;
use crate::suppression::{RuleIdentity, suppression_reason};
use crate::tree::{NodeId, SyntaxTree};

/// Inspects a syntax tree and reports findings through its [RuleContext].
///
/// A rule instance is built for one run from its config section and is
/// shared by every worker of that run, so it must not keep mutable state
/// between files.
pub trait Rule: Send + Sync {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()>;
}

/// A rule able to rewrite the tree to fix what it reports.
///
/// `correct` is only called when autocorrection is enabled for the rule;
/// otherwise the rule runs through [Rule::visit] like any other rule.
pub trait CorrectableRule: Rule {
    fn correct(&self, tree: &mut SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()>;
}

/// A constructed rule, tagged with its capability.
pub enum RuleInstance {
    Inspecting(Box<dyn Rule>),
    Correctable(Box<dyn CorrectableRule>),
}

impl RuleInstance {
    pub fn inspecting(rule: impl Rule + 'static) -> Self {
        Self::Inspecting(Box::new(rule))
    }

    pub fn correctable(rule: impl CorrectableRule + 'static) -> Self {
        Self::Correctable(Box::new(rule))
    }

    pub fn is_correctable(&self) -> bool {
        matches!(self, Self::Correctable(_))
    }

    /// Read-only inspection, available for both capabilities.
    pub fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        match self {
            Self::Inspecting(rule) => rule.visit(tree, context),
            Self::Correctable(rule) => rule.visit(tree, context),
        }
    }
}

impl std::fmt::Debug for RuleInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inspecting(_) => f.write_str("RuleInstance::Inspecting"),
            Self::Correctable(_) => f.write_str("RuleInstance::Correctable"),
        }
    }
}

/// Side channel through which a rule reports findings while it visits one
/// file. Suppression is decided as soon as a finding is reported, against
/// the tree as it is at that moment.
#[derive(Debug)]
pub struct RuleContext<'a> {
    rule_set_id: &'a str,
    rule_id: &'a str,
    severity: Severity,
    aliases: &'a [String],
    resolution: Option<&'a ResolutionContext>,
    findings: Vec<Finding>,
    suppressed: Vec<Finding>,
}

impl<'a> RuleContext<'a> {
    pub fn new(rule_set_id: &'a str, rule_id: &'a str, severity: Severity) -> Self {
        Self {
            rule_set_id,
            rule_id,
            severity,
            aliases: &[],
            resolution: None,
            findings: Vec::new(),
            suppressed: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &'a [String]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_resolution(mut self, resolution: Option<&'a ResolutionContext>) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn rule_id(&self) -> &str {
        self.rule_id
    }

    pub fn rule_set_id(&self) -> &str {
        self.rule_set_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn resolution(&self) -> Option<&'a ResolutionContext> {
        self.resolution
    }

    /// Report a finding covering `node`.
    pub fn report(&mut self, tree: &SyntaxTree, node: NodeId, message: impl Into<String>) {
        // Detached nodes have no position any more and are reported at 0:0.
        let location = match tree.span(node) {
            Some(span) => Location::from_span(tree.path(), span),
            None => Location::new(tree.path(), 0, 0),
        };
        let finding = Finding::new(self.rule_set_id, self.rule_id, self.severity, message, location);

        let identity = RuleIdentity {
            rule_set_id: self.rule_set_id,
            rule_id: self.rule_id,
            aliases: self.aliases,
        };
        match suppression_reason(tree, node, &identity) {
            Some(reason) => self.suppressed.push(finding.suppressed(reason)),
            None => self.findings.push(finding),
        }
    }

    /// Findings reported so far that were not suppressed.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn suppressed(&self) -> &[Finding] {
        &self.suppressed
    }

    pub(crate) fn into_parts(self) -> (Vec<Finding>, Vec<Finding>) {
        (self.findings, self.suppressed)
    }
}
