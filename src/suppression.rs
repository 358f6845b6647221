use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, SyntaxTree};

/// Marker name matching every rule.
pub const ALL: &str = "all";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Drop findings of the named rules in this scope.
    Suppress,
    /// Keep findings of the named rules in this scope, even if an enclosing
    /// scope suppresses them.
    Unsuppress,
}

/// Annotation-like marker attached to a node by the front-end.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuppressionMarker {
    pub kind: MarkerKind,
    /// Rule ids, rule aliases, rule set ids, `ruleset:RuleId`, or `all`.
    pub names: Vec<String>,
    pub reason: Option<String>,
}

impl SuppressionMarker {
    pub fn suppress<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: MarkerKind::Suppress,
            names: names.into_iter().map(Into::into).collect(),
            reason: None,
        }
    }

    pub fn unsuppress<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: MarkerKind::Unsuppress,
            names: names.into_iter().map(Into::into).collect(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn matched_name(&self, rule: &RuleIdentity) -> Option<&str> {
        self.names
            .iter()
            .map(|name| name.trim())
            .find(|name| rule.is_named(name))
    }
}

/// Everything a marker may use to name a rule.
#[derive(Clone, Copy, Debug)]
pub struct RuleIdentity<'a> {
    pub rule_set_id: &'a str,
    pub rule_id: &'a str,
    pub aliases: &'a [String],
}

impl RuleIdentity<'_> {
    fn is_named(&self, name: &str) -> bool {
        if name.eq_ignore_ascii_case(ALL) || name == self.rule_id || name == self.rule_set_id {
            return true;
        }
        if self.aliases.iter().any(|alias| alias == name) {
            return true;
        }
        match name.split_once(':') {
            Some((rule_set, rule)) => rule_set == self.rule_set_id && rule == self.rule_id,
            None => false,
        }
    }
}

/// Return the suppression reason if a finding of `rule` at `node` is
/// suppressed.
///
/// Scopes are searched from `node` outwards and the closest marker naming
/// the rule decides: a `Suppress` marker drops the finding, an `Unsuppress`
/// marker keeps it regardless of what enclosing scopes say.
pub fn suppression_reason(tree: &SyntaxTree, node: NodeId, rule: &RuleIdentity) -> Option<String> {
    for scope in tree.marked_scopes(node) {
        for marker in tree.markers(scope) {
            let Some(name) = marker.matched_name(rule) else {
                continue;
            };
            return match marker.kind {
                MarkerKind::Suppress => Some(
                    marker
                        .reason
                        .clone()
                        .unwrap_or_else(|| format!("Suppressed by marker naming `{name}`")),
                ),
                MarkerKind::Unsuppress => None,
            };
        }
    }
    None
}
