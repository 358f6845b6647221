use std::path::{Path, PathBuf};

use crate::detektion::FileResult;
use crate::finding::Severity;
use crate::frontend::{ParsedFile, ResolutionContext};
use crate::notification::Notification;
use crate::path_filter::PathFilters;
use crate::rule::{CorrectableRule, RuleContext, RuleInstance};
use crate::utils::isolate;

/// A constructed rule together with the settings resolved for it.
pub(crate) struct PlannedRule<R> {
    pub(crate) id: String,
    pub(crate) severity: Severity,
    pub(crate) aliases: Vec<String>,
    pub(crate) requires_resolution: bool,
    pub(crate) filters: PathFilters,
    pub(crate) rule: R,
}

impl<R> PlannedRule<R> {
    fn applies(&self, path: &Path, has_resolution: bool) -> bool {
        if self.requires_resolution && !has_resolution {
            tracing::trace!("Skipping {} on {}: no resolution context", self.id, path.display());
            return false;
        }
        self.filters.matches(path)
    }

    fn context<'a>(
        &'a self,
        rule_set_id: &'a str,
        resolution: Option<&'a ResolutionContext>,
    ) -> RuleContext<'a> {
        RuleContext::new(rule_set_id, &self.id, self.severity)
            .with_aliases(&self.aliases)
            .with_resolution(resolution)
    }
}

/// Active rules of one rule set, split by phase. Both groups keep the
/// declared order.
pub(crate) struct RuleSetPlan {
    pub(crate) id: String,
    pub(crate) filters: PathFilters,
    pub(crate) correcting: Vec<PlannedRule<Box<dyn CorrectableRule>>>,
    pub(crate) inspecting: Vec<PlannedRule<RuleInstance>>,
}

impl RuleSetPlan {
    pub(crate) fn new(id: impl Into<String>, filters: PathFilters) -> Self {
        Self {
            id: id.into(),
            filters,
            correcting: Vec::new(),
            inspecting: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.correcting.len() + self.inspecting.len()
    }
}

/// The rules of a run, constructed once and shared by every worker.
#[derive(Default)]
pub struct ExecutionPlan {
    rule_sets: Vec<RuleSetPlan>,
}

impl ExecutionPlan {
    pub(crate) fn push(&mut self, rule_set: RuleSetPlan) {
        self.rule_sets.push(rule_set);
    }

    /// Rule ids in the order they run on each file, grouped by rule set.
    pub fn rule_order(&self) -> Vec<(&str, Vec<&str>)> {
        self.rule_sets
            .iter()
            .map(|rule_set| {
                let correcting = rule_set.correcting.iter().map(|r| r.id.as_str());
                let inspecting = rule_set.inspecting.iter().map(|r| r.id.as_str());
                (rule_set.id.as_str(), correcting.chain(inspecting).collect())
            })
            .collect()
    }

    /// Ids of the rules that rewrite trees.
    pub fn correcting_rules(&self) -> Vec<&str> {
        self.rule_sets
            .iter()
            .flat_map(|rule_set| rule_set.correcting.iter().map(|r| r.id.as_str()))
            .collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rule_sets.iter().map(RuleSetPlan::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    /// Run every applicable rule on one file.
    ///
    /// Per rule set, the correcting rules run first, each on the output of
    /// the previous one, then the tree is frozen and the inspecting rules
    /// run. A rule that fails is reported, its findings on this file are
    /// dropped and its edits are rolled back.
    pub(crate) fn analyze(&self, parsed: ParsedFile) -> FileAnalysis {
        let ParsedFile { mut tree, resolution } = parsed;
        let mut analysis = FileAnalysis::new(tree.path());
        let path = analysis.result.path.clone();

        for rule_set in &self.rule_sets {
            if !rule_set.filters.matches(&path) {
                tracing::trace!("Rule set {} excludes {}", rule_set.id, path.display());
                continue;
            }

            for planned in &rule_set.correcting {
                if !planned.applies(&path, resolution.is_some()) {
                    continue;
                }
                let mut context = planned.context(&rule_set.id, resolution.as_ref());
                let checkpoint = tree.checkpoint();
                let outcome = isolate(|| planned.rule.correct(&mut tree, &mut context));
                if outcome.is_err() {
                    tree.rollback(checkpoint);
                } else {
                    tree.commit();
                }
                analysis.record(&rule_set.id, &planned.id, context, outcome);
            }

            let tree = &tree;
            for planned in &rule_set.inspecting {
                if !planned.applies(&path, resolution.is_some()) {
                    continue;
                }
                let mut context = planned.context(&rule_set.id, resolution.as_ref());
                let outcome = isolate(|| planned.rule.visit(tree, &mut context));
                analysis.record(&rule_set.id, &planned.id, context, outcome);
            }
        }

        if tree.is_modified() {
            analysis.result.corrected = Some(tree);
        }
        analysis
    }
}

impl std::fmt::Debug for ExecutionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("rule_order", &self.rule_order())
            .finish()
    }
}

/// Result of analyzing one file, before it is merged into the aggregate.
#[derive(Debug)]
pub(crate) struct FileAnalysis {
    pub(crate) result: FileResult,
    pub(crate) failures: Vec<Notification>,
}

impl FileAnalysis {
    fn new(path: &Path) -> Self {
        Self { result: FileResult::new(path), failures: Vec::new() }
    }

    fn record(
        &mut self,
        rule_set_id: &str,
        rule_id: &str,
        context: RuleContext<'_>,
        outcome: Result<(), String>,
    ) {
        match outcome {
            Ok(()) => {
                let (findings, suppressed) = context.into_parts();
                self.result.findings.extend(findings);
                self.result.suppressed.extend(suppressed);
            }
            Err(cause) => {
                tracing::warn!(
                    "Rule {rule_set_id}/{rule_id} failed on {}: {cause}",
                    self.result.path.display()
                );
                self.failures.push(Notification::RuleExecutionFailed {
                    rule_set_id: rule_set_id.to_string(),
                    rule_id: rule_id.to_string(),
                    files: vec![PathBuf::from(&self.result.path)],
                    cause,
                });
            }
        }
    }
}
