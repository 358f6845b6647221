use std::any::{Any, TypeId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::finding::Finding;
use crate::notification::Notification;
use crate::tree::SyntaxTree;

/// Typed key of a user data entry. Extensions declare a unit struct per
/// entry they publish.
///
/// ```
/// use inspekt::detektion::{Detektion, UserDataKey};
///
/// struct LinesOfCode;
///
/// impl UserDataKey for LinesOfCode {
///     type Value = usize;
/// }
///
/// let detektion = Detektion::new();
/// detektion.set_user_data::<LinesOfCode>(42);
/// assert_eq!(detektion.user_data::<LinesOfCode>().as_deref(), Some(&42));
/// ```
pub trait UserDataKey: 'static {
    type Value: Send + Sync + 'static;
}

/// Everything one file contributed to the run.
#[derive(Debug)]
pub struct FileResult {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
    pub suppressed: Vec<Finding>,
    /// The tree after correction, when a correcting rule modified it.
    pub corrected: Option<SyntaxTree>,
}

impl FileResult {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            findings: Vec::new(),
            suppressed: Vec::new(),
            corrected: None,
        }
    }
}

/// Aggregate result of a run.
///
/// Workers append to it concurrently through `&self`. Findings are only
/// ever added, and the accessors return them in total order.
#[derive(Default)]
pub struct Detektion {
    findings: Mutex<Vec<Finding>>,
    suppressed: Mutex<Vec<Finding>>,
    notifications: Mutex<Vec<Notification>>,
    corrected: Mutex<Vec<SyntaxTree>>,
    analyzed: Mutex<Vec<PathBuf>>,
    user_data: RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Detektion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_findings(&self, result: FileResult) {
        let FileResult { path, findings, suppressed, corrected } = result;
        self.findings.lock().extend(findings);
        self.suppressed.lock().extend(suppressed);
        if let Some(tree) = corrected {
            self.notify(Notification::Corrected { path: path.clone() });
            self.corrected.lock().push(tree);
        }
        self.analyzed.lock().push(path);
    }

    /// Record findings silenced outside of the tree, for instance by an
    /// extension.
    pub fn add_suppressed(&self, findings: impl IntoIterator<Item = Finding>) {
        self.suppressed.lock().extend(findings);
    }

    pub fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    /// Unsuppressed findings, sorted.
    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = self.findings.lock().clone();
        findings.sort();
        findings
    }

    /// Findings of one rule set, sorted.
    pub fn findings_by_rule_set(&self, rule_set_id: &str) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .findings
            .lock()
            .iter()
            .filter(|f| f.rule_set_id == rule_set_id)
            .cloned()
            .collect();
        findings.sort();
        findings
    }

    /// Findings silenced by a suppression marker or an extension, sorted.
    pub fn suppressed(&self) -> Vec<Finding> {
        let mut suppressed = self.suppressed.lock().clone();
        suppressed.sort();
        suppressed
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed.lock().len()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Trees modified by correcting rules, sorted by path.
    pub fn corrected_files(&self) -> Vec<SyntaxTree> {
        let mut trees = self.corrected.lock().clone();
        trees.sort_by(|a, b| a.path().cmp(b.path()));
        trees
    }

    pub fn corrected_file(&self, path: &Path) -> Option<SyntaxTree> {
        self.corrected.lock().iter().find(|t| t.path() == path).cloned()
    }

    /// Paths of the files that went through analysis, sorted.
    pub fn analyzed_files(&self) -> Vec<PathBuf> {
        let mut analyzed = self.analyzed.lock().clone();
        analyzed.sort();
        analyzed
    }

    /// No finding and no error notification.
    pub fn is_clean(&self) -> bool {
        self.findings.lock().is_empty() && !self.has_failures()
    }

    /// At least one part of the run failed and was skipped.
    pub fn has_failures(&self) -> bool {
        self.notifications.lock().iter().any(Notification::is_error)
    }

    pub fn was_cancelled(&self) -> bool {
        self.notifications
            .lock()
            .iter()
            .any(|n| matches!(n, Notification::Cancelled { .. }))
    }

    pub fn set_user_data<K: UserDataKey>(&self, value: K::Value) {
        self.user_data.write().insert(TypeId::of::<K>(), Arc::new(value));
    }

    pub fn user_data<K: UserDataKey>(&self) -> Option<Arc<K::Value>> {
        let entry = self.user_data.read().get(&TypeId::of::<K>()).cloned()?;
        entry.downcast::<K::Value>().ok()
    }

    /// Bring the aggregate into its final, deterministic shape. Running it
    /// again is harmless.
    pub(crate) fn finalize(&self) {
        self.findings.lock().sort();
        self.suppressed.lock().sort();
        self.analyzed.lock().sort();
        self.corrected.lock().sort_by(|a, b| a.path().cmp(b.path()));

        let mut notifications = self.notifications.lock();
        let mut merged = Notification::merge_rule_failures(std::mem::take(&mut *notifications));
        merged.sort();
        *notifications = merged;
    }
}

impl std::fmt::Debug for Detektion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detektion")
            .field("findings", &self.findings.lock().len())
            .field("suppressed", &self.suppressed.lock().len())
            .field("notifications", &self.notifications.lock().len())
            .field("corrected", &self.corrected.lock().len())
            .finish_non_exhaustive()
    }
}
