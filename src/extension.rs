use std::path::Path;
use std::sync::Arc;

use crate::detektion::Detektion;
use crate::finding::Finding;
use crate::notification::{Hook, Notification};
use crate::utils::isolate;

/// Hooks into a run. Every hook has a no-op default.
///
/// Hooks of all registered extensions run in registration order. A failing
/// hook (error or panic) is reported as a notification and the run goes on.
pub trait Extension: Send + Sync {
    fn id(&self) -> &str;

    /// Called once before the first file is analyzed.
    fn on_start(&self, _detektion: &Detektion) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once per file, after its rules ran and before its findings are
    /// added to the aggregate. May rewrite, drop or suppress findings. When
    /// the hook fails, its edits are discarded.
    ///
    /// Runs on worker threads, possibly for several files at once.
    fn on_file(&self, _path: &Path, _findings: &mut Vec<Finding>, _detektion: &Detektion) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once after every file was analyzed and the aggregate sorted.
    fn on_finish(&self, _detektion: &Detektion) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Registered extensions of one run.
#[derive(Clone, Default)]
pub(crate) struct Extensions(Vec<Arc<dyn Extension>>);

impl Extensions {
    pub(crate) fn new(extensions: Vec<Arc<dyn Extension>>) -> Self {
        Self(extensions)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn on_start(&self, detektion: &Detektion) {
        for extension in &self.0 {
            if let Err(cause) = isolate(|| extension.on_start(detektion)) {
                failed(detektion, extension.as_ref(), Hook::Start, cause);
            }
        }
    }

    pub(crate) fn on_file(&self, path: &Path, findings: &mut Vec<Finding>, detektion: &Detektion) {
        for extension in &self.0 {
            let mut edited = findings.clone();
            match isolate(|| extension.on_file(path, &mut edited, detektion)) {
                Ok(()) => *findings = edited,
                Err(cause) => failed(detektion, extension.as_ref(), Hook::File, cause),
            }
        }
    }

    pub(crate) fn on_finish(&self, detektion: &Detektion) {
        for extension in &self.0 {
            if let Err(cause) = isolate(|| extension.on_finish(detektion)) {
                failed(detektion, extension.as_ref(), Hook::Finish, cause);
            }
        }
    }
}

fn failed(detektion: &Detektion, extension: &dyn Extension, hook: Hook, cause: String) {
    tracing::warn!("Extension `{}` failed in {hook}: {cause}", extension.id());
    detektion.notify(Notification::ExtensionFailed {
        extension_id: extension.id().to_string(),
        hook,
        cause,
    });
}
