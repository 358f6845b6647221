use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detektion::Detektion;
use crate::extension::Extension;
use crate::finding::Finding;

const SUPPRESSION_REASON: &str = "Listed in baseline";

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("Failed to read baseline {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write baseline {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse baseline {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Findings accepted as known, identified by [Finding::signature] so they
/// survive unrelated edits moving them to other lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    /// Entries added by hand. Kept when the baseline is regenerated.
    #[serde(default)]
    pub manually_suppressed: BTreeSet<String>,
    #[serde(default)]
    pub current_issues: BTreeSet<String>,
}

impl Baseline {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        Self {
            manually_suppressed: BTreeSet::new(),
            current_issues: findings.into_iter().map(Finding::signature).collect(),
        }
    }

    /// Replace the current issues, keeping manual entries.
    pub fn update<'a>(&self, findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        Self {
            manually_suppressed: self.manually_suppressed.clone(),
            ..Self::from_findings(findings)
        }
    }

    pub fn contains(&self, finding: &Finding) -> bool {
        let signature = finding.signature();
        self.current_issues.contains(&signature) || self.manually_suppressed.contains(&signature)
    }

    pub fn len(&self) -> usize {
        self.current_issues.len() + self.manually_suppressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| BaselineError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&contents)
            .map_err(|source| BaselineError::Parse { path: path.to_path_buf(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), BaselineError> {
        let write_error = |source| BaselineError::Write { path: path.to_path_buf(), source };
        let contents = serde_json::to_string_pretty(self).map_err(|e| write_error(e.into()))?;
        fs::write(path, contents + "\n").map_err(write_error)
    }
}

/// Moves findings listed in a [Baseline] to the suppressed findings.
#[derive(Clone, Debug)]
pub struct BaselineExtension {
    baseline: Baseline,
}

impl BaselineExtension {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    /// Load the baseline at `path`. A missing file is an empty baseline.
    pub fn from_file(path: &Path) -> Result<Self, BaselineError> {
        if !path.exists() {
            tracing::debug!("No baseline at {}", path.display());
            return Ok(Self::new(Baseline::default()));
        }
        Ok(Self::new(Baseline::load(path)?))
    }
}

impl Extension for BaselineExtension {
    fn id(&self) -> &str {
        "baseline"
    }

    fn on_file(&self, path: &Path, findings: &mut Vec<Finding>, detektion: &Detektion) -> anyhow::Result<()> {
        if self.baseline.is_empty() {
            return Ok(());
        }
        let (known, new): (Vec<Finding>, Vec<Finding>) =
            std::mem::take(findings).into_iter().partition(|f| self.baseline.contains(f));
        if !known.is_empty() {
            tracing::trace!("{} baseline finding(s) in {}", known.len(), path.display());
        }
        detektion.add_suppressed(known.iter().map(|f| f.suppressed(SUPPRESSION_REASON)));
        *findings = new;
        Ok(())
    }
}
