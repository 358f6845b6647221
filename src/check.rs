use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::detektion::Detektion;
use crate::error::AnalyzerError;
use crate::extension::Extensions;
use crate::frontend::{FrontEnd, ParsedFile, SourceFile};
use crate::notification::Notification;
use crate::plan::ExecutionPlan;
use crate::settings::{Parallelism, Settings};
use crate::utils::isolate;

/// One file waiting for analysis, in whatever shape the caller had it.
#[derive(Debug)]
pub(crate) enum WorkUnit {
    Path(PathBuf),
    Source(SourceFile),
    Parsed(ParsedFile),
}

impl WorkUnit {
    fn path(&self) -> &Path {
        match self {
            Self::Path(path) => path,
            Self::Source(source) => &source.path,
            Self::Parsed(parsed) => parsed.path(),
        }
    }

    fn into_parsed(self, front_end: &dyn FrontEnd) -> anyhow::Result<ParsedFile> {
        let parsed = match self {
            Self::Path(path) => front_end.parse(&SourceFile::read(&path)?)?,
            Self::Source(source) => front_end.parse(&source)?,
            Self::Parsed(parsed) => parsed,
        };
        Ok(parsed)
    }
}

/// Everything a worker needs, shared by reference between all of them.
pub(crate) struct Checker<'a> {
    pub(crate) plan: &'a ExecutionPlan,
    pub(crate) front_end: &'a dyn FrontEnd,
    pub(crate) extensions: &'a Extensions,
    pub(crate) detektion: &'a Detektion,
}

impl Checker<'_> {
    /// Analyze every unit with the requested parallelism. Cancellation is
    /// checked before each file starts; files already started are finished.
    pub(crate) fn check(&self, units: Vec<WorkUnit>, settings: &Settings) -> Result<(), AnalyzerError> {
        let total = units.len();
        let process = |unit: WorkUnit| -> bool {
            if settings.cancellation.is_cancelled() {
                return false;
            }
            self.check_unit(unit);
            true
        };

        let completed = match settings.parallelism {
            Parallelism::Sequential => {
                let mut completed = 0;
                for unit in units {
                    if !process(unit) {
                        break;
                    }
                    completed += 1;
                }
                completed
            }
            Parallelism::Threads(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.get())
                    .build()?;
                pool.install(|| units.into_par_iter().map(process).filter(|done| *done).count())
            }
            Parallelism::Auto => units.into_par_iter().map(process).filter(|done| *done).count(),
        };

        if completed < total {
            let skipped = total - completed;
            tracing::warn!("Run cancelled after {completed} file(s), {skipped} file(s) skipped");
            self.detektion.notify(Notification::Cancelled { completed, skipped });
        }
        Ok(())
    }

    fn check_unit(&self, unit: WorkUnit) {
        let path = unit.path().to_path_buf();
        tracing::trace!("Analyzing {}", path.display());

        let analysis = isolate(|| {
            let parsed = unit.into_parsed(self.front_end)?;
            Ok(self.plan.analyze(parsed))
        });
        let mut analysis = match analysis {
            Ok(analysis) => analysis,
            Err(cause) => {
                tracing::warn!("Could not analyze {}: {cause}", path.display());
                self.detektion.notify(Notification::FileAnalysisFailed { path, cause });
                return;
            }
        };

        if !self.extensions.is_empty() {
            self.extensions
                .on_file(&path, &mut analysis.result.findings, self.detektion);
        }
        for failure in analysis.failures {
            self.detektion.notify(failure);
        }
        self.detektion.add_findings(analysis.result);
    }
}
