use std::fmt;
use std::path::PathBuf;

use crate::config::Deprecation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// The extension hook a failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hook {
    Start,
    File,
    Finish,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "on_start",
            Self::File => "on_file",
            Self::Finish => "on_finish",
        };
        f.write_str(name)
    }
}

/// Something the run wants its caller to know that is not a finding.
///
/// A run with failures still completes; these notices are how a caller
/// tells a clean run apart from one where parts were skipped.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Notification {
    RuleSetConstructionFailed {
        rule_set_id: String,
        cause: String,
    },
    RuleConstructionFailed {
        rule_set_id: String,
        rule_id: String,
        cause: String,
    },
    /// A rule failed on one or more files. Findings it reported on those
    /// files before failing are discarded.
    RuleExecutionFailed {
        rule_set_id: String,
        rule_id: String,
        files: Vec<PathBuf>,
        cause: String,
    },
    /// A file could not be read or parsed, or its analysis failed outside of
    /// any rule.
    FileAnalysisFailed {
        path: PathBuf,
        cause: String,
    },
    ExtensionFailed {
        extension_id: String,
        hook: Hook,
        cause: String,
    },
    DeprecatedConfig(Deprecation),
    /// A correcting rule modified this file.
    Corrected {
        path: PathBuf,
    },
    Cancelled {
        completed: usize,
        skipped: usize,
    },
}

impl Notification {
    pub fn level(&self) -> Level {
        match self {
            Self::RuleSetConstructionFailed { .. }
            | Self::RuleConstructionFailed { .. }
            | Self::RuleExecutionFailed { .. }
            | Self::FileAnalysisFailed { .. }
            | Self::ExtensionFailed { .. } => Level::Error,
            Self::DeprecatedConfig(_) | Self::Cancelled { .. } => Level::Warning,
            Self::Corrected { .. } => Level::Info,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level() == Level::Error
    }

    /// Merge per-file rule failures into one notice per rule. The cause kept
    /// is the one of the first file in path order.
    pub(crate) fn merge_rule_failures(notifications: Vec<Notification>) -> Vec<Notification> {
        let mut merged: Vec<Notification> = Vec::with_capacity(notifications.len());
        for notification in notifications {
            let Self::RuleExecutionFailed { rule_set_id, rule_id, files, cause } = notification
            else {
                merged.push(notification);
                continue;
            };
            let existing = merged.iter_mut().find_map(|known| match known {
                Self::RuleExecutionFailed {
                    rule_set_id: known_set,
                    rule_id: known_rule,
                    files,
                    cause,
                } if *known_set == rule_set_id && *known_rule == rule_id => Some((files, cause)),
                _ => None,
            });
            match existing {
                Some((known_files, known_cause)) => {
                    let first_new = files.iter().min().cloned();
                    let first_known = known_files.iter().min().cloned();
                    if first_new < first_known {
                        *known_cause = cause;
                    }
                    known_files.extend(files);
                    known_files.sort();
                    known_files.dedup();
                }
                None => merged.push(Self::RuleExecutionFailed { rule_set_id, rule_id, files, cause }),
            }
        }
        merged
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleSetConstructionFailed { rule_set_id, cause } => {
                write!(f, "Could not construct rule set `{rule_set_id}`: {cause}")
            }
            Self::RuleConstructionFailed { rule_set_id, rule_id, cause } => {
                write!(f, "Could not construct rule `{rule_set_id}/{rule_id}`: {cause}")
            }
            Self::RuleExecutionFailed { rule_set_id, rule_id, files, cause } => {
                let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "Rule `{rule_set_id}/{rule_id}` failed on {}: {cause}",
                    files.join(", ")
                )
            }
            Self::FileAnalysisFailed { path, cause } => {
                write!(f, "Could not analyze {}: {cause}", path.display())
            }
            Self::ExtensionFailed { extension_id, hook, cause } => {
                write!(f, "Extension `{extension_id}` failed in {hook}: {cause}")
            }
            Self::DeprecatedConfig(deprecation) => write!(f, "{deprecation}"),
            Self::Corrected { path } => write!(f, "Corrected {}", path.display()),
            Self::Cancelled { completed, skipped } => write!(
                f,
                "Run cancelled after {completed} file(s), {skipped} file(s) skipped"
            ),
        }
    }
}
