use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown severity: {s}")),
        }
    }
}

/// One reported problem. Never mutated once created; extensions that want to
/// annotate a finding build a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub rule_set_id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    pub suppression: Option<String>,
}

impl Finding {
    pub fn new(
        rule_set_id: impl Into<String>,
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_set_id: rule_set_id.into(),
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
            suppression: None,
        }
    }

    /// Copy of this finding marked as suppressed for `reason`.
    pub fn suppressed(&self, reason: impl Into<String>) -> Self {
        Self { suppression: Some(reason.into()), ..self.clone() }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_some()
    }

    /// Stable identity of a finding across runs, independent of its line.
    pub fn signature(&self) -> String {
        format!(
            "{}:{}:{}",
            self.rule_id,
            self.location.path.display(),
            self.message
        )
    }
}

impl Ord for Finding {
    fn cmp(&self, other: &Self) -> Ordering {
        // Path, line, column and rule id first, the rest only breaks ties so
        // the order is total.
        self.location
            .path
            .cmp(&other.location.path)
            .then(self.location.line.cmp(&other.location.line))
            .then(self.location.column.cmp(&other.location.column))
            .then_with(|| self.rule_id.cmp(&other.rule_id))
            .then_with(|| self.rule_set_id.cmp(&other.rule_set_id))
            .then_with(|| self.location.cmp(&other.location))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.severity.cmp(&other.severity))
            .then_with(|| self.suppression.cmp(&other.suppression))
    }
}

impl PartialOrd for Finding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}/{} {}",
            self.location, self.severity, self.rule_set_id, self.rule_id, self.message
        )
    }
}
