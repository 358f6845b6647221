use std::collections::BTreeMap;

use serde::Serialize;

use crate::detektion::{Detektion, UserDataKey};
use crate::extension::Extension;

/// Counts of a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FindingStatistics {
    pub files: usize,
    pub findings: usize,
    pub suppressed: usize,
    /// Findings per `ruleset/Rule`.
    pub by_rule: BTreeMap<String, usize>,
    pub by_rule_set: BTreeMap<String, usize>,
}

/// User data key under which [StatisticsExtension] publishes its counts.
pub struct Statistics;

impl UserDataKey for Statistics {
    type Value = FindingStatistics;
}

/// Publishes [FindingStatistics] once the run is finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatisticsExtension;

impl Extension for StatisticsExtension {
    fn id(&self) -> &str {
        "statistics"
    }

    fn on_finish(&self, detektion: &Detektion) -> anyhow::Result<()> {
        let findings = detektion.findings();
        let mut statistics = FindingStatistics {
            files: detektion.analyzed_files().len(),
            findings: findings.len(),
            suppressed: detektion.suppressed_count(),
            ..Default::default()
        };
        for finding in &findings {
            *statistics
                .by_rule
                .entry(format!("{}/{}", finding.rule_set_id, finding.rule_id))
                .or_default() += 1;
            *statistics
                .by_rule_set
                .entry(finding.rule_set_id.clone())
                .or_default() += 1;
        }
        detektion.set_user_data::<Statistics>(statistics);
        Ok(())
    }
}
