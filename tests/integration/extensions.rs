use std::path::Path;
use std::sync::Arc;

use inspekt::detektion::UserDataKey;
use inspekt::extension::Extension;
use inspekt::extensions::{Statistics, StatisticsExtension};
use inspekt::frontend::SourceFile;
use inspekt::notification::Hook;
use inspekt::rules::FormattingProvider;
use inspekt::{Detektion, Finding, Notification, Parallelism, Settings};
use parking_lot::Mutex;

use crate::helpers::*;

/// Records every hook call it receives.
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Extension for Recorder {
    fn id(&self) -> &str {
        "recorder"
    }

    fn on_start(&self, _detektion: &Detektion) -> anyhow::Result<()> {
        self.calls.lock().push("start".to_string());
        Ok(())
    }

    fn on_file(&self, path: &Path, findings: &mut Vec<Finding>, _detektion: &Detektion) -> anyhow::Result<()> {
        self.calls.lock().push(format!("file {} ({})", path.display(), findings.len()));
        Ok(())
    }

    fn on_finish(&self, detektion: &Detektion) -> anyhow::Result<()> {
        self.calls.lock().push(format!("finish ({})", detektion.findings().len()));
        Ok(())
    }
}

/// Drops every finding of one rule.
struct Veto(&'static str);

impl Extension for Veto {
    fn id(&self) -> &str {
        "veto"
    }

    fn on_file(&self, _path: &Path, findings: &mut Vec<Finding>, _detektion: &Detektion) -> anyhow::Result<()> {
        findings.retain(|f| f.rule_id != self.0);
        Ok(())
    }
}

struct Summary;

impl UserDataKey for Summary {
    type Value = String;
}

/// Reads what [StatisticsExtension] published and publishes a summary.
struct Summarize;

impl Extension for Summarize {
    fn id(&self) -> &str {
        "summarize"
    }

    fn on_finish(&self, detektion: &Detektion) -> anyhow::Result<()> {
        let statistics = detektion
            .user_data::<Statistics>()
            .ok_or_else(|| anyhow::anyhow!("statistics missing"))?;
        detektion.set_user_data::<Summary>(format!(
            "{} finding(s) in {} file(s)",
            statistics.findings, statistics.files
        ));
        Ok(())
    }
}

struct Broken;

impl Extension for Broken {
    fn id(&self) -> &str {
        "broken"
    }

    fn on_start(&self, _detektion: &Detektion) -> anyhow::Result<()> {
        anyhow::bail!("cannot start")
    }

    fn on_file(&self, _path: &Path, findings: &mut Vec<Finding>, _detektion: &Detektion) -> anyhow::Result<()> {
        findings.clear();
        panic!("boom")
    }
}

/// Fails after every file has been analyzed.
struct LateFailure;

impl Extension for LateFailure {
    fn id(&self) -> &str {
        "late"
    }

    fn on_finish(&self, _detektion: &Detektion) -> anyhow::Result<()> {
        anyhow::bail!("too late")
    }
}

fn files() -> Vec<SourceFile> {
    vec![
        SourceFile::new("a.txt", "\tone \n"),
        SourceFile::new("b.txt", "two // TODO: later\n"),
    ]
}

#[test]
fn test_hooks_run_in_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(Recorder { calls: Arc::clone(&calls) })
        .with_settings(Settings::default().with_parallelism(Parallelism::Sequential))
        .run_sources(files())
        .unwrap();

    let calls = calls.lock().clone();
    insta::assert_debug_snapshot!(calls, @r#"
    [
        "start",
        "file a.txt (2)",
        "file b.txt (1)",
        "finish (3)",
    ]
    "#);
}

#[test]
fn test_extension_can_veto_findings() {
    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(Veto("NoTabs"))
        .run_sources(files())
        .unwrap();

    let rules: Vec<String> = detektion.findings().into_iter().map(|f| f.rule_id).collect();
    assert_eq!(rules, vec!["TrailingWhitespace", "ForbiddenComment"]);
}

#[test]
fn test_later_extension_reads_published_data() {
    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(StatisticsExtension)
        .with_extension(Summarize)
        .run_sources(files())
        .unwrap();

    assert_eq!(
        detektion.user_data::<Summary>().as_deref().map(String::as_str),
        Some("3 finding(s) in 2 file(s)")
    );
    let statistics = detektion.user_data::<Statistics>().unwrap();
    assert_eq!(statistics.by_rule["formatting/ForbiddenComment"], 1);
    assert!(detektion.notifications().is_empty());
}

#[test]
fn test_failing_extension_is_isolated() {
    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(Broken)
        .with_extension(StatisticsExtension)
        .with_settings(Settings::default().with_parallelism(Parallelism::threads(2)))
        .run_sources(files())
        .unwrap();

    // The panicking hook cleared the findings before failing; the edit is
    // discarded.
    assert_eq!(detektion.findings().len(), 3);
    assert_eq!(detektion.user_data::<Statistics>().unwrap().findings, 3);

    let hooks: Vec<(String, Hook)> = detektion
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            Notification::ExtensionFailed { extension_id, hook, .. } => Some((extension_id, hook)),
            _ => None,
        })
        .collect();
    assert_eq!(hooks, vec![
        ("broken".to_string(), Hook::Start),
        ("broken".to_string(), Hook::File),
        ("broken".to_string(), Hook::File),
    ]);
    assert_eq!(
        rendered_notifications(&detektion.notifications())[0],
        "Extension `broken` failed in on_start: cannot start"
    );
}

#[test]
fn test_failure_in_finish_hook_is_sorted_with_the_rest() {
    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(LateFailure)
        .with_settings(Settings::default().with_auto_correct(true))
        .run_sources(files())
        .unwrap();

    assert_eq!(rendered_notifications(&detektion.notifications()), vec![
        "Extension `late` failed in on_finish: too late",
        "Corrected a.txt",
    ]);
}
