use inspekt::extensions::{Baseline, BaselineExtension};
use inspekt::frontend::SourceFile;
use inspekt::rules::FormattingProvider;
use tempfile::TempDir;

use crate::helpers::*;

#[test]
fn test_baseline_silences_known_findings() -> anyhow::Result<()> {
    let directory = TempDir::new()?;
    let path = directory.path().join("baseline.json");

    let first = analyzer("").with_provider(FormattingProvider).run_sources(sources(6, 5))?;
    let known = first.findings();
    assert!(!known.is_empty());
    Baseline::from_findings(&known).save(&path)?;

    let second = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(BaselineExtension::from_file(&path)?)
        .run_sources(sources(6, 5))?;

    assert!(second.findings().is_empty());
    assert_eq!(second.suppressed_count(), known.len());
    assert!(
        second
            .suppressed()
            .iter()
            .all(|f| f.suppression.as_deref() == Some("Listed in baseline"))
    );
    Ok(())
}

#[test]
fn test_new_findings_are_still_reported() -> anyhow::Result<()> {
    let directory = TempDir::new()?;
    let path = directory.path().join("baseline.json");

    let old = vec![SourceFile::new("a.txt", "x \n")];
    let first = analyzer("").with_provider(FormattingProvider).run_sources(old)?;
    Baseline::from_findings(&first.findings()).save(&path)?;

    // The known finding moved one line down, a new one appeared.
    let new = vec![SourceFile::new("a.txt", "y\nx \n\tz\n")];
    let second = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(BaselineExtension::from_file(&path)?)
        .run_sources(new)?;

    let rules: Vec<String> = second.findings().into_iter().map(|f| f.rule_id).collect();
    assert_eq!(rules, vec!["NoTabs"]);
    assert_eq!(second.suppressed_count(), 1);
    Ok(())
}

#[test]
fn test_missing_baseline_file_changes_nothing() -> anyhow::Result<()> {
    let directory = TempDir::new()?;
    let detektion = analyzer("")
        .with_provider(FormattingProvider)
        .with_extension(BaselineExtension::from_file(&directory.path().join("none.json"))?)
        .run_sources(vec![SourceFile::new("a.txt", "x \n")])?;
    assert_eq!(detektion.findings().len(), 1);
    assert_eq!(detektion.suppressed_count(), 0);
    Ok(())
}
