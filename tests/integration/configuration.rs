use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use inspekt::plain_text::PlainTextFrontEnd;
use inspekt::rules::FormattingProvider;
use inspekt::toml::{find_inspekt_toml, parse_inspekt_toml};
use inspekt::{Analyzer, Notification, Parallelism, Settings};
use tempfile::TempDir;

use crate::helpers::*;

const CONFIG: &str = r#"
[engine]
threads = 2

[formatting]
excludes = ["**/generated/**"]

[formatting.MaxLineLength]
maxLength = 10

[formatting.ForbiddenComment]
active = false
"#;

fn project() -> anyhow::Result<TempDir> {
    let directory = TempDir::new()?;
    let root = directory.path();
    fs::write(root.join("inspekt.toml"), CONFIG)?;
    fs::create_dir_all(root.join("src/nested"))?;
    fs::create_dir_all(root.join("generated"))?;
    fs::create_dir_all(root.join("node_modules"))?;
    fs::write(root.join("src/a.txt"), "short\nthis line is long\n")?;
    fs::write(root.join("src/nested/b.txt"), "// TODO: fine here\n")?;
    fs::write(root.join("src/notes.md"), "\tnot analyzed\n")?;
    fs::write(root.join("generated/c.txt"), "\tgenerated\n")?;
    fs::write(root.join("node_modules/d.txt"), "\tvendored\n")?;
    Ok(directory)
}

#[test]
fn test_project_configuration_is_applied() -> anyhow::Result<()> {
    let directory = project()?;
    let root = directory.path();

    let toml = find_inspekt_toml(root.join("src/nested")).expect("inspekt.toml is found upwards");
    assert_eq!(toml, root.join("inspekt.toml"));

    let config = parse_inspekt_toml(&toml)?.into_shared();
    let settings = Settings::from_config(config.as_ref())?;
    assert_eq!(settings.parallelism, Parallelism::threads(2));

    let detektion = Analyzer::new(config, Arc::new(PlainTextFrontEnd::new()))
        .with_provider(FormattingProvider)
        .with_settings(settings)
        .run(&[root])?;

    // `node_modules/` is skipped by default and `.md` files are not
    // understood by the front-end. `generated/` is analyzed, but the rule
    // set excludes it.
    let analyzed: Vec<PathBuf> = detektion
        .analyzed_files()
        .iter()
        .map(|path| path.strip_prefix(root).map(PathBuf::from))
        .collect::<Result<_, _>>()?;
    assert_eq!(analyzed, vec![
        PathBuf::from("generated/c.txt"),
        PathBuf::from("src/a.txt"),
        PathBuf::from("src/nested/b.txt"),
    ]);

    let findings: Vec<String> = detektion
        .findings()
        .iter()
        .map(|f| format!("{}:{} {}", f.location.line, f.rule_id, f.message))
        .collect();
    insta::assert_debug_snapshot!(findings, @r#"
    [
        "2:MaxLineLength Line is 17 characters long, exceeding the maximum of 10",
    ]
    "#);

    assert_eq!(rendered_notifications(&detektion.notifications()), vec![
        "Key `maxLength` in `formatting>MaxLineLength` is deprecated, use `maxLineLength` instead"
    ]);
    Ok(())
}

#[test]
fn test_invalid_option_fails_only_its_rule() -> anyhow::Result<()> {
    let detektion = analyzer(
        r#"
        [formatting.NoTabs]
        indentSize = 0

        [formatting.MaxLineLength]
        maxLineLength = "wide"
        "#,
    )
    .with_provider(FormattingProvider)
    .run_sources(inspekt_sources())?;

    let failed: Vec<(String, String)> = detektion
        .notifications()
        .into_iter()
        .filter_map(|n| match n {
            Notification::RuleConstructionFailed { rule_set_id, rule_id, .. } => Some((rule_set_id, rule_id)),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![
        ("formatting".to_string(), "MaxLineLength".to_string()),
        ("formatting".to_string(), "NoTabs".to_string()),
    ]);

    let rules: Vec<String> = detektion.findings().into_iter().map(|f| f.rule_id).collect();
    assert_eq!(rules, vec!["TrailingWhitespace"]);
    Ok(())
}

#[test]
fn test_inactive_rule_set_runs_nothing() -> anyhow::Result<()> {
    let detektion = analyzer("[formatting]\nactive = false\n")
        .with_provider(FormattingProvider)
        .run_sources(inspekt_sources())?;
    assert!(detektion.is_clean());

    let detektion = analyzer("[formatting]\nactive = false\n")
        .with_provider(FormattingProvider)
        .with_settings(Settings::default().with_all_rules(true))
        .run_sources(inspekt_sources())?;
    assert_eq!(detektion.findings().len(), 2);
    Ok(())
}

#[test]
fn test_severity_override() -> anyhow::Result<()> {
    let detektion = analyzer("[formatting.TrailingWhitespace]\nseverity = \"error\"\n")
        .with_provider(FormattingProvider)
        .run_sources(inspekt_sources())?;
    let severities: Vec<String> = detektion
        .findings()
        .iter()
        .map(|f| format!("{} {}", f.rule_id, f.severity))
        .collect();
    assert_eq!(severities, vec!["NoTabs warning", "TrailingWhitespace error"]);
    Ok(())
}

fn inspekt_sources() -> Vec<inspekt::frontend::SourceFile> {
    vec![inspekt::frontend::SourceFile::new("a.txt", "\tx\ny \n")]
}
