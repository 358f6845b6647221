use inspekt::frontend::SourceFile;
use inspekt::{RuleDefinition, RuleSet, Settings};

use crate::helpers::*;

fn inspecting_first() -> RuleSet {
    RuleSet::new("order")
        .with_rule(RuleDefinition::inspecting("Seen", |_| Ok(SeenText)).active_by_default())
        .with_rule(RuleDefinition::correctable("AppendA", |_| Ok(Append("A"))).active_by_default())
        .with_rule(RuleDefinition::correctable("AppendB", |_| Ok(Append("B"))).active_by_default())
}

fn inspecting_last() -> RuleSet {
    RuleSet::new("order")
        .with_rule(RuleDefinition::correctable("AppendA", |_| Ok(Append("A"))).active_by_default())
        .with_rule(RuleDefinition::correctable("AppendB", |_| Ok(Append("B"))).active_by_default())
        .with_rule(RuleDefinition::inspecting("Seen", |_| Ok(SeenText)).active_by_default())
}

fn seen_text(build: fn() -> RuleSet, auto_correct: bool) -> Vec<String> {
    let detektion = analyzer("")
        .with_provider(FnProvider { id: "order", build })
        .with_settings(Settings::default().with_auto_correct(auto_correct))
        .run_sources(vec![SourceFile::new("a.txt", "x")])
        .unwrap();
    detektion
        .findings()
        .into_iter()
        .filter(|f| f.rule_id == "Seen")
        .map(|f| f.message)
        .collect()
}

#[test]
fn test_correcting_rules_run_before_inspecting_rules() {
    // Whatever the declaration order, inspecting rules see the tree after
    // every correction, applied in declared order.
    assert_eq!(seen_text(inspecting_first, true), vec!["xAB"]);
    assert_eq!(seen_text(inspecting_last, true), vec!["xAB"]);
}

#[test]
fn test_without_autocorrect_rules_run_in_declared_order() {
    assert_eq!(seen_text(inspecting_first, false), vec!["x"]);

    let detektion = analyzer("")
        .with_provider(FnProvider { id: "order", build: inspecting_last })
        .run_sources(vec![SourceFile::new("a.txt", "x")])
        .unwrap();
    assert!(detektion.corrected_files().is_empty());
    let messages: Vec<String> = detektion.findings().into_iter().map(|f| f.message).collect();
    assert_eq!(messages, vec!["would append A", "would append B", "x"]);
}

#[test]
fn test_corrected_tree_is_kept_with_a_notification() {
    let detektion = analyzer("")
        .with_provider(FnProvider { id: "order", build: inspecting_first })
        .with_settings(Settings::default().with_auto_correct(true))
        .run_sources(vec![SourceFile::new("a.txt", "x")])
        .unwrap();

    let corrected = detektion.corrected_files();
    assert_eq!(corrected.len(), 1);
    assert_eq!(corrected[0].render(), "xAB");
    assert_eq!(rendered_notifications(&detektion.notifications()), vec!["Corrected a.txt"]);
}

#[test]
fn test_rule_sets_run_in_registration_order() {
    fn appends_c() -> RuleSet {
        RuleSet::new("second")
            .with_rule(RuleDefinition::correctable("AppendC", |_| Ok(Append("C"))).active_by_default())
            .with_rule(RuleDefinition::inspecting("Seen", |_| Ok(SeenText)).active_by_default())
    }

    let detektion = analyzer("")
        .with_provider(FnProvider { id: "order", build: inspecting_last })
        .with_provider(FnProvider { id: "second", build: appends_c })
        .with_settings(Settings::default().with_auto_correct(true))
        .run_sources(vec![SourceFile::new("a.txt", "x")])
        .unwrap();

    let seen: Vec<(String, String)> = detektion
        .findings()
        .into_iter()
        .map(|f| (f.rule_set_id, f.message))
        .collect();
    assert_eq!(seen, vec![
        ("order".to_string(), "xAB".to_string()),
        ("second".to_string(), "xABC".to_string()),
    ]);
}

#[test]
fn test_formatting_corrections_chain() {
    // NoTabs turns the tab into spaces, which TrailingWhitespace then
    // removes as trailing whitespace.
    let detektion = analyzer("")
        .with_provider(inspekt::rules::FormattingProvider)
        .with_settings(Settings::default().with_auto_correct(true))
        .run_sources(vec![SourceFile::new("a.txt", "a\t\nb\n")])
        .unwrap();
    assert_eq!(detektion.corrected_files()[0].render(), "a\nb\n");
    let rules: Vec<String> = detektion.findings().into_iter().map(|f| f.rule_id).collect();
    assert_eq!(rules, vec!["NoTabs", "TrailingWhitespace"]);
}
