use std::collections::BTreeSet;

use inspekt::frontend::{FrontEnd, ParsedFile, ResolutionContext, SourceFile};
use inspekt::plain_text::{PlainTextFrontEnd, kind};
use inspekt::tree::SyntaxTree;
use inspekt::{Rule, RuleContext, RuleDefinition, RuleSet};

use crate::helpers::*;

/// Symbols known to be declared, standing in for real type information.
struct Declared(BTreeSet<String>);

/// Reports words that are not declared.
struct UndeclaredWord;

impl Rule for UndeclaredWord {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let Some(declared) = context.resolution().and_then(|r| r.downcast_ref::<Declared>()) else {
            anyhow::bail!("no symbol table");
        };
        let undeclared: Vec<_> = tree
            .tokens(tree.root())
            .filter(|&token| tree.kind(token) == kind::WORD)
            .filter(|&token| tree.text(token).is_some_and(|word| !declared.0.contains(word)))
            .collect();
        for token in undeclared {
            let word = tree.node_text(token);
            context.report(tree, token, format!("`{word}` is not declared"));
        }
        Ok(())
    }
}

fn resolving() -> RuleSet {
    RuleSet::new("symbols")
        .with_rule(
            RuleDefinition::inspecting("UndeclaredWord", |_| Ok(UndeclaredWord))
                .requires_resolution()
                .active_by_default(),
        )
        .with_rule(RuleDefinition::inspecting("EveryLine", |_| Ok(EveryLine)).active_by_default())
}

fn source() -> SourceFile {
    SourceFile::new("a.txt", "known unknown\n")
}

#[test]
fn test_rule_requiring_resolution_is_skipped_without_it() {
    let detektion = analyzer("")
        .with_provider(FnProvider { id: "symbols", build: resolving })
        .run_sources(vec![source()])
        .unwrap();

    let rules: Vec<String> = detektion.findings().into_iter().map(|f| f.rule_id).collect();
    assert_eq!(rules, vec!["EveryLine"]);
    assert!(detektion.notifications().is_empty());
}

#[test]
fn test_rule_requiring_resolution_runs_with_it() -> anyhow::Result<()> {
    let parsed = PlainTextFrontEnd::new().parse(&source())?;
    let declared = Declared(BTreeSet::from(["known".to_string()]));
    let parsed = ParsedFile::new(parsed.tree).with_resolution(ResolutionContext::new(declared));

    let detektion = analyzer("")
        .with_provider(FnProvider { id: "symbols", build: resolving })
        .run_parsed(vec![parsed])?;

    let findings: Vec<String> = rendered(&detektion.findings());
    assert_eq!(findings.len(), 2);
    assert!(findings.iter().any(|f| f.contains("`unknown` is not declared")));
    Ok(())
}
