use std::sync::Arc;

use inspekt::config::Config;
use inspekt::frontend::SourceFile;
use inspekt::plain_text::{PlainTextFrontEnd, kind};
use inspekt::toml::config_from_toml_str;
use inspekt::tree::SyntaxTree;
use inspekt::{Analyzer, CorrectableRule, Finding, Notification, Rule, RuleContext, RuleSet, RuleSetProvider};

/// Provider building its rule set from a plain function.
pub struct FnProvider {
    pub id: &'static str,
    pub build: fn() -> RuleSet,
}

impl RuleSetProvider for FnProvider {
    fn rule_set_id(&self) -> &str {
        self.id
    }

    fn instance(&self, _config: &dyn Config) -> RuleSet {
        (self.build)()
    }
}

pub fn analyzer(toml: &str) -> Analyzer {
    let config = config_from_toml_str(toml).unwrap().into_shared();
    Analyzer::new(config, Arc::new(PlainTextFrontEnd::new()))
}

/// Appends a word with its name at the end of the file.
pub struct Append(pub &'static str);

impl Rule for Append {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        context.report(tree, tree.root(), format!("would append {}", self.0));
        Ok(())
    }
}

impl CorrectableRule for Append {
    fn correct(&self, tree: &mut SyntaxTree, _context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let root = tree.root();
        let end = tree.children(root).len();
        tree.insert_token(root, end, kind::WORD, self.0)?;
        Ok(())
    }
}

/// Reports the text of the file as the inspecting phase sees it.
pub struct SeenText;

impl Rule for SeenText {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        context.report(tree, tree.root(), tree.render());
        Ok(())
    }
}

/// Reports one finding per line.
pub struct EveryLine;

impl Rule for EveryLine {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let lines: Vec<_> = tree
            .descendants(tree.root())
            .filter(|&node| tree.kind(node) == kind::LINE)
            .collect();
        for line in lines {
            context.report(tree, line, "line");
        }
        Ok(())
    }
}

/// Reports a finding, then panics on files whose name contains `marker`.
pub struct Explode(pub &'static str);

impl Rule for Explode {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        context.report(tree, tree.root(), "partial");
        if tree.path().to_string_lossy().contains(self.0) {
            panic!("exploded on {}", tree.path().display());
        }
        Ok(())
    }
}

/// Fails with an error on every file.
pub struct Refuse;

impl Rule for Refuse {
    fn visit(&self, _tree: &SyntaxTree, _context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("refused")
    }
}

/// `count` files of `lines` lines each, mixing tabs, trailing whitespace,
/// long lines and forbidden comments.
pub fn sources(count: usize, lines: usize) -> Vec<SourceFile> {
    (0..count)
        .map(|i| {
            let text: String = (0..lines)
                .map(|j| match (i + j) % 5 {
                    0 => format!("\tindented {i} {j}\n"),
                    1 => format!("trailing {i} {j}  \n"),
                    2 => format!("{} {i} {j}\n", "long".repeat(40)),
                    3 => format!("code {i} // TODO: {j}\n"),
                    _ => format!("plain {i} {j}\n"),
                })
                .collect();
            SourceFile::new(format!("dir{}/file_{i:03}.txt", i % 3), text)
        })
        .collect()
}

pub fn rendered(findings: &[Finding]) -> Vec<String> {
    findings.iter().map(ToString::to_string).collect()
}

pub fn rendered_notifications(notifications: &[Notification]) -> Vec<String> {
    notifications.iter().map(ToString::to_string).collect()
}
