use crate::config::Config;
use crate::plain_text::kind;
use crate::property::Property;
use crate::rule::{CorrectableRule, Rule, RuleContext};
use crate::tree::{NodeId, SyntaxTree};

/// ## What it does
///
/// Checks for tab characters used as whitespace.
///
/// ## Why is this bad?
///
/// Tabs render with a different width depending on the editor, so
/// alignment made with them breaks as soon as someone else opens the file.
///
/// ## Correction
///
/// Every tab is replaced by `indentSize` spaces (default `4`).
pub struct NoTabs {
    indent: String,
}

fn indent_size() -> Property<usize> {
    Property::new("indentSize", 4)
}

impl NoTabs {
    pub(crate) fn new(config: &dyn Config) -> anyhow::Result<Self> {
        let indent_size = indent_size().resolve(config)?;
        anyhow::ensure!(indent_size > 0, "indentSize must be at least 1");
        Ok(Self { indent: " ".repeat(indent_size) })
    }
}

fn tabs(tree: &SyntaxTree) -> Vec<NodeId> {
    tree.tokens(tree.root())
        .filter(|&token| {
            tree.kind(token) == kind::WHITESPACE && tree.text(token).is_some_and(|t| t.contains('\t'))
        })
        .collect()
}

const MESSAGE: &str = "Tab character used for whitespace";

impl Rule for NoTabs {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        for token in tabs(tree) {
            context.report(tree, token, MESSAGE);
        }
        Ok(())
    }
}

impl CorrectableRule for NoTabs {
    fn correct(&self, tree: &mut SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let tabs = tabs(tree);
        // Report against the uncorrected positions.
        for &token in &tabs {
            context.report(tree, token, MESSAGE);
        }
        for token in tabs {
            let replaced = tree.text(token).unwrap_or_default().replace('\t', &self.indent);
            tree.replace_text(token, replaced)?;
        }
        Ok(())
    }
}
