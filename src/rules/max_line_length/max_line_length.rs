use crate::config::Config;
use crate::plain_text::kind;
use crate::property::Property;
use crate::rule::{Rule, RuleContext};
use crate::tree::{NodeId, SyntaxTree};

/// ## What it does
///
/// Checks for lines longer than `maxLineLength` characters (default `120`,
/// formerly configured as `maxLength`).
///
/// Lines holding nothing but a comment are skipped when
/// `excludeCommentStatements` is set.
pub struct MaxLineLength {
    max_line_length: usize,
    exclude_comment_statements: bool,
}

fn max_line_length() -> Property<usize> {
    Property::new("maxLineLength", 120).deprecated_alias("maxLength")
}

fn exclude_comment_statements() -> Property<bool> {
    Property::new("excludeCommentStatements", false)
}

impl MaxLineLength {
    pub(crate) fn new(config: &dyn Config) -> anyhow::Result<Self> {
        Ok(Self {
            max_line_length: max_line_length().resolve(config)?,
            exclude_comment_statements: exclude_comment_statements().resolve(config)?,
        })
    }

    fn is_comment_statement(tree: &SyntaxTree, line: NodeId) -> bool {
        tree.children(line)
            .iter()
            .find(|&&token| tree.kind(token) != kind::WHITESPACE)
            .is_some_and(|&token| tree.kind(token) == kind::COMMENT)
    }
}

impl Rule for MaxLineLength {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let lines = tree
            .descendants(tree.root())
            .filter(|&node| tree.kind(node) == kind::LINE);
        for line in lines {
            if self.exclude_comment_statements && Self::is_comment_statement(tree, line) {
                continue;
            }
            let length: usize = tree
                .children(line)
                .iter()
                .filter(|&&token| tree.kind(token) != kind::NEWLINE)
                .filter_map(|&token| tree.text(token))
                .map(|text| text.chars().count())
                .sum();
            if length > self.max_line_length {
                context.report(
                    tree,
                    line,
                    format!(
                        "Line is {length} characters long, exceeding the maximum of {}",
                        self.max_line_length
                    ),
                );
            }
        }
        Ok(())
    }
}
