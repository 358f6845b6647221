use crate::plain_text::kind;
use crate::rule::{CorrectableRule, Rule, RuleContext};
use crate::tree::{NodeId, SyntaxTree};

/// ## What it does
///
/// Checks for whitespace at the end of a line, including inside trailing
/// comments.
///
/// ## Why is this bad?
///
/// Trailing whitespace is invisible in most editors and only shows up as
/// noise in diffs.
pub struct TrailingWhitespace;

/// What is wrong at the end of a line.
enum Trailing {
    /// A whitespace token to drop.
    Whitespace(NodeId),
    /// A comment token to trim.
    Comment(NodeId),
}

impl Trailing {
    fn token(&self) -> NodeId {
        match self {
            Self::Whitespace(token) | Self::Comment(token) => *token,
        }
    }
}

fn trailing(tree: &SyntaxTree) -> Vec<Trailing> {
    tree.descendants(tree.root())
        .filter(|&node| tree.kind(node) == kind::LINE)
        .filter_map(|line| {
            let last = tree
                .children(line)
                .iter()
                .rev()
                .copied()
                .find(|&token| tree.kind(token) != kind::NEWLINE)?;
            let text = tree.text(last)?;
            match tree.kind(last) {
                kind::WHITESPACE => Some(Trailing::Whitespace(last)),
                kind::COMMENT if text.ends_with([' ', '\t']) => Some(Trailing::Comment(last)),
                _ => None,
            }
        })
        .collect()
}

const MESSAGE: &str = "Line ends with trailing whitespace";

impl Rule for TrailingWhitespace {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        for found in trailing(tree) {
            context.report(tree, found.token(), MESSAGE);
        }
        Ok(())
    }
}

impl CorrectableRule for TrailingWhitespace {
    fn correct(&self, tree: &mut SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let found = trailing(tree);
        for item in &found {
            context.report(tree, item.token(), MESSAGE);
        }
        for item in found {
            match item {
                Trailing::Whitespace(token) => tree.remove(token)?,
                Trailing::Comment(token) => {
                    let trimmed = tree.text(token).unwrap_or_default().trim_end().to_string();
                    tree.replace_text(token, trimmed)?;
                }
            }
        }
        Ok(())
    }
}
