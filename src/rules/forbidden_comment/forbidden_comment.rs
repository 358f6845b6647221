use anyhow::Context;
use regex::Regex;

use crate::config::Config;
use crate::plain_text::kind;
use crate::property::Property;
use crate::rule::{Rule, RuleContext};
use crate::tree::SyntaxTree;

/// ## What it does
///
/// Checks comments for forbidden markers such as `TODO:` or `FIXME:`.
///
/// `comments` (formerly `values`) lists the forbidden patterns as regular
/// expressions. Comments matching one of `allowedPatterns` are never
/// reported.
pub struct ForbiddenComment {
    comments: Vec<Regex>,
    allowed_patterns: Vec<Regex>,
}

fn comments() -> Property<Vec<String>> {
    Property::new(
        "comments",
        vec!["FIXME:".to_string(), "STOPSHIP:".to_string(), "TODO:".to_string()],
    )
    .deprecated_alias("values")
}

fn allowed_patterns() -> Property<Vec<Regex>> {
    Property::new("allowedPatterns", Vec::new())
}

impl ForbiddenComment {
    pub(crate) fn new(config: &dyn Config) -> anyhow::Result<Self> {
        let comments = comments()
            .resolve(config)?
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("Invalid forbidden comment pattern `{pattern}`"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            comments,
            allowed_patterns: allowed_patterns().resolve(config)?,
        })
    }
}

impl Rule for ForbiddenComment {
    fn visit(&self, tree: &SyntaxTree, context: &mut RuleContext<'_>) -> anyhow::Result<()> {
        let comments = tree
            .tokens(tree.root())
            .filter(|&token| tree.kind(token) == kind::COMMENT);
        for token in comments {
            let text = tree.text(token).unwrap_or_default();
            if self.allowed_patterns.iter().any(|allowed| allowed.is_match(text)) {
                continue;
            }
            if let Some(found) = self.comments.iter().find_map(|pattern| pattern.find(text)) {
                context.report(
                    tree,
                    token,
                    format!("Comment contains `{}`, which is forbidden", found.as_str()),
                );
            }
        }
        Ok(())
    }
}
