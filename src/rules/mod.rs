//! The built-in `formatting` rule set, written against the node kinds of
//! the plain-text front-end.

pub(crate) mod forbidden_comment;
pub(crate) mod max_line_length;
pub(crate) mod no_tabs;
pub(crate) mod trailing_whitespace;

use crate::config::Config;
use crate::finding::Severity;
use crate::rule_set::{RuleDefinition, RuleSet, RuleSetProvider};

use forbidden_comment::forbidden_comment::ForbiddenComment;
use max_line_length::max_line_length::MaxLineLength;
use no_tabs::no_tabs::NoTabs;
use trailing_whitespace::trailing_whitespace::TrailingWhitespace;

pub const FORMATTING: &str = "formatting";

#[derive(Clone, Copy, Debug, Default)]
pub struct FormattingProvider;

impl RuleSetProvider for FormattingProvider {
    fn rule_set_id(&self) -> &str {
        FORMATTING
    }

    fn instance(&self, _config: &dyn Config) -> RuleSet {
        RuleSet::new(FORMATTING)
            .with_rule(
                RuleDefinition::correctable("NoTabs", NoTabs::new)
                    .description("Tab character used for whitespace")
                    .alias("NoTabCharacter")
                    .active_by_default(),
            )
            .with_rule(
                RuleDefinition::correctable("TrailingWhitespace", |_| Ok(TrailingWhitespace))
                    .description("Whitespace at the end of a line")
                    .alias("NoTrailingSpaces")
                    .active_by_default(),
            )
            .with_rule(
                RuleDefinition::inspecting("MaxLineLength", MaxLineLength::new)
                    .description("Line longer than the configured maximum")
                    .alias("MaximumLineLength")
                    .active_by_default(),
            )
            .with_rule(
                RuleDefinition::inspecting("ForbiddenComment", ForbiddenComment::new)
                    .description("Comment containing a forbidden marker")
                    .severity(Severity::Info)
                    .active_by_default(),
            )
    }
}
