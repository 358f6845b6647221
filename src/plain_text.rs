//! A language-agnostic front-end.
//!
//! Text is split into `line` nodes holding `word`, `whitespace`, `punct`,
//! `comment` and `newline` tokens. A line ending with `{` opens a `block`
//! node that extends to the next line starting with `}`. Comments start
//! with `//` or `#`.
//!
//! Comments may carry suppression directives:
//!
//! - `inspekt:suppress(RuleA, RuleB)` suppresses the named rules
//! - `inspekt:unsuppress(RuleA)` re-enables a rule suppressed by an
//!   enclosing scope
//! - `inspekt:suppress-file(RuleA)` suppresses the rules in the whole file
//!
//! Text after the closing parenthesis is kept as the suppression reason. A
//! directive on a line of its own applies to the next line, or to the block
//! that line opens. A directive trailing code applies to its own line.

use crate::error::ParseError;
use crate::frontend::{FrontEnd, ParsedFile, SourceFile};
use crate::suppression::SuppressionMarker;
use crate::tree::{NodeId, TreeBuilder};

pub mod kind {
    pub const FILE: &str = "file";
    pub const BLOCK: &str = "block";
    pub const LINE: &str = "line";
    pub const WORD: &str = "word";
    pub const WHITESPACE: &str = "whitespace";
    pub const PUNCT: &str = "punct";
    pub const COMMENT: &str = "comment";
    pub const NEWLINE: &str = "newline";
}

const DIRECTIVE_PREFIX: &str = "inspekt:";

#[derive(Clone, Debug)]
pub struct PlainTextFrontEnd {
    extensions: Vec<&'static str>,
}

impl Default for PlainTextFrontEnd {
    fn default() -> Self {
        Self { extensions: vec!["txt"] }
    }
}

impl PlainTextFrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(extensions: Vec<&'static str>) -> Self {
        Self { extensions }
    }
}

impl FrontEnd for PlainTextFrontEnd {
    fn parse(&self, source: &SourceFile) -> Result<ParsedFile, ParseError> {
        if source.text.contains('\0') {
            return Err(ParseError::Syntax {
                path: source.path.clone(),
                message: "binary content is not supported".to_string(),
            });
        }
        Ok(ParsedFile::new(parse_plain_text(source).finish()))
    }

    fn extensions(&self) -> &[&str] {
        &self.extensions
    }
}

#[derive(Debug, PartialEq)]
enum Directive {
    Scoped(SuppressionMarker),
    File(SuppressionMarker),
}

fn parse_plain_text(source: &SourceFile) -> TreeBuilder {
    let mut builder = TreeBuilder::new(&source.path, kind::FILE);
    let root = builder.root();
    let mut depth = 0usize;
    let mut pending: Vec<SuppressionMarker> = Vec::new();

    for raw_line in source.text.split_inclusive('\n') {
        let (content, newline) = split_newline(raw_line);
        let trimmed = content.trim();
        let closes = depth > 0 && trimmed.starts_with('}');
        let opens = trimmed.ends_with('{');

        let mut block = None;
        if opens && !closes {
            block = Some(builder.start_node(kind::BLOCK));
            depth += 1;
        }

        let line = builder.start_node(kind::LINE);
        let mut has_code = false;
        let mut directives = Vec::new();
        for (token_kind, text) in tokenize(content) {
            if token_kind == kind::COMMENT {
                if let Some(directive) = parse_directive(text) {
                    directives.push(directive);
                }
            } else if token_kind != kind::WHITESPACE {
                has_code = true;
            }
            builder.token(token_kind, text);
        }
        if !newline.is_empty() {
            builder.token(kind::NEWLINE, newline);
        }
        builder.finish_node();

        // Markers waiting for this line go to the block it opens, if any.
        let target: NodeId = block.unwrap_or(line);
        for marker in pending.drain(..) {
            builder.marker(target, marker);
        }

        for directive in directives {
            match directive {
                Directive::File(marker) => builder.marker(root, marker),
                Directive::Scoped(marker) if has_code => builder.marker(target, marker),
                Directive::Scoped(marker) => pending.push(marker),
            }
        }

        if closes {
            builder.finish_node();
            depth -= 1;
            if opens {
                builder.start_node(kind::BLOCK);
                depth += 1;
            }
        }
    }

    builder
}

fn split_newline(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn tokenize(content: &str) -> Vec<(&'static str, &str)> {
    let mut tokens = Vec::new();
    let mut rest = content;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("//") || c == '#' {
            tokens.push((kind::COMMENT, rest));
            break;
        }

        let (token_kind, len) = if c == ' ' || c == '\t' {
            (kind::WHITESPACE, run_length(rest, |c| c == ' ' || c == '\t'))
        } else if c.is_alphanumeric() || c == '_' {
            (kind::WORD, run_length(rest, |c| c.is_alphanumeric() || c == '_'))
        } else {
            (kind::PUNCT, c.len_utf8())
        };
        let (token, tail) = rest.split_at(len);
        tokens.push((token_kind, token));
        rest = tail;
    }

    tokens
}

fn run_length(text: &str, accept: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| !accept(c))
        .map_or(text.len(), |(i, _)| i)
}

fn parse_directive(comment: &str) -> Option<Directive> {
    let body = comment
        .strip_prefix("//")
        .or_else(|| comment.strip_prefix('#'))?
        .trim();
    let body = body.strip_prefix(DIRECTIVE_PREFIX)?;

    let open = body.find('(')?;
    let close = body[open..].find(')')? + open;
    let verb = body[..open].trim();
    let names: Vec<&str> = body[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }

    let reason = body[close + 1..].trim();
    let with_reason = |marker: SuppressionMarker| {
        if reason.is_empty() {
            marker
        } else {
            marker.with_reason(reason)
        }
    };

    match verb {
        "suppress" => Some(Directive::Scoped(with_reason(SuppressionMarker::suppress(names)))),
        "unsuppress" => Some(Directive::Scoped(SuppressionMarker::unsuppress(names))),
        "suppress-file" => Some(Directive::File(with_reason(SuppressionMarker::suppress(names)))),
        _ => None,
    }
}
