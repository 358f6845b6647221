use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A line/column pair, both 1-based. Columns count characters, not bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// Current line
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column
    pub fn column(&self) -> usize {
        self.column
    }

    pub(crate) fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start and end of a node in the current text of its tree. The end is
/// exclusive, i.e. it points at the character following the node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    /// Character offsets of `start` and `end`.
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Where a finding was reported.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn from_span(path: impl Into<PathBuf>, span: Span) -> Self {
        Self {
            path: path.into(),
            line: span.start.line,
            column: span.start.column,
            end_line: Some(span.end.line),
            end_column: Some(span.end.column),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}
