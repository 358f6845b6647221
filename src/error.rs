use std::path::PathBuf;

use thiserror::Error;

/// A configured value exists but does not have the shape the reader asked
/// for.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value `{found}` of key `{key}` in `{path}` cannot be read as {expected}")]
pub struct ConfigCastError {
    /// Path of the config section holding the key, `<root>` at the top.
    pub path: String,
    pub key: String,
    pub expected: &'static str,
    pub found: String,
}

/// Failure of a front-end to turn source text into a syntax tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Hard errors of the analyzer API. Everything that happens while analyzing
/// files or running rules is reported as a notification instead.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Nothing to analyze: no rule set providers and no input files were given")]
    NothingToAnalyze,

    #[error("Failed to build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Invalid edit of a [crate::tree::SyntaxTree].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node {0} is not a token and has no text")]
    NotAToken(u32),

    #[error("Node {0} is not attached to the tree")]
    Detached(u32),

    #[error("The root node cannot be removed")]
    RemoveRoot,

    #[error("Index {index} is out of bounds for node {node} with {len} children")]
    OutOfBounds { node: u32, index: usize, len: usize },
}
