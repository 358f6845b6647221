use std::any::Any;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ParseError;
use crate::tree::SyntaxTree;

/// Source text of one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }

    pub fn read(path: &Path) -> Result<Self, ParseError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
        Ok(Self::new(path, text))
    }
}

/// Opaque type/symbol information produced by a front-end. Rules that need
/// it downcast to the concrete type their front-end provides.
#[derive(Clone)]
pub struct ResolutionContext(Arc<dyn Any + Send + Sync>);

impl ResolutionContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResolutionContext(..)")
    }
}

/// Output of a front-end for one file. The tree is owned by whoever analyzes
/// the file.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub tree: SyntaxTree,
    pub resolution: Option<ResolutionContext>,
}

impl ParsedFile {
    pub fn new(tree: SyntaxTree) -> Self {
        Self { tree, resolution: None }
    }

    pub fn with_resolution(mut self, resolution: ResolutionContext) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn path(&self) -> &Path {
        self.tree.path()
    }
}

/// Turns source text into a syntax tree. Implementations must be usable from
/// several worker threads at once.
pub trait FrontEnd: Send + Sync {
    fn parse(&self, source: &SourceFile) -> Result<ParsedFile, ParseError>;

    /// File extensions (without the dot) this front-end understands. Used
    /// when discovering files in directories.
    fn extensions(&self) -> &[&str] {
        &[]
    }
}
