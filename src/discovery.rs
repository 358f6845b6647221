use std::path::{Path, PathBuf};

use ignore::DirEntry;
use parking_lot::Mutex;

/// Directories never worth analyzing, skipped unless disabled.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[".git/", "target/", "build/", "node_modules/"];

pub type DiscoveredFiles = Vec<Result<PathBuf, ignore::Error>>;

/// What to pick up when walking directories.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryOptions {
    /// Accepted file extensions, without the dot. Empty accepts every file.
    pub extensions: Vec<String>,
    /// Extra gitignore-style patterns to skip.
    pub excludes: Vec<String>,
    pub no_default_exclude: bool,
}

impl DiscoveryOptions {
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        self.extensions.is_empty()
            || path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// For each provided `path`, recursively collect the files matching
/// `options`. Explicitly provided files are always accepted. The result is
/// sorted so runs over the same tree see the same order.
pub fn discover_files<P: AsRef<Path>>(paths: &[P], options: &DiscoveryOptions) -> DiscoveredFiles {
    let Some((first_path, paths)) = paths.split_first() else {
        return Vec::new();
    };

    let mut builder = ignore::WalkBuilder::new(first_path);
    for path in paths {
        builder.add(path);
    }

    builder.hidden(true);
    builder.parents(true);
    builder.ignore(false);
    builder.git_ignore(true);
    builder.git_global(true);
    builder.git_exclude(true);

    let mut patterns: Vec<&str> = options.excludes.iter().map(String::as_str).collect();
    if !options.no_default_exclude {
        patterns.extend_from_slice(DEFAULT_EXCLUDE_PATTERNS);
    }
    if !patterns.is_empty() {
        let mut override_builder = ignore::overrides::OverrideBuilder::new(first_path);
        for pattern in patterns {
            if let Err(e) = override_builder.add(&format!("!{pattern}")) {
                tracing::warn!("Failed to add exclude pattern '{}': {}", pattern, e);
            }
        }
        match override_builder.build() {
            Ok(overrides) => {
                builder.overrides(overrides);
            }
            Err(e) => tracing::warn!("Failed to build exclude patterns: {e}"),
        }
    }

    builder.threads(
        std::thread::available_parallelism()
            .map_or(1, std::num::NonZeroUsize::get)
            .min(12),
    );

    let state = FilesState::default();
    let mut visitor_builder = FilesVisitorBuilder { state: &state, options };
    builder.build_parallel().visit(&mut visitor_builder);

    let mut files = state.files.into_inner();
    files.sort_by(|a, b| match (a, b) {
        (Ok(a), Ok(b)) => a.cmp(b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(a), Err(b)) => a.to_string().cmp(&b.to_string()),
    });
    files
}

/// Shared state across the threads of the walker
#[derive(Default)]
struct FilesState {
    files: Mutex<DiscoveredFiles>,
}

struct FilesVisitorBuilder<'state> {
    state: &'state FilesState,
    options: &'state DiscoveryOptions,
}

impl<'state> ignore::ParallelVisitorBuilder<'state> for FilesVisitorBuilder<'state> {
    fn build(&mut self) -> Box<dyn ignore::ParallelVisitor + 'state> {
        Box::new(FilesVisitor {
            files: Vec::new(),
            state: self.state,
            options: self.options,
        })
    }
}

/// Collects accepted files on one walker thread and hands them to the
/// shared state when dropped.
struct FilesVisitor<'state> {
    files: DiscoveredFiles,
    state: &'state FilesState,
    options: &'state DiscoveryOptions,
}

impl ignore::ParallelVisitor for FilesVisitor<'_> {
    fn visit(&mut self, result: Result<DirEntry, ignore::Error>) -> ignore::WalkState {
        let entry = match result {
            Ok(entry) => entry,
            Err(error) => {
                self.files.push(Err(error));
                return ignore::WalkState::Continue;
            }
        };

        let path = entry.path();
        let is_explicit = entry.depth() == 0;
        let is_directory = entry.file_type().is_none_or(|ft| ft.is_dir());

        if is_explicit && !is_directory {
            tracing::trace!("Included file due to explicit provision {path}", path = path.display());
            self.files.push(Ok(entry.into_path()));
            return ignore::WalkState::Continue;
        }

        if !is_directory && self.options.accepts(path) {
            tracing::trace!("Included file {path}", path = path.display());
            self.files.push(Ok(entry.into_path()));
            return ignore::WalkState::Continue;
        }

        tracing::trace!("Excluded file due to fallthrough {path}", path = path.display());
        ignore::WalkState::Continue
    }
}

impl Drop for FilesVisitor<'_> {
    fn drop(&mut self) {
        self.state.files.lock().append(&mut self.files);
    }
}
