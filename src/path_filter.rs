use std::path::Path;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::{Config, ConfigExt, EXCLUDES_KEY, INCLUDES_KEY};

/// `includes`/`excludes` glob lists of a rule set or rule section.
///
/// A path is analyzed when it matches no exclude and, if includes are
/// given, at least one include.
#[derive(Clone, Debug, Default)]
pub struct PathFilters {
    includes: Option<GlobSet>,
    excludes: Option<GlobSet>,
}

impl PathFilters {
    pub fn new(includes: &[String], excludes: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            includes: build_glob_set(includes)?,
            excludes: build_glob_set(excludes)?,
        })
    }

    pub fn from_config(config: &dyn Config) -> anyhow::Result<Self> {
        let includes: Vec<String> = config.value_or_default(INCLUDES_KEY, Vec::new())?;
        let excludes: Vec<String> = config.value_or_default(EXCLUDES_KEY, Vec::new())?;
        Self::new(&includes, &excludes)
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.excludes.as_ref().is_some_and(|set| set.is_match(path)) {
            return false;
        }
        self.includes.as_ref().is_none_or(|set| set.is_match(path))
    }
}

fn build_glob_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid glob pattern `{pattern}`"))?;
        builder.add(glob);
    }
    Ok(Some(builder.build()?))
}
