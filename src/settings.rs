use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{Config, ConfigExt};
use crate::error::ConfigCastError;

/// Name of the config section holding engine settings.
pub const ENGINE_SECTION: &str = "engine";

/// How many files are analyzed at the same time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// One file after the other on the calling thread.
    Sequential,
    /// A dedicated pool with this many workers.
    Threads(NonZeroUsize),
    /// The global rayon pool, sized after the number of CPUs.
    #[default]
    Auto,
}

impl Parallelism {
    /// `0` means [Parallelism::Auto], `1` means [Parallelism::Sequential].
    pub fn threads(n: usize) -> Self {
        match n {
            0 => Self::Auto,
            1 => Self::Sequential,
            n => NonZeroUsize::new(n).map_or(Self::Auto, Self::Threads),
        }
    }
}

/// Cooperative cancellation of a run, checked before each file starts.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolved settings of one run.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub parallelism: Parallelism,
    /// Let correctable rules rewrite trees. When `false`, the configuration
    /// is read through a wrapper reporting `autoCorrect = false` everywhere.
    pub auto_correct: bool,
    /// Run every rule, ignoring `active` flags.
    pub all_rules: bool,
    pub cancellation: CancellationToken,
}

impl Settings {
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_auto_correct(mut self, auto_correct: bool) -> Self {
        self.auto_correct = auto_correct;
        self
    }

    pub fn with_all_rules(mut self, all_rules: bool) -> Self {
        self.all_rules = all_rules;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Read the `[engine]` section:
    ///
    /// ```toml
    /// [engine]
    /// threads = 4
    /// autoCorrect = true
    /// allRules = false
    /// ```
    pub fn from_config(config: &dyn Config) -> Result<Self, ConfigCastError> {
        let engine = config.sub_config(ENGINE_SECTION);
        Ok(Self {
            parallelism: Parallelism::threads(engine.value_or_default("threads", 0usize)?),
            auto_correct: engine.value_or_default("autoCorrect", false)?,
            all_rules: engine.value_or_default("allRules", false)?,
            cancellation: CancellationToken::new(),
        })
    }
}
