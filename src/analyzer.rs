use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::check::{Checker, WorkUnit};
use crate::config::{AUTO_CORRECT_KEY, Config, ConfigExt, DisabledAutoCorrectConfig, SEVERITY_KEY};
use crate::detektion::Detektion;
use crate::discovery::{DiscoveryOptions, discover_files};
use crate::error::AnalyzerError;
use crate::extension::{Extension, Extensions};
use crate::finding::Severity;
use crate::frontend::{FrontEnd, ParsedFile, SourceFile};
use crate::notification::Notification;
use crate::path_filter::PathFilters;
use crate::plan::{ExecutionPlan, PlannedRule, RuleSetPlan};
use crate::rule::RuleInstance;
use crate::rule_set::{RuleDefinition, RuleSetProvider};
use crate::settings::Settings;
use crate::utils::isolate;

/// Entry point of a run: a configuration, a front-end, the registered rule
/// set providers and extensions.
///
/// ```
/// use std::sync::Arc;
/// use inspekt::analyzer::Analyzer;
/// use inspekt::config::LayeredConfig;
/// use inspekt::frontend::SourceFile;
/// use inspekt::plain_text::PlainTextFrontEnd;
/// use inspekt::rules::FormattingProvider;
///
/// let analyzer = Analyzer::new(LayeredConfig::empty().into_shared(), Arc::new(PlainTextFrontEnd::new()))
///     .with_provider(FormattingProvider);
/// let detektion = analyzer
///     .run_sources(vec![SourceFile::new("a.txt", "one\ttwo\n")])
///     .unwrap();
/// assert_eq!(detektion.findings().len(), 1);
/// ```
pub struct Analyzer {
    config: Arc<dyn Config>,
    front_end: Arc<dyn FrontEnd>,
    providers: Vec<Arc<dyn RuleSetProvider>>,
    extensions: Vec<Arc<dyn Extension>>,
    settings: Settings,
    discovery: DiscoveryOptions,
}

impl Analyzer {
    pub fn new(config: Arc<dyn Config>, front_end: Arc<dyn FrontEnd>) -> Self {
        let discovery = DiscoveryOptions::default().with_extensions(front_end.extensions().iter().copied());
        Self {
            config,
            front_end,
            providers: Vec::new(),
            extensions: Vec::new(),
            settings: Settings::default(),
            discovery,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    /// Register a rule set provider. Rule sets run in registration order.
    pub fn with_provider(mut self, provider: impl RuleSetProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Arc<dyn RuleSetProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Register an extension. Hooks run in registration order.
    pub fn with_extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    pub fn with_shared_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Analyze files and directories. Directories are walked for files the
    /// front-end understands.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Detektion, AnalyzerError> {
        if self.providers.is_empty() && paths.is_empty() {
            return Err(AnalyzerError::NothingToAnalyze);
        }
        let mut units = Vec::new();
        let mut notices = Vec::new();
        for file in discover_files(paths, &self.discovery) {
            match file {
                Ok(path) => units.push(WorkUnit::Path(path)),
                Err(error) => {
                    tracing::warn!("Failed to discover files: {error}");
                    notices.push(Notification::FileAnalysisFailed {
                        path: discovery_error_path(&error),
                        cause: error.to_string(),
                    });
                }
            }
        }
        self.execute(units, notices)
    }

    /// Analyze in-memory sources.
    pub fn run_sources(&self, sources: Vec<SourceFile>) -> Result<Detektion, AnalyzerError> {
        self.execute(sources.into_iter().map(WorkUnit::Source).collect(), Vec::new())
    }

    /// Analyze trees parsed beforehand, for instance with a resolution
    /// context attached.
    pub fn run_parsed(&self, files: Vec<ParsedFile>) -> Result<Detektion, AnalyzerError> {
        self.execute(files.into_iter().map(WorkUnit::Parsed).collect(), Vec::new())
    }

    fn execute(&self, units: Vec<WorkUnit>, notices: Vec<Notification>) -> Result<Detektion, AnalyzerError> {
        if self.providers.is_empty() && units.is_empty() && notices.is_empty() {
            return Err(AnalyzerError::NothingToAnalyze);
        }

        let detektion = Detektion::new();
        for notice in notices {
            detektion.notify(notice);
        }

        let extensions = Extensions::new(self.extensions.clone());
        extensions.on_start(&detektion);

        let plan = self.plan(&detektion);
        tracing::debug!(
            "Analyzing {} file(s) with {} rule(s)",
            units.len(),
            plan.rule_count()
        );

        let checker = Checker {
            plan: &plan,
            front_end: self.front_end.as_ref(),
            extensions: &extensions,
            detektion: &detektion,
        };
        checker.check(units, &self.settings)?;

        detektion.finalize();
        extensions.on_finish(&detektion);
        // Hooks and their failures may have added to the aggregate.
        detektion.finalize();
        Ok(detektion)
    }

    /// Resolve which rules run and in which order. Construction failures
    /// and deprecated keys read on the way are reported on `detektion`.
    pub fn plan(&self, detektion: &Detektion) -> ExecutionPlan {
        let root: Arc<dyn Config> = if self.settings.auto_correct {
            Arc::clone(&self.config)
        } else {
            Arc::new(DisabledAutoCorrectConfig::new(Arc::clone(&self.config)))
        };

        let mut plan = ExecutionPlan::default();
        for provider in &self.providers {
            if let Some(rule_set) = self.plan_rule_set(provider.as_ref(), root.as_ref(), detektion) {
                plan.push(rule_set);
            }
        }

        for deprecation in self.config.deprecations().drain() {
            tracing::warn!("{deprecation}");
            detektion.notify(Notification::DeprecatedConfig(deprecation));
        }
        plan
    }

    fn plan_rule_set(
        &self,
        provider: &dyn RuleSetProvider,
        root: &dyn Config,
        detektion: &Detektion,
    ) -> Option<RuleSetPlan> {
        let rule_set_id = provider.rule_set_id().to_string();
        let config = root.sub_config(&rule_set_id);

        let prepared = isolate(|| {
            let active = self.settings.all_rules || config.is_active(true)?;
            if !active {
                return Ok(None);
            }
            let filters = PathFilters::from_config(config.as_ref())?;
            let auto_correct: Option<bool> = config.value_or_none(AUTO_CORRECT_KEY)?;
            Ok(Some((provider.instance(config.as_ref()), filters, auto_correct)))
        });
        let (rule_set, filters, rule_set_auto_correct) = match prepared {
            Ok(Some(prepared)) => prepared,
            Ok(None) => {
                tracing::debug!("Rule set {rule_set_id} is inactive");
                return None;
            }
            Err(cause) => {
                tracing::warn!("Could not construct rule set {rule_set_id}: {cause}");
                detektion.notify(Notification::RuleSetConstructionFailed { rule_set_id, cause });
                return None;
            }
        };

        let mut plan = RuleSetPlan::new(rule_set_id.as_str(), filters);
        for definition in rule_set.iter() {
            let planned = isolate(|| {
                self.plan_rule(definition, config.as_ref(), rule_set_auto_correct)
            });
            match planned {
                Ok(None) => tracing::debug!("Rule {rule_set_id}/{} is inactive", definition.id()),
                Ok(Some((planned, true))) => match planned.rule {
                    RuleInstance::Correctable(rule) => plan.correcting.push(PlannedRule {
                        id: planned.id,
                        severity: planned.severity,
                        aliases: planned.aliases,
                        requires_resolution: planned.requires_resolution,
                        filters: planned.filters,
                        rule,
                    }),
                    rule @ RuleInstance::Inspecting(_) => {
                        plan.inspecting.push(PlannedRule { rule, ..planned });
                    }
                },
                Ok(Some((planned, false))) => plan.inspecting.push(planned),
                Err(cause) => {
                    tracing::warn!("Could not construct rule {rule_set_id}/{}: {cause}", definition.id());
                    detektion.notify(Notification::RuleConstructionFailed {
                        rule_set_id: rule_set_id.clone(),
                        rule_id: definition.id().to_string(),
                        cause,
                    });
                }
            }
        }
        Some(plan)
    }

    /// Build one rule, or `None` when it is inactive. The flag tells whether
    /// the rule corrects.
    fn plan_rule(
        &self,
        definition: &RuleDefinition,
        rule_set_config: &dyn Config,
        rule_set_auto_correct: Option<bool>,
    ) -> anyhow::Result<Option<(PlannedRule<RuleInstance>, bool)>> {
        let config = rule_set_config.sub_config(definition.id());
        let active = self.settings.all_rules || config.is_active(definition.is_active_by_default())?;
        if !active {
            return Ok(None);
        }

        let auto_correct = definition.is_correctable()
            && config
                .value_or_none::<bool>(AUTO_CORRECT_KEY)?
                .or(rule_set_auto_correct)
                .unwrap_or(definition.is_auto_correct_by_default())
            && self.settings.auto_correct;

        let severity = match config.value_or_none::<String>(SEVERITY_KEY)? {
            Some(severity) => severity.parse::<Severity>().map_err(anyhow::Error::msg)?,
            None => definition.default_severity(),
        };
        let filters = PathFilters::from_config(config.as_ref())?;
        let rule = definition.build(config.as_ref())?;

        let planned = PlannedRule {
            id: definition.id().to_string(),
            severity,
            aliases: definition.aliases().to_vec(),
            requires_resolution: definition.needs_resolution(),
            filters,
            rule,
        };
        Ok(Some((planned, auto_correct)))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<&str> = self.providers.iter().map(|p| p.rule_set_id()).collect();
        let extensions: Vec<&str> = self.extensions.iter().map(|e| e.id()).collect();
        f.debug_struct("Analyzer")
            .field("providers", &providers)
            .field("extensions", &extensions)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn discovery_error_path(error: &ignore::Error) -> PathBuf {
    match error {
        ignore::Error::WithPath { path, .. } => path.clone(),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            discovery_error_path(err)
        }
        _ => PathBuf::new(),
    }
}
