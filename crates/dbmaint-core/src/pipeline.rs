//! The migration pipeline.

use crate::config::PipelineConfig;
use crate::error::{Error, PipelineError, StoreError};
use crate::report::{Report, ReportBuilder};
use crate::script::Script;
use crate::sink::{EventSink, PipelineEvent, TracingSink};
use crate::step::{Executor, Filter, Pruner, Scanner, Sorter, Stage};
use crate::store::{ExecutionStore, ScriptRecord};

/// One exclusive run of the pipeline against an execution store.
///
/// The pipeline owns its store for the duration of the run.
pub struct Pipeline<S> {
    config: PipelineConfig,
    store: S,
    sink: Box<dyn EventSink>,
}

impl<S: ExecutionStore> Pipeline<S> {
    /// Create a pipeline logging through `tracing`.
    pub fn new(config: PipelineConfig, store: S) -> Self {
        let sink = Box::new(TracingSink::new(config.verbose));
        Self {
            config,
            store,
            sink,
        }
    }

    /// Report events to the given sink instead.
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The configuration of this pipeline.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The execution store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the execution store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Scan the configured directory and apply the pending scripts.
    pub fn update_database(&mut self) -> Result<Report, PipelineError> {
        self.report_configuration();
        let mut report = ReportBuilder::new();
        let scripts = Scanner::new(&self.config, self.sink.as_ref())
            .scan(&mut report)
            .map_err(|e| abort(Stage::Scan, e, &report))?;
        self.process(scripts, report)
    }

    /// Apply the given scripts, treating them as the scanned input.
    pub fn run(&mut self, scripts: Vec<Script>) -> Result<Report, PipelineError> {
        self.report_configuration();
        let mut report = ReportBuilder::new();
        for script in &scripts {
            report.add_scanned_script(script.clone());
        }
        self.process(scripts, report)
    }

    /// History recorded by the store.
    pub fn list_executed_scripts(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        self.store.list_executed_scripts()
    }

    fn report_configuration(&self) {
        if self.config.verbose {
            self.sink.record(PipelineEvent::Configuration {
                entries: self.config.describe(),
            });
        }
    }

    fn process(
        &mut self,
        scripts: Vec<Script>,
        mut report: ReportBuilder,
    ) -> Result<Report, PipelineError> {
        let sink = self.sink.as_ref();

        let scripts = Filter::new(
            &self.config.whitelisted_tags,
            &self.config.blacklisted_tags,
            sink,
        )
        .filter(scripts, &mut report);

        let scripts = Sorter::new(self.config.sorting_strategy, sink).sort(scripts);

        let scripts = Pruner::new(&self.config.tags_to_play_again, sink)
            .prune(scripts, &self.store, &mut report)
            .map_err(|e| abort(Stage::Prune, e, &report))?;

        Executor::new(self.config.execution_mode, sink)
            .execute(scripts, &mut self.store, &mut report)
            .map_err(|e| abort(Stage::Execute, e, &report))
    }
}

fn abort(stage: Stage, error: Error, report: &ReportBuilder) -> PipelineError {
    PipelineError::new(stage, error, report.to_report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ExecutionStatus, IdentifierPattern, Tag};
    use crate::sink::MemorySink;
    use crate::store::MemoryExecutionStore;

    fn script(name: &str, tags: &[&str]) -> Script {
        Script::new(name, format!("-- {}", name), &IdentifierPattern::default())
            .unwrap()
            .with_tags(tags.iter().map(|t| Tag::new(*t)))
    }

    fn names(scripts: &[Script]) -> Vec<&str> {
        scripts.iter().map(Script::name).collect()
    }

    #[test]
    fn test_run_chains_stages() {
        let store = MemoryExecutionStore::new().with_recorded(&script("V1", &[]));
        let config = PipelineConfig::default().with_blacklisted_tags([Tag::new("skip")]);
        let mut pipeline = Pipeline::new(config, store).with_sink(Box::new(MemorySink::new()));

        let report = pipeline
            .run(vec![script("V3", &[]), script("V2", &["skip"]), script("V1", &[])])
            .unwrap();

        assert_eq!(names(&report.scanned), vec!["V3", "V2", "V1"]);
        assert_eq!(names(&report.filtered), vec!["V3", "V1"]);
        assert_eq!(names(&report.pruned), vec!["V3"]);
        assert_eq!(report.executed.len(), 1);
        assert_eq!(report.executed[0].status(), ExecutionStatus::Ok);
        assert_eq!(pipeline.store().history().len(), 2);
    }

    #[test]
    fn test_prune_failure_is_tagged() {
        let store = MemoryExecutionStore::new().with_list_error(StoreError::unavailable("down"));
        let mut pipeline =
            Pipeline::new(PipelineConfig::default(), store).with_sink(Box::new(MemorySink::new()));

        let err = pipeline.run(vec![script("V1", &[])]).unwrap_err();

        assert_eq!(err.stage, Stage::Prune);
        assert_eq!(names(&err.report.filtered), vec!["V1"]);
        assert!(err.report.pruned.is_empty());
        assert!(pipeline.store().calls().is_empty());
    }

    #[test]
    fn test_verbose_reports_configuration_on_run() {
        let sink = MemorySink::new();
        let config = PipelineConfig::default().with_verbose(true);
        let mut pipeline =
            Pipeline::new(config, MemoryExecutionStore::new()).with_sink(Box::new(sink.clone()));
        assert!(sink.is_empty());

        pipeline.run(Vec::new()).unwrap();

        assert!(matches!(
            sink.events().first(),
            Some(PipelineEvent::Configuration { .. })
        ));
    }

    #[test]
    fn test_quiet_run_omits_configuration() {
        let sink = MemorySink::new();
        let mut pipeline = Pipeline::new(PipelineConfig::default(), MemoryExecutionStore::new())
            .with_sink(Box::new(sink.clone()));

        pipeline.run(Vec::new()).unwrap();

        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::Configuration { .. })));
    }

    #[test]
    fn test_list_executed_scripts() {
        let store = MemoryExecutionStore::new().with_recorded(&script("V1", &[]));
        let pipeline = Pipeline::new(PipelineConfig::default(), store);

        let history = pipeline.list_executed_scripts().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "V1");
    }
}
