//! End-to-end runs against the sled store and the process runner.
#![cfg(unix)]

use dbmaint_core::{
    ExecutionMode, ExecutionStatus, IdentifierPattern, NullSink, Pipeline, PipelineConfig,
    SortingStrategy, Tag,
};
use dbmaint_store::{CommandRunner, SledExecutionStore, SledHistory};
use std::fs;
use std::path::Path;

struct TestContext {
    scripts: tempfile::TempDir,
    data: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            scripts: tempfile::tempdir().unwrap(),
            data: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.scripts.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(&self) -> PipelineConfig {
        PipelineConfig::new(self.scripts.path())
            .with_identifier_pattern(IdentifierPattern::new(r"(\d+)_.*").unwrap())
            .with_sorting_strategy(SortingStrategy::Natural)
    }

    fn pipeline(&self, config: PipelineConfig) -> Pipeline<SledExecutionStore<CommandRunner>> {
        let history = SledHistory::open(self.data.path()).unwrap();
        let store = SledExecutionStore::new(history, CommandRunner::new("sh"));
        Pipeline::new(config, store).with_sink(Box::new(NullSink))
    }

    fn marker(&self, name: &str) -> std::path::PathBuf {
        self.scripts.path().join(".out").join(name)
    }
}

fn touch(path: &Path) -> String {
    format!(
        "mkdir -p '{}' && echo run >> '{}'",
        path.parent().unwrap().display(),
        path.display()
    )
}

#[test]
fn test_scripts_run_once_across_processes() {
    let ctx = TestContext::new();
    ctx.write("1_create.sh", &touch(&ctx.marker("1")));
    ctx.write("2_seed.sh", &touch(&ctx.marker("2")));

    {
        let mut pipeline = ctx.pipeline(ctx.config());
        let report = pipeline.update_database().unwrap();
        assert_eq!(report.executed.len(), 2);
        assert!(report.is_success());
    }

    let mut pipeline = ctx.pipeline(ctx.config());
    let report = pipeline.update_database().unwrap();
    assert!(report.pruned.is_empty());
    assert!(report.executed.is_empty());

    assert_eq!(fs::read_to_string(ctx.marker("1")).unwrap(), "run\n");
    assert_eq!(fs::read_to_string(ctx.marker("2")).unwrap(), "run\n");
    assert_eq!(pipeline.list_executed_scripts().unwrap().len(), 2);
}

#[test]
fn test_failing_script_stops_the_run() {
    let ctx = TestContext::new();
    ctx.write("1_ok.sh", "true");
    ctx.write("2_broken.sh", "echo 'relation missing' >&2; exit 1");
    ctx.write("10_never.sh", &touch(&ctx.marker("10")));

    let mut pipeline = ctx.pipeline(ctx.config());
    let report = pipeline.update_database().unwrap();

    let in_error = report.script_in_error.as_ref().unwrap();
    assert_eq!(in_error.name(), "2_broken.sh");
    assert_eq!(in_error.status(), ExecutionStatus::Ko);
    assert_eq!(in_error.output(), Some("relation missing"));
    assert_eq!(report.executed.len(), 2);
    assert!(!ctx.marker("10").exists());

    let history = pipeline.list_executed_scripts().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].name, "1_ok.sh");
}

#[test]
fn test_play_again_appends_history() {
    let ctx = TestContext::new();
    ctx.write("1_refresh_view.sh", &touch(&ctx.marker("view")));

    let config = || {
        ctx.config()
            .with_tag_matcher("always=[*_refresh_*]".parse().unwrap())
            .with_tags_to_play_again([Tag::new("always")])
    };

    ctx.pipeline(config()).update_database().unwrap();
    let mut pipeline = ctx.pipeline(config());
    let report = pipeline.update_database().unwrap();

    assert_eq!(report.executed.len(), 1);
    assert_eq!(fs::read_to_string(ctx.marker("view")).unwrap(), "run\nrun\n");
    assert_eq!(pipeline.list_executed_scripts().unwrap().len(), 2);
}

#[test]
fn test_force_mark_records_without_running() {
    let ctx = TestContext::new();
    ctx.write("1_legacy.sh", &touch(&ctx.marker("legacy")));

    let config = ctx
        .config()
        .with_execution_mode(ExecutionMode::ForceMarkAsExecuted);
    let report = ctx.pipeline(config).update_database().unwrap();

    assert_eq!(report.executed[0].status(), ExecutionStatus::ForceMarkedAsExecuted);
    assert!(!ctx.marker("legacy").exists());

    let report = ctx.pipeline(ctx.config()).update_database().unwrap();
    assert!(report.executed.is_empty());
}
