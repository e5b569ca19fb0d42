//! Script execution state machine.
//!
//! Scripts run one at a time, in the order received:
//!
//! | mode | store call | status | recorded |
//! |------|------------|--------|----------|
//! | `Normal` | `execute_script` | `Ok` / `Ko` | on `Ok` |
//! | `ForceMarkAsExecuted` | none | `ForceMarkedAsExecuted` | yes |
//! | `Dry` | none | `ShouldBeExecuted` | no |
//!
//! A `Ko` stops the run; the failing script becomes the report's
//! script in error and the remaining scripts are left untouched.

use super::Stage;
use crate::config::ExecutionMode;
use crate::error::Result;
use crate::report::{Report, ReportBuilder};
use crate::script::{ExecutedScript, ExecutionStatus, Script};
use crate::sink::{EventSink, PipelineEvent};
use crate::store::ExecutionStore;
use std::time::Instant;

/// Runs scripts against an execution store.
pub struct Executor<'a> {
    mode: ExecutionMode,
    sink: &'a dyn EventSink,
}

impl<'a> Executor<'a> {
    /// Create an executor.
    pub fn new(mode: ExecutionMode, sink: &'a dyn EventSink) -> Self {
        Self { mode, sink }
    }

    /// Execute `scripts` in order and return the resulting report.
    ///
    /// Infrastructure errors from the store abort immediately; everything
    /// processed up to that point is already in `report`.
    pub fn execute<S>(
        &self,
        scripts: Vec<Script>,
        store: &mut S,
        report: &mut ReportBuilder,
    ) -> Result<Report>
    where
        S: ExecutionStore + ?Sized,
    {
        self.sink.record(PipelineEvent::StageStarted {
            stage: Stage::Execute,
        });

        let total = scripts.len();
        let mut processed = 0;

        for script in scripts {
            let executed = self.run_one(script, store)?;
            processed += 1;
            report.add_executed_script(executed.clone());

            self.sink.record(PipelineEvent::ScriptExecuted {
                name: executed.name().to_string(),
                status: executed.status(),
                duration_millis: executed.duration_millis(),
            });

            match executed.status() {
                ExecutionStatus::Ok | ExecutionStatus::ForceMarkedAsExecuted => {
                    self.mark_as_executed(&executed, store)?;
                }
                ExecutionStatus::Ko => {
                    report.in_error(executed);
                    break;
                }
                ExecutionStatus::ShouldBeExecuted => {}
            }
        }

        self.sink.record(PipelineEvent::StageCompleted {
            stage: Stage::Execute,
            kept: processed,
            skipped: total - processed,
        });
        Ok(report.to_report())
    }

    fn run_one<S>(&self, script: Script, store: &mut S) -> Result<ExecutedScript>
    where
        S: ExecutionStore + ?Sized,
    {
        let executed = match self.mode {
            ExecutionMode::Normal => {
                let start = Instant::now();
                let outcome = store.execute_script(&script)?;
                let duration_millis = start.elapsed().as_millis() as u64;
                ExecutedScript::executed(script, outcome, duration_millis)
            }
            ExecutionMode::ForceMarkAsExecuted => ExecutedScript::force_marked(script),
            ExecutionMode::Dry => ExecutedScript::should_be_executed(script),
        };
        Ok(executed)
    }

    fn mark_as_executed<S>(&self, executed: &ExecutedScript, store: &mut S) -> Result<()>
    where
        S: ExecutionStore + ?Sized,
    {
        store.mark_as_executed(executed).map_err(|e| {
            self.sink.record(PipelineEvent::MarkFailed {
                name: executed.name().to_string(),
                error: e.to_string(),
            });
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, StoreError};
    use crate::script::IdentifierPattern;
    use crate::sink::{MemorySink, NullSink};
    use crate::store::{MemoryExecutionStore, StoreCall};

    fn scripts(names: &[&str]) -> Vec<Script> {
        names
            .iter()
            .map(|n| Script::new(*n, format!("run {}", n), &IdentifierPattern::default()).unwrap())
            .collect()
    }

    fn statuses(report: &Report) -> Vec<(&str, ExecutionStatus)> {
        report
            .executed
            .iter()
            .map(|s| (s.name(), s.status()))
            .collect()
    }

    #[test]
    fn test_normal_mode_executes_and_marks_in_order() {
        let mut store = MemoryExecutionStore::new();
        let mut report = ReportBuilder::new();

        let result = Executor::new(ExecutionMode::Normal, &NullSink)
            .execute(scripts(&["S1", "S2"]), &mut store, &mut report)
            .unwrap();

        assert_eq!(
            statuses(&result),
            vec![("S1", ExecutionStatus::Ok), ("S2", ExecutionStatus::Ok)]
        );
        assert_eq!(
            store.calls(),
            &[
                StoreCall::Execute("S1".to_string()),
                StoreCall::Mark("S1".to_string()),
                StoreCall::Execute("S2".to_string()),
                StoreCall::Mark("S2".to_string()),
            ]
        );
        assert!(result.is_success());
    }

    #[test]
    fn test_fail_fast() {
        let mut store = MemoryExecutionStore::new().with_failing_script("S2");
        let mut report = ReportBuilder::new();

        let result = Executor::new(ExecutionMode::Normal, &NullSink)
            .execute(scripts(&["S1", "S2", "S3"]), &mut store, &mut report)
            .unwrap();

        assert_eq!(
            statuses(&result),
            vec![("S1", ExecutionStatus::Ok), ("S2", ExecutionStatus::Ko)]
        );
        let in_error = result.script_in_error.as_ref().unwrap();
        assert_eq!(in_error.name(), "S2");
        assert_eq!(in_error.output(), Some("S2 failed"));
        assert_eq!(store.executed_names(), vec!["S1", "S2"]);
        assert_eq!(store.marked_names(), vec!["S1"]);
    }

    #[test]
    fn test_dry_mode_never_touches_store() {
        let mut store = MemoryExecutionStore::new();
        let mut report = ReportBuilder::new();

        let result = Executor::new(ExecutionMode::Dry, &NullSink)
            .execute(scripts(&["S1", "S2", "S3"]), &mut store, &mut report)
            .unwrap();

        assert!(store.calls().is_empty());
        assert_eq!(result.executed.len(), 3);
        assert!(result
            .executed
            .iter()
            .all(|s| s.status() == ExecutionStatus::ShouldBeExecuted));
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_force_mark_marks_each_script_once_in_order() {
        let mut store = MemoryExecutionStore::new().with_failing_script("S2");
        let mut report = ReportBuilder::new();

        let result = Executor::new(ExecutionMode::ForceMarkAsExecuted, &NullSink)
            .execute(scripts(&["S1", "S2", "S3"]), &mut store, &mut report)
            .unwrap();

        assert!(store.executed_names().is_empty());
        assert_eq!(store.marked_names(), vec!["S1", "S2", "S3"]);
        assert!(result
            .executed
            .iter()
            .all(|s| s.status() == ExecutionStatus::ForceMarkedAsExecuted));
    }

    #[test]
    fn test_mark_failure_aborts() {
        let mut store = MemoryExecutionStore::new()
            .with_mark_error("S1", StoreError::persistence("write failed"));
        let sink = MemorySink::new();
        let mut report = ReportBuilder::new();

        let err = Executor::new(ExecutionMode::Normal, &sink)
            .execute(scripts(&["S1", "S2"]), &mut store, &mut report)
            .unwrap_err();

        assert!(matches!(err, Error::Store(StoreError::Persistence { .. })));
        assert_eq!(store.executed_names(), vec!["S1"]);

        let partial = report.to_report();
        assert_eq!(statuses(&partial), vec![("S1", ExecutionStatus::Ok)]);
        assert!(partial.script_in_error.is_none());
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::MarkFailed { name, .. } if name == "S1")));
    }

    #[test]
    fn test_execute_infrastructure_error_aborts() {
        let mut store = MemoryExecutionStore::new()
            .with_execute_error("S2", StoreError::unavailable("connection reset"));
        let mut report = ReportBuilder::new();

        let err = Executor::new(ExecutionMode::Normal, &NullSink)
            .execute(scripts(&["S1", "S2", "S3"]), &mut store, &mut report)
            .unwrap_err();

        assert!(matches!(err, Error::Store(StoreError::Unavailable { .. })));
        assert_eq!(store.executed_names(), vec!["S1", "S2"]);
        assert_eq!(report.to_report().executed.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let mut store = MemoryExecutionStore::new();
        let mut report = ReportBuilder::new();

        let result = Executor::new(ExecutionMode::Normal, &NullSink)
            .execute(Vec::new(), &mut store, &mut report)
            .unwrap();

        assert!(result.executed.is_empty());
        assert!(result.is_success());
    }
}
