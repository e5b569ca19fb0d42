//! Execution store combining a sled history with a script runner.

use crate::history::SledHistory;
use crate::runner::ScriptRunner;
use dbmaint_core::{
    ExecutedScript, ExecutionOutcome, ExecutionStore, Script, ScriptRecord, StoreError,
};

/// Execution store persisting history in sled and running scripts with `R`.
pub struct SledExecutionStore<R> {
    history: SledHistory,
    runner: R,
}

impl<R: ScriptRunner> SledExecutionStore<R> {
    /// Create a store.
    pub fn new(history: SledHistory, runner: R) -> Self {
        Self { history, runner }
    }

    /// The execution history.
    pub fn history(&self) -> &SledHistory {
        &self.history
    }

    /// The script runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: ScriptRunner> ExecutionStore for SledExecutionStore<R> {
    fn list_executed_scripts(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        self.history.list()
    }

    fn execute_script(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError> {
        self.runner.run(script)
    }

    fn mark_as_executed(&mut self, script: &ExecutedScript) -> Result<(), StoreError> {
        self.history.append(&ScriptRecord::from_executed(script))?;
        tracing::debug!(
            name = script.name(),
            checksum = script.script().checksum(),
            status = %script.status(),
            "execution recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbmaint_core::{ExecutionStatus, IdentifierPattern};

    /// Runner that fails scripts whose content contains "fail".
    struct ContentRunner {
        runs: Vec<String>,
    }

    impl ScriptRunner for ContentRunner {
        fn run(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError> {
            self.runs.push(script.name().to_string());
            if script.content().contains("fail") {
                Ok(ExecutionOutcome::failure("refused"))
            } else {
                Ok(ExecutionOutcome::success())
            }
        }
    }

    #[test]
    fn test_execute_delegates_to_runner() {
        let history = SledHistory::temporary().unwrap();
        let mut store = SledExecutionStore::new(history, ContentRunner { runs: Vec::new() });
        let pattern = IdentifierPattern::default();

        let ok = Script::new("V1", "create", &pattern).unwrap();
        let ko = Script::new("V2", "fail", &pattern).unwrap();

        assert!(store.execute_script(&ok).unwrap().succeeded);
        assert!(!store.execute_script(&ko).unwrap().succeeded);
        assert_eq!(store.runner().runs, vec!["V1", "V2"]);
        assert!(store.list_executed_scripts().unwrap().is_empty());
    }

    #[test]
    fn test_mark_records_history() {
        let history = SledHistory::temporary().unwrap();
        let mut store = SledExecutionStore::new(history, ContentRunner { runs: Vec::new() });
        let script = Script::new("V1", "create", &IdentifierPattern::default()).unwrap();
        let checksum = script.checksum().to_string();

        let executed = ExecutedScript::executed(script, ExecutionOutcome::success(), 7);
        store.mark_as_executed(&executed).unwrap();

        let records = store.list_executed_scripts().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].checksum, checksum);
        assert_eq!(records[0].status, ExecutionStatus::Ok);
        assert_eq!(records[0].duration_millis, 7);
    }
}
