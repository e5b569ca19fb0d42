//! In-memory execution store.

use super::{ExecutionStore, ScriptRecord};
use crate::error::StoreError;
use crate::script::{ExecutedScript, ExecutionOutcome, ExecutionStatus, Script};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// A mutating call received by a [`MemoryExecutionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `execute_script` for the named script.
    Execute(String),
    /// `mark_as_executed` for the named script.
    Mark(String),
}

/// Execution store keeping its history in memory.
///
/// Script failures and infrastructure faults can be scripted per script
/// name, which makes it the store of choice for tests and rehearsals.
#[derive(Debug, Default)]
pub struct MemoryExecutionStore {
    history: Vec<ScriptRecord>,
    failing: BTreeSet<String>,
    execute_errors: BTreeMap<String, StoreError>,
    mark_errors: BTreeMap<String, StoreError>,
    list_error: Option<StoreError>,
    calls: Vec<StoreCall>,
    list_calls: Cell<usize>,
}

impl MemoryExecutionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload the history with a successful execution of `script`.
    pub fn with_recorded(mut self, script: &Script) -> Self {
        self.history.push(ScriptRecord {
            identifier: script.identifier().to_string(),
            checksum: script.checksum().to_string(),
            name: script.name().to_string(),
            status: ExecutionStatus::Ok,
            executed_at: Some(0),
            duration_millis: 0,
        });
        self
    }

    /// Make the execution of the named script report a failure.
    pub fn with_failing_script(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Make `execute_script` raise `error` for the named script.
    pub fn with_execute_error(mut self, name: impl Into<String>, error: StoreError) -> Self {
        self.execute_errors.insert(name.into(), error);
        self
    }

    /// Make `mark_as_executed` raise `error` for the named script.
    pub fn with_mark_error(mut self, name: impl Into<String>, error: StoreError) -> Self {
        self.mark_errors.insert(name.into(), error);
        self
    }

    /// Make `list_executed_scripts` raise `error`.
    pub fn with_list_error(mut self, error: StoreError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Recorded history.
    pub fn history(&self) -> &[ScriptRecord] {
        &self.history
    }

    /// Mutating calls received so far, in order.
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    /// Names passed to `execute_script`, in order.
    pub fn executed_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Execute(name) => Some(name.as_str()),
                StoreCall::Mark(_) => None,
            })
            .collect()
    }

    /// Names passed to `mark_as_executed`, in order.
    pub fn marked_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Mark(name) => Some(name.as_str()),
                StoreCall::Execute(_) => None,
            })
            .collect()
    }

    /// Number of `list_executed_scripts` calls.
    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }
}

impl ExecutionStore for MemoryExecutionStore {
    fn list_executed_scripts(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        self.list_calls.set(self.list_calls.get() + 1);
        match &self.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.history.clone()),
        }
    }

    fn execute_script(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError> {
        self.calls.push(StoreCall::Execute(script.name().to_string()));

        if let Some(error) = self.execute_errors.get(script.name()) {
            return Err(error.clone());
        }

        if self.failing.contains(script.name()) {
            Ok(ExecutionOutcome::failure(format!("{} failed", script.name())))
        } else {
            Ok(ExecutionOutcome::success())
        }
    }

    fn mark_as_executed(&mut self, script: &ExecutedScript) -> Result<(), StoreError> {
        self.calls.push(StoreCall::Mark(script.name().to_string()));

        if let Some(error) = self.mark_errors.get(script.name()) {
            return Err(error.clone());
        }

        self.history.push(ScriptRecord::from_executed(script));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::IdentifierPattern;

    fn script(name: &str) -> Script {
        Script::new(name, format!("content of {}", name), &IdentifierPattern::default()).unwrap()
    }

    #[test]
    fn test_recorded_history_is_listed() {
        let store = MemoryExecutionStore::new().with_recorded(&script("V1"));
        let listed = store.list_executed_scripts().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].checksum, script("V1").checksum());
        assert_eq!(store.list_calls(), 1);
    }

    #[test]
    fn test_failing_script_reports_in_band() {
        let mut store = MemoryExecutionStore::new().with_failing_script("V2");
        assert!(store.execute_script(&script("V1")).unwrap().succeeded);
        assert!(!store.execute_script(&script("V2")).unwrap().succeeded);
        assert_eq!(store.executed_names(), vec!["V1", "V2"]);
    }

    #[test]
    fn test_mark_appends_history() {
        let mut store = MemoryExecutionStore::new();
        let executed = ExecutedScript::force_marked(script("V1"));
        store.mark_as_executed(&executed).unwrap();
        store.mark_as_executed(&executed).unwrap();

        assert_eq!(store.history().len(), 2);
        assert_eq!(store.history()[0].status, ExecutionStatus::ForceMarkedAsExecuted);
        assert_eq!(store.marked_names(), vec!["V1", "V1"]);
    }

    #[test]
    fn test_scripted_faults() {
        let mut store = MemoryExecutionStore::new()
            .with_list_error(StoreError::unavailable("down"))
            .with_mark_error("V1", StoreError::persistence("disk full"));

        assert!(store.list_executed_scripts().is_err());
        let executed = ExecutedScript::force_marked(script("V1"));
        assert_eq!(
            store.mark_as_executed(&executed).unwrap_err(),
            StoreError::persistence("disk full")
        );
        assert!(store.history().is_empty());
    }
}
