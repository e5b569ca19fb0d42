//! Execution store interface.
//!
//! The execution store owns the execution history and knows how to run a
//! script against the target database. The pipeline only talks to it
//! through [`ExecutionStore`].

pub mod memory;

pub use memory::{MemoryExecutionStore, StoreCall};

use crate::error::StoreError;
use crate::script::{ExecutedScript, ExecutionOutcome, ExecutionStatus, Script};
use serde::{Deserialize, Serialize};

/// One entry of the execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    /// Script identifier.
    pub identifier: String,
    /// Content checksum.
    pub checksum: String,
    /// Script name.
    pub name: String,
    /// Recorded status.
    pub status: ExecutionStatus,
    /// When the script was recorded (microseconds since epoch).
    pub executed_at: Option<u64>,
    /// Execution time in milliseconds.
    pub duration_millis: u64,
}

impl ScriptRecord {
    /// Build the history entry for an executed script.
    pub fn from_executed(script: &ExecutedScript) -> Self {
        Self {
            identifier: script.script().identifier().to_string(),
            checksum: script.script().checksum().to_string(),
            name: script.name().to_string(),
            status: script.status(),
            executed_at: script.executed_at(),
            duration_millis: script.duration_millis(),
        }
    }
}

/// Persists execution history and executes scripts.
///
/// `list_executed_scripts` returns records in the order they were
/// recorded. Logical script failures are reported through
/// [`ExecutionOutcome::succeeded`]; `Err` means an infrastructure fault.
pub trait ExecutionStore {
    /// List every recorded execution.
    fn list_executed_scripts(&self) -> Result<Vec<ScriptRecord>, StoreError>;

    /// Execute one script.
    fn execute_script(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError>;

    /// Durably record an executed script.
    fn mark_as_executed(&mut self, script: &ExecutedScript) -> Result<(), StoreError>;
}

impl<S: ExecutionStore + ?Sized> ExecutionStore for &mut S {
    fn list_executed_scripts(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        (**self).list_executed_scripts()
    }

    fn execute_script(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError> {
        (**self).execute_script(script)
    }

    fn mark_as_executed(&mut self, script: &ExecutedScript) -> Result<(), StoreError> {
        (**self).mark_as_executed(script)
    }
}

impl<S: ExecutionStore + ?Sized> ExecutionStore for Box<S> {
    fn list_executed_scripts(&self) -> Result<Vec<ScriptRecord>, StoreError> {
        (**self).list_executed_scripts()
    }

    fn execute_script(&mut self, script: &Script) -> Result<ExecutionOutcome, StoreError> {
        (**self).execute_script(script)
    }

    fn mark_as_executed(&mut self, script: &ExecutedScript) -> Result<(), StoreError> {
        (**self).mark_as_executed(script)
    }
}
