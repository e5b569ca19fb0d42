//! Execution outcomes and executed scripts.

use super::Script;
use serde::{Deserialize, Serialize};

/// Current time in microseconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_micros() as u64
}

/// Terminal classification of one script's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Executed successfully.
    Ok,
    /// Executed and failed.
    Ko,
    /// Recorded as executed without running.
    ForceMarkedAsExecuted,
    /// Would have been executed (dry run).
    ShouldBeExecuted,
}

impl ExecutionStatus {
    /// Stable string form, as stored in execution history.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Ok => "OK",
            ExecutionStatus::Ko => "KO",
            ExecutionStatus::ForceMarkedAsExecuted => "FORCE_MARKED_AS_EXECUTED",
            ExecutionStatus::ShouldBeExecuted => "SHOULD_BE_EXECUTED",
        }
    }

    /// Whether this status is recorded in the execution history.
    pub fn is_recorded(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Ok | ExecutionStatus::ForceMarkedAsExecuted
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(ExecutionStatus::Ok),
            "KO" => Ok(ExecutionStatus::Ko),
            "FORCE_MARKED_AS_EXECUTED" => Ok(ExecutionStatus::ForceMarkedAsExecuted),
            "SHOULD_BE_EXECUTED" => Ok(ExecutionStatus::ShouldBeExecuted),
            other => Err(format!("unknown execution status: {}", other)),
        }
    }
}

/// Result of asking a store to execute one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the script ran successfully.
    pub succeeded: bool,
    /// Output or error message produced by the execution.
    pub diagnostic: Option<String>,
}

impl ExecutionOutcome {
    /// A successful execution.
    pub fn success() -> Self {
        Self {
            succeeded: true,
            diagnostic: None,
        }
    }

    /// A failed execution.
    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Attach a diagnostic.
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }
}

/// A script together with the outcome of its execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedScript {
    #[serde(flatten)]
    script: Script,
    status: ExecutionStatus,
    duration_millis: u64,
    executed_at: Option<u64>,
    output: Option<String>,
}

impl ExecutedScript {
    /// Classify a real execution.
    pub fn executed(script: Script, outcome: ExecutionOutcome, duration_millis: u64) -> Self {
        let status = if outcome.succeeded {
            ExecutionStatus::Ok
        } else {
            ExecutionStatus::Ko
        };
        Self {
            script,
            status,
            duration_millis,
            executed_at: Some(current_timestamp()),
            output: outcome.diagnostic,
        }
    }

    /// Record a script as executed without running it.
    pub fn force_marked(script: Script) -> Self {
        Self {
            script,
            status: ExecutionStatus::ForceMarkedAsExecuted,
            duration_millis: 0,
            executed_at: Some(current_timestamp()),
            output: None,
        }
    }

    /// A script that a dry run would have executed.
    pub fn should_be_executed(script: Script) -> Self {
        Self {
            script,
            status: ExecutionStatus::ShouldBeExecuted,
            duration_millis: 0,
            executed_at: None,
            output: None,
        }
    }

    /// The underlying script.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The script name.
    pub fn name(&self) -> &str {
        self.script.name()
    }

    /// Execution status.
    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Wall-clock execution time; 0 when nothing ran.
    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    /// Execution time in microseconds since the Unix epoch.
    pub fn executed_at(&self) -> Option<u64> {
        self.executed_at
    }

    /// Diagnostic output of the execution.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}
