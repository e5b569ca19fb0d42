//! Event sinks.
//!
//! Pipeline stages never log through a global: they report
//! [`PipelineEvent`]s to the [`EventSink`] they are given.

use crate::script::ExecutionStatus;
use crate::step::Stage;
use std::sync::{Arc, Mutex};

/// Why a script was dropped from the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The whitelist is set and the script carries none of its tags.
    NotWhitelisted,
    /// The script carries a blacklisted tag.
    Blacklisted,
    /// The checksum is recorded and no tag asks to play it again.
    AlreadyExecuted,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotWhitelisted => write!(f, "not whitelisted"),
            SkipReason::Blacklisted => write!(f, "blacklisted"),
            SkipReason::AlreadyExecuted => write!(
                f,
                "it was already executed and it does not have a tag to play again"
            ),
        }
    }
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Effective configuration, reported once when verbose.
    Configuration {
        /// Key/value pairs describing the configuration.
        entries: Vec<(&'static str, String)>,
    },
    /// A stage started.
    StageStarted {
        /// The stage.
        stage: Stage,
    },
    /// A stage finished.
    StageCompleted {
        /// The stage.
        stage: Stage,
        /// Number of scripts passed on to the next stage.
        kept: usize,
        /// Number of scripts dropped by the stage.
        skipped: usize,
    },
    /// A script was dropped.
    ScriptSkipped {
        /// The stage that dropped it.
        stage: Stage,
        /// Script name.
        name: String,
        /// Why it was dropped.
        reason: SkipReason,
    },
    /// A script reached a terminal status.
    ScriptExecuted {
        /// Script name.
        name: String,
        /// Its status.
        status: ExecutionStatus,
        /// Execution time in milliseconds.
        duration_millis: u64,
    },
    /// Recording an execution failed.
    MarkFailed {
        /// Script name.
        name: String,
        /// Error message.
        error: String,
    },
}

/// Receiver of pipeline events.
pub trait EventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: PipelineEvent);
}

/// Sink that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    verbose: bool,
}

impl TracingSink {
    /// Create a sink; per-script skip messages are `info` only when verbose.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for TracingSink {
    fn record(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::Configuration { entries } => {
                for (key, value) in entries {
                    tracing::info!("{} = {}", key, value);
                }
            }
            PipelineEvent::StageStarted { stage } => {
                tracing::info!(%stage, "{} scripts...", stage.verb());
            }
            PipelineEvent::StageCompleted {
                stage,
                kept,
                skipped,
            } => {
                tracing::info!(
                    %stage,
                    kept,
                    skipped,
                    "{} scripts {}",
                    kept,
                    stage.past_participle()
                );
            }
            PipelineEvent::ScriptSkipped {
                stage,
                name,
                reason,
            } => {
                if self.verbose {
                    tracing::info!(%stage, "{} is skipped because {}", name, reason);
                } else {
                    tracing::debug!(%stage, "{} is skipped because {}", name, reason);
                }
            }
            PipelineEvent::ScriptExecuted {
                name,
                status,
                duration_millis,
            } => match status {
                ExecutionStatus::Ok => {
                    tracing::info!(duration_millis, "{} executed", name)
                }
                ExecutionStatus::ForceMarkedAsExecuted => {
                    tracing::info!("{} only marked (not really executed)", name)
                }
                ExecutionStatus::ShouldBeExecuted => {
                    tracing::info!("{} should be executed (dry run)", name)
                }
                ExecutionStatus::Ko => {
                    tracing::warn!(duration_millis, "{} has not been correctly executed", name)
                }
            },
            PipelineEvent::MarkFailed { name, error } => {
                tracing::error!(%error, "error during mark execution of {}", name);
            }
        }
    }
}

/// In-memory sink for testing.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl MemorySink {
    /// Create a new memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded events.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Names of skipped scripts with the reason they were skipped.
    pub fn skipped(&self) -> Vec<(String, SkipReason)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                PipelineEvent::ScriptSkipped { name, reason, .. } => Some((name.clone(), *reason)),
                _ => None,
            })
            .collect()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: PipelineEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.record(PipelineEvent::StageStarted { stage: Stage::Filter });
        sink.record(PipelineEvent::ScriptSkipped {
            stage: Stage::Filter,
            name: "V1".to_string(),
            reason: SkipReason::Blacklisted,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], PipelineEvent::StageStarted { stage: Stage::Filter });
        assert_eq!(sink.skipped(), vec![("V1".to_string(), SkipReason::Blacklisted)]);
    }

    #[test]
    fn test_memory_sink_clones_share_events() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        sink.record(PipelineEvent::StageStarted { stage: Stage::Scan });
        assert_eq!(handle.events().len(), 1);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NotWhitelisted.to_string(), "not whitelisted");
        assert!(SkipReason::AlreadyExecuted.to_string().contains("play again"));
    }
}
