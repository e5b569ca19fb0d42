//! Core error types.

use crate::report::Report;
use crate::step::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an execution store.
///
/// Logical script failures are not errors: a store reports them in-band
/// through [`ExecutionOutcome`](crate::script::ExecutionOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or read.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// An execution could not be durably recorded.
    #[error("failed to persist execution: {message}")]
    Persistence {
        /// Description of the failure.
        message: String,
    },

    /// Stored history could not be decoded.
    #[error("execution history corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },
}

impl StoreError {
    /// Create an [`StoreError::Unavailable`] error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    /// Create a [`StoreError::Persistence`] error.
    pub fn persistence(message: impl Into<String>) -> Self {
        StoreError::Persistence {
            message: message.into(),
        }
    }

    /// Create a [`StoreError::Corrupted`] error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        StoreError::Corrupted {
            message: message.into(),
        }
    }
}

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A script name does not match the identifier pattern.
    #[error("the file {name} doesn't match the pattern {pattern} and so can't extract its identifier")]
    IdentifierExtraction {
        /// Script name.
        name: String,
        /// The configured identifier pattern.
        pattern: String,
    },

    /// An identifier pattern is not a valid regular expression.
    #[error("invalid identifier pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A tag matcher definition could not be parsed.
    #[error("invalid tag matcher {definition}: {reason}")]
    InvalidTagMatcher {
        /// The rejected definition.
        definition: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Reading scripts from disk failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Execution store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A pipeline run that aborted before completion.
///
/// Carries the stage that failed and the report accumulated up to the
/// failure, so callers can inspect partial progress.
#[derive(Debug, Error)]
#[error("{stage} step failed: {source}")]
pub struct PipelineError {
    /// The stage in which the run aborted.
    pub stage: Stage,
    /// Underlying error.
    #[source]
    pub source: Error,
    /// Partial report at the time of the failure.
    pub report: Box<Report>,
}

impl PipelineError {
    /// Create a new pipeline error.
    pub fn new(stage: Stage, source: Error, report: Report) -> Self {
        Self {
            stage,
            source,
            report: Box::new(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_error_display() {
        let err = Error::IdentifierExtraction {
            name: "init.js".to_string(),
            pattern: "(\\d+)_.*".to_string(),
        };
        assert!(err.to_string().contains("init.js"));
        assert!(err.to_string().contains("(\\d+)_.*"));
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = Error::from(StoreError::unavailable("connection refused"));
        assert_eq!(err.to_string(), "store unavailable: connection refused");
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::new(
            Stage::Prune,
            StoreError::unavailable("timeout").into(),
            Report::default(),
        );
        assert_eq!(err.to_string(), "prune step failed: store unavailable: timeout");
        assert!(err.report.executed.is_empty());
    }
}
