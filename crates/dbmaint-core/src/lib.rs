//! dbmaint core - applies versioned scripts to a database exactly once.
//!
//! A run is a pipeline of stages:
//!
//! ```text
//! Scan → Filter → Sort → Prune → Execute → Report
//! ```
//!
//! Scripts are identified by the checksum of their content. The pruner
//! drops every script whose checksum the [`ExecutionStore`] has already
//! recorded, unless the script carries a tag to play again. The executor
//! runs the rest in order and stops at the first failure.
//!
//! # Example
//!
//! ```ignore
//! use dbmaint_core::{ExecutionMode, Pipeline, PipelineConfig, Tag};
//!
//! let config = PipelineConfig::new("./scripts")
//!     .with_tags_to_play_again([Tag::new("rerun")])
//!     .with_execution_mode(ExecutionMode::Dry);
//!
//! let report = Pipeline::new(config, store).update_database()?;
//! for line in report.summary_lines(false) {
//!     println!("{}", line);
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod script;
pub mod sink;
pub mod step;
pub mod store;

pub use config::{ExecutionMode, PipelineConfig};
pub use error::{Error, PipelineError, Result, StoreError};
pub use pipeline::Pipeline;
pub use report::{Report, ReportBuilder};
pub use script::{
    checksum, current_timestamp, ExecutedScript, ExecutionOutcome, ExecutionStatus,
    IdentifierPattern, Script, Tag, TagMatcher,
};
pub use sink::{EventSink, MemorySink, NullSink, PipelineEvent, SkipReason, TracingSink};
pub use step::{SortingStrategy, Stage};
pub use store::{ExecutionStore, MemoryExecutionStore, ScriptRecord, StoreCall};
