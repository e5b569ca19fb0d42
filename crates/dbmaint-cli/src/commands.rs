//! Command execution.

use crate::args::{Args, Command, UpdateDbArgs};
use crate::formatter::Formatter;
use dbmaint_core::{Pipeline, PipelineError, StoreError};
use dbmaint_store::{CommandRunner, SledExecutionStore, SledHistory};
use std::path::Path;
use thiserror::Error;

/// Command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Invalid command-line configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] dbmaint_core::Error),

    /// The history could not be opened or read.
    #[error("history error: {0}")]
    Store(#[from] StoreError),

    /// Output could not be rendered.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    /// The pipeline aborted; `partial` renders the report up to the failure.
    #[error("{source}")]
    Aborted {
        source: PipelineError,
        partial: String,
    },
}

impl CommandError {
    /// Rendered partial report of an aborted run.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            CommandError::Aborted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Rendered result of a command.
#[derive(Debug)]
pub struct CommandOutput {
    /// Text to print.
    pub rendered: String,
    /// False when a script ended in error.
    pub success: bool,
}

/// Execute the parsed command.
pub fn run(args: &Args, formatter: &dyn Formatter) -> Result<CommandOutput, CommandError> {
    match &args.command {
        Command::UpdateDb(update) => update_db(&args.data_path, update, formatter),
        Command::List => list(&args.data_path, formatter),
    }
}

fn update_db(
    data_path: &Path,
    args: &UpdateDbArgs,
    formatter: &dyn Formatter,
) -> Result<CommandOutput, CommandError> {
    let config = args.to_config()?;
    let history = SledHistory::open(data_path)?;
    let runner = CommandRunner::new(&args.runner).with_args(&args.runner_args);

    tracing::debug!(
        data_path = %data_path.display(),
        runner = runner.program(),
        "opening execution store"
    );
    let mut pipeline = Pipeline::new(config, SledExecutionStore::new(history, runner));

    match pipeline.update_database() {
        Ok(report) => Ok(CommandOutput {
            rendered: formatter.format_report(&report, args.verbose)?,
            success: report.is_success(),
        }),
        Err(source) => {
            let partial = formatter.format_report(&source.report, args.verbose)?;
            Err(CommandError::Aborted { source, partial })
        }
    }
}

fn list(data_path: &Path, formatter: &dyn Formatter) -> Result<CommandOutput, CommandError> {
    let records = SledHistory::open(data_path)?.list()?;
    Ok(CommandOutput {
        rendered: formatter.format_history(&records)?,
        success: true,
    })
}
