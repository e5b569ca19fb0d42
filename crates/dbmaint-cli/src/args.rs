//! Command-line arguments.

use crate::formatter::OutputFormat;
use clap::{Parser, Subcommand};
use dbmaint_core::config::DEFAULT_SCAN_PATH;
use dbmaint_core::script::DEFAULT_IDENTIFIER_PATTERN;
use dbmaint_core::{
    ExecutionMode, IdentifierPattern, PipelineConfig, SortingStrategy, Tag, TagMatcher,
};
use std::path::PathBuf;

/// Versioned script runner
#[derive(Parser, Debug)]
#[command(name = "dbmaint")]
#[command(version, about = "Run versioned maintenance scripts against a database")]
pub struct Args {
    /// Directory holding the execution history
    #[arg(long, global = true, default_value = "./.dbmaint")]
    pub data_path: PathBuf,

    /// Output format
    #[arg(long, global = true, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan, filter, sort, prune and execute pending scripts
    UpdateDb(UpdateDbArgs),
    /// Print the recorded execution history
    List,
}

/// Arguments of `update-db`.
#[derive(clap::Args, Debug)]
pub struct UpdateDbArgs {
    /// Directory containing the scripts
    #[arg(long, default_value = DEFAULT_SCAN_PATH)]
    pub path: PathBuf,

    /// Regex extracting the identifier from a file name (group 1)
    #[arg(long, default_value = DEFAULT_IDENTIFIER_PATTERN)]
    pub identifier_regex: String,

    /// Only run scripts carrying one of these tags (comma separated)
    #[arg(long)]
    pub whitelisted_tags: Option<String>,

    /// Never run scripts carrying one of these tags (comma separated)
    #[arg(long)]
    pub blacklisted_tags: Option<String>,

    /// Run scripts carrying one of these tags even if already executed
    #[arg(long)]
    pub tags_to_play_again: Option<String>,

    /// Tag definition NAME=[glob1, glob2] (repeatable)
    #[arg(long = "tag", value_name = "NAME=[GLOBS]")]
    pub tags: Vec<TagMatcher>,

    /// Tag scripts with the folders they live in
    #[arg(long)]
    pub create_tags_from_folder: bool,

    /// NORMAL, FORCE_MARK_AS_EXECUTED or DRY
    #[arg(long, default_value_t = ExecutionMode::Normal)]
    pub execution_mode: ExecutionMode,

    /// Identifier ordering: alphabetical or natural
    #[arg(long, default_value_t = SortingStrategy::Alphabetical)]
    pub sorting_strategy: SortingStrategy,

    /// Report per-script decisions
    #[arg(short, long)]
    pub verbose: bool,

    /// Program receiving each script on stdin
    #[arg(long, default_value = "sh")]
    pub runner: String,

    /// Argument passed to the runner program (repeatable)
    #[arg(long = "runner-arg", allow_hyphen_values = true)]
    pub runner_args: Vec<String>,
}

impl UpdateDbArgs {
    /// Convert into a pipeline configuration.
    pub fn to_config(&self) -> dbmaint_core::Result<PipelineConfig> {
        let tags = |list: &Option<String>| {
            list.as_deref().map(Tag::parse_list).unwrap_or_default()
        };

        let config = PipelineConfig::new(&self.path)
            .with_identifier_pattern(IdentifierPattern::new(self.identifier_regex.as_str())?)
            .with_tags_from_folder(self.create_tags_from_folder)
            .with_whitelisted_tags(tags(&self.whitelisted_tags))
            .with_blacklisted_tags(tags(&self.blacklisted_tags))
            .with_tags_to_play_again(tags(&self.tags_to_play_again))
            .with_execution_mode(self.execution_mode)
            .with_sorting_strategy(self.sorting_strategy)
            .with_verbose(self.verbose);

        Ok(self
            .tags
            .iter()
            .cloned()
            .fold(config, PipelineConfig::with_tag_matcher))
    }
}
