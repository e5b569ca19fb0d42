//! Pipeline configuration.

use crate::script::{IdentifierPattern, Tag, TagMatcher};
use crate::step::SortingStrategy;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default directory scanned for scripts.
pub const DEFAULT_SCAN_PATH: &str = "./scripts";

/// Run-wide policy controlling what the executor does with each script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// Execute scripts and record them.
    #[default]
    Normal,
    /// Record scripts as executed without running them.
    ForceMarkAsExecuted,
    /// Report what would be executed; no execution, no recording.
    Dry,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Normal => write!(f, "NORMAL"),
            ExecutionMode::ForceMarkAsExecuted => write!(f, "FORCE_MARK_AS_EXECUTED"),
            ExecutionMode::Dry => write!(f, "DRY"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NORMAL" => Ok(ExecutionMode::Normal),
            "FORCE_MARK_AS_EXECUTED" => Ok(ExecutionMode::ForceMarkAsExecuted),
            "DRY" => Ok(ExecutionMode::Dry),
            _ => Err(format!(
                "unknown execution mode {}: expected NORMAL, FORCE_MARK_AS_EXECUTED or DRY",
                s
            )),
        }
    }
}

/// Configuration of one pipeline run.
///
/// Assembled once by the caller and never modified by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory containing the scripts.
    pub scan_path: PathBuf,

    /// Pattern extracting identifiers from script names.
    pub identifier_pattern: IdentifierPattern,

    /// Tags assigned by path globs during the scan.
    pub tag_matchers: Vec<TagMatcher>,

    /// Whether parent folder names become tags.
    pub create_tags_from_folder: bool,

    /// When non-empty, only scripts carrying one of these tags are kept.
    pub whitelisted_tags: BTreeSet<Tag>,

    /// Scripts carrying one of these tags are dropped.
    pub blacklisted_tags: BTreeSet<Tag>,

    /// Already executed scripts carrying one of these tags run again.
    pub tags_to_play_again: BTreeSet<Tag>,

    /// Execution policy.
    pub execution_mode: ExecutionMode,

    /// How identifiers are ordered.
    pub sorting_strategy: SortingStrategy,

    /// Report configuration and every skipped script.
    pub verbose: bool,
}

impl PipelineConfig {
    /// Create a configuration scanning the given directory.
    pub fn new(scan_path: impl Into<PathBuf>) -> Self {
        Self {
            scan_path: scan_path.into(),
            identifier_pattern: IdentifierPattern::default(),
            tag_matchers: Vec::new(),
            create_tags_from_folder: false,
            whitelisted_tags: BTreeSet::new(),
            blacklisted_tags: BTreeSet::new(),
            tags_to_play_again: BTreeSet::new(),
            execution_mode: ExecutionMode::default(),
            sorting_strategy: SortingStrategy::default(),
            verbose: false,
        }
    }

    /// Set the identifier pattern.
    pub fn with_identifier_pattern(mut self, pattern: IdentifierPattern) -> Self {
        self.identifier_pattern = pattern;
        self
    }

    /// Add a tag matcher.
    pub fn with_tag_matcher(mut self, matcher: TagMatcher) -> Self {
        self.tag_matchers.push(matcher);
        self
    }

    /// Enable or disable folder tags.
    pub fn with_tags_from_folder(mut self, enabled: bool) -> Self {
        self.create_tags_from_folder = enabled;
        self
    }

    /// Set the whitelisted tags.
    pub fn with_whitelisted_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.whitelisted_tags = tags.into_iter().collect();
        self
    }

    /// Set the blacklisted tags.
    pub fn with_blacklisted_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.blacklisted_tags = tags.into_iter().collect();
        self
    }

    /// Set the tags to play again.
    pub fn with_tags_to_play_again(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags_to_play_again = tags.into_iter().collect();
        self
    }

    /// Set the execution mode.
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Set the sorting strategy.
    pub fn with_sorting_strategy(mut self, strategy: SortingStrategy) -> Self {
        self.sorting_strategy = strategy;
        self
    }

    /// Enable verbose reporting.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Key/value description of the configuration.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        fn join(tags: &BTreeSet<Tag>) -> String {
            tags.iter().map(Tag::name).collect::<Vec<_>>().join(",")
        }

        let matchers = self
            .tag_matchers
            .iter()
            .map(|m| format!("{}=[{}]", m.tag(), m.globs().collect::<Vec<_>>().join(", ")))
            .collect::<Vec<_>>()
            .join(" ");

        vec![
            ("scan.path", self.scan_path.display().to_string()),
            ("scan.identifier.regex", self.identifier_pattern.to_string()),
            ("scan.tags.createFromFolder", self.create_tags_from_folder.to_string()),
            ("tags", matchers),
            ("tags.whitelisted", join(&self.whitelisted_tags)),
            ("tags.blacklisted", join(&self.blacklisted_tags)),
            ("prune.tags.to.run.again", join(&self.tags_to_play_again)),
            ("execution.mode", self.execution_mode.to_string()),
            ("sort.strategy", self.sorting_strategy.to_string()),
            ("verbose", self.verbose.to_string()),
        ]
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_PATH)
    }
}
