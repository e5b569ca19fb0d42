//! Pipeline stages.
//!
//! Scan → Filter → Sort → Prune → Execute. Each stage consumes and produces
//! a list of scripts; only the executor produces executed scripts.

pub mod executor;
pub mod filter;
pub mod pruner;
pub mod scanner;
pub mod sorter;

pub use executor::Executor;
pub use filter::Filter;
pub use pruner::Pruner;
pub use scanner::Scanner;
pub use sorter::{Sorter, SortingStrategy};

/// A pipeline stage, used to tag aborted runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Script discovery.
    Scan,
    /// Whitelist/blacklist filtering.
    Filter,
    /// Ordering.
    Sort,
    /// Removal of already executed scripts.
    Prune,
    /// Execution.
    Execute,
}

impl Stage {
    /// Imperative form used in stage banners.
    pub fn verb(&self) -> &'static str {
        match self {
            Stage::Scan => "Scan",
            Stage::Filter => "Filter",
            Stage::Sort => "Sort",
            Stage::Prune => "Prune",
            Stage::Execute => "Execute",
        }
    }

    /// Past participle used in stage summaries.
    pub fn past_participle(&self) -> &'static str {
        match self {
            Stage::Scan => "scanned",
            Stage::Filter => "filtered",
            Stage::Sort => "sorted",
            Stage::Prune => "pruned",
            Stage::Execute => "executed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Scan => write!(f, "scan"),
            Stage::Filter => write!(f, "filter"),
            Stage::Sort => write!(f, "sort"),
            Stage::Prune => write!(f, "prune"),
            Stage::Execute => write!(f, "execute"),
        }
    }
}
