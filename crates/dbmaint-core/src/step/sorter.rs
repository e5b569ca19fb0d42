//! Deterministic ordering of scripts.

use super::Stage;
use crate::script::Script;
use crate::sink::{EventSink, PipelineEvent};
use std::cmp::Ordering;

/// How identifiers are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortingStrategy {
    /// Byte-wise comparison.
    #[default]
    Alphabetical,
    /// Digit runs compare numerically, so `V2` sorts before `V10`.
    Natural,
}

impl SortingStrategy {
    /// Compare two identifiers.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SortingStrategy::Alphabetical => a.cmp(b),
            SortingStrategy::Natural => natural_cmp(a, b),
        }
    }
}

impl std::fmt::Display for SortingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortingStrategy::Alphabetical => write!(f, "alphabetical"),
            SortingStrategy::Natural => write!(f, "natural"),
        }
    }
}

impl std::str::FromStr for SortingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alphabetical" => Ok(SortingStrategy::Alphabetical),
            "natural" => Ok(SortingStrategy::Natural),
            _ => Err(format!(
                "unknown sorting strategy {}: expected alphabetical or natural",
                s
            )),
        }
    }
}

/// Splits `s` into maximal runs of ASCII digits and non-digits.
fn runs(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(run)
    })
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = runs(a);
    let mut right = runs(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let both_numeric =
                    x.starts_with(|c: char| c.is_ascii_digit()) && y.starts_with(|c: char| c.is_ascii_digit());
                let ordering = if both_numeric {
                    let x_trimmed = x.trim_start_matches('0');
                    let y_trimmed = y.trim_start_matches('0');
                    x_trimmed
                        .len()
                        .cmp(&y_trimmed.len())
                        .then_with(|| x_trimmed.cmp(y_trimmed))
                        .then_with(|| x.len().cmp(&y.len()))
                } else {
                    x.cmp(y)
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Orders scripts by identifier.
///
/// Ties are broken by name, checksum and path, so the result does not
/// depend on the input order.
pub struct Sorter<'a> {
    strategy: SortingStrategy,
    sink: &'a dyn EventSink,
}

impl<'a> Sorter<'a> {
    /// Create a sorter.
    pub fn new(strategy: SortingStrategy, sink: &'a dyn EventSink) -> Self {
        Self { strategy, sink }
    }

    /// Total order used by [`Sorter::sort`].
    pub fn compare(&self, a: &Script, b: &Script) -> Ordering {
        self.strategy
            .compare(a.identifier(), b.identifier())
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.checksum().cmp(b.checksum()))
            .then_with(|| a.path().cmp(b.path()))
    }

    /// Sort scripts.
    pub fn sort(&self, mut scripts: Vec<Script>) -> Vec<Script> {
        self.sink.record(PipelineEvent::StageStarted { stage: Stage::Sort });
        scripts.sort_by(|a, b| self.compare(a, b));
        self.sink.record(PipelineEvent::StageCompleted {
            stage: Stage::Sort,
            kept: scripts.len(),
            skipped: 0,
        });
        scripts
    }
}
