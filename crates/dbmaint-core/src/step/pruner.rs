//! Removal of already executed scripts.

use super::Stage;
use crate::error::Result;
use crate::report::ReportBuilder;
use crate::script::{Script, Tag};
use crate::sink::{EventSink, PipelineEvent, SkipReason};
use crate::store::ExecutionStore;
use std::collections::{BTreeSet, HashSet};

/// Drops scripts whose checksum is already recorded, unless they carry a
/// tag to play again.
pub struct Pruner<'a> {
    tags_to_play_again: &'a BTreeSet<Tag>,
    sink: &'a dyn EventSink,
}

impl<'a> Pruner<'a> {
    /// Create a pruner.
    pub fn new(tags_to_play_again: &'a BTreeSet<Tag>, sink: &'a dyn EventSink) -> Self {
        Self {
            tags_to_play_again,
            sink,
        }
    }

    /// Prune `scripts` against the store history, recording survivors in the report.
    ///
    /// A failure to read the history is returned as is; nothing is pruned.
    pub fn prune<S>(
        &self,
        scripts: Vec<Script>,
        store: &S,
        report: &mut ReportBuilder,
    ) -> Result<Vec<Script>>
    where
        S: ExecutionStore + ?Sized,
    {
        self.sink.record(PipelineEvent::StageStarted {
            stage: Stage::Prune,
        });

        let executed_checksums: HashSet<String> = store
            .list_executed_scripts()?
            .into_iter()
            .map(|record| record.checksum)
            .collect();

        let total = scripts.len();
        let kept: Vec<Script> = scripts
            .into_iter()
            .filter(|script| {
                let already_executed = executed_checksums.contains(script.checksum());
                let play_again = script.has_any_tag(self.tags_to_play_again);
                let skipped = already_executed && !play_again;
                if skipped {
                    self.sink.record(PipelineEvent::ScriptSkipped {
                        stage: Stage::Prune,
                        name: script.name().to_string(),
                        reason: SkipReason::AlreadyExecuted,
                    });
                }
                !skipped
            })
            .collect();

        for script in &kept {
            report.add_pruned_script(script.clone());
        }

        self.sink.record(PipelineEvent::StageCompleted {
            stage: Stage::Prune,
            kept: kept.len(),
            skipped: total - kept.len(),
        });
        Ok(kept)
    }
}
