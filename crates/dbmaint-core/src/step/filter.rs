//! Whitelist/blacklist filtering.

use super::Stage;
use crate::report::ReportBuilder;
use crate::script::{Script, Tag};
use crate::sink::{EventSink, PipelineEvent, SkipReason};
use std::collections::BTreeSet;

/// Keeps or drops scripts according to their tags.
///
/// With a non-empty whitelist only scripts carrying a whitelisted tag are
/// kept. The blacklist is applied afterwards and always wins.
pub struct Filter<'a> {
    whitelist: &'a BTreeSet<Tag>,
    blacklist: &'a BTreeSet<Tag>,
    sink: &'a dyn EventSink,
}

impl<'a> Filter<'a> {
    /// Create a filter.
    pub fn new(
        whitelist: &'a BTreeSet<Tag>,
        blacklist: &'a BTreeSet<Tag>,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            whitelist,
            blacklist,
            sink,
        }
    }

    /// Filter `scripts`, recording survivors in the report.
    pub fn filter(&self, scripts: Vec<Script>, report: &mut ReportBuilder) -> Vec<Script> {
        self.sink.record(PipelineEvent::StageStarted {
            stage: Stage::Filter,
        });

        let total = scripts.len();
        let kept: Vec<Script> = scripts
            .into_iter()
            .filter(|script| match self.skip_reason(script) {
                Some(reason) => {
                    self.sink.record(PipelineEvent::ScriptSkipped {
                        stage: Stage::Filter,
                        name: script.name().to_string(),
                        reason,
                    });
                    false
                }
                None => true,
            })
            .collect();

        for script in &kept {
            report.add_filtered_script(script.clone());
        }

        self.sink.record(PipelineEvent::StageCompleted {
            stage: Stage::Filter,
            kept: kept.len(),
            skipped: total - kept.len(),
        });
        kept
    }

    fn skip_reason(&self, script: &Script) -> Option<SkipReason> {
        if !self.whitelist.is_empty() && !self.whitelist.iter().any(|tag| tag.is_included(script)) {
            return Some(SkipReason::NotWhitelisted);
        }
        if self.blacklist.iter().any(|tag| tag.is_included(script)) {
            return Some(SkipReason::Blacklisted);
        }
        None
    }
}
