//! Run report and its incremental builder.

use crate::script::{ExecutedScript, Script};
use serde::Serialize;

/// Immutable audit trail of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Scripts discovered by the scanner.
    pub scanned: Vec<Script>,
    /// Scripts kept by the filter.
    pub filtered: Vec<Script>,
    /// Scripts left after pruning.
    pub pruned: Vec<Script>,
    /// Scripts processed by the executor, in order.
    pub executed: Vec<ExecutedScript>,
    /// The script that failed, if any.
    pub script_in_error: Option<ExecutedScript>,
}

impl Report {
    /// Whether the run finished without a failing script.
    pub fn is_success(&self) -> bool {
        self.script_in_error.is_none()
    }

    /// Human readable summary, one entry per line.
    ///
    /// Per-stage script names are only listed when `verbose` is set;
    /// executed scripts are always listed.
    pub fn summary_lines(&self, verbose: bool) -> Vec<String> {
        let mut lines = vec!["Summary => ".to_string()];

        let stages: [(&str, &[Script]); 3] = [
            ("scanned", &self.scanned),
            ("filtered", &self.filtered),
            ("pruned", &self.pruned),
        ];
        for (label, scripts) in stages {
            lines.push(format!("- {} files {}", scripts.len(), label));
            if verbose {
                lines.extend(scripts.iter().map(|s| format!(" -> {}", s.name())));
            }
        }

        lines.push(format!("- {} files executed", self.executed.len()));
        lines.extend(self.executed.iter().map(|s| format!(" -> {}", s.name())));

        if let Some(script) = &self.script_in_error {
            lines.push(format!(
                "- but last executed script is in error : {}",
                script.name()
            ));
        }
        lines
    }
}

/// Append-only accumulator for a [`Report`].
#[derive(Debug, Default)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scanned script.
    pub fn add_scanned_script(&mut self, script: Script) {
        self.report.scanned.push(script);
    }

    /// Record a script kept by the filter.
    pub fn add_filtered_script(&mut self, script: Script) {
        self.report.filtered.push(script);
    }

    /// Record a script kept by the pruner.
    pub fn add_pruned_script(&mut self, script: Script) {
        self.report.pruned.push(script);
    }

    /// Record an executed script.
    pub fn add_executed_script(&mut self, script: ExecutedScript) {
        self.report.executed.push(script);
    }

    /// Record the failing script.
    pub fn in_error(&mut self, script: ExecutedScript) {
        self.report.script_in_error = Some(script);
    }

    /// Snapshot the report built so far.
    pub fn to_report(&self) -> Report {
        self.report.clone()
    }

    /// Finish building.
    pub fn into_report(self) -> Report {
        self.report
    }
}
