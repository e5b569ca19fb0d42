//! Output formatters for run reports and history.

use clap::ValueEnum;
use comfy_table::Table;
use dbmaint_core::{Report, ScriptRecord};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Result of rendering output.
pub type FormatResult = Result<String, serde_json::Error>;

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the report of a run.
    fn format_report(&self, report: &Report, verbose: bool) -> FormatResult;

    /// Format the execution history.
    fn format_history(&self, records: &[ScriptRecord]) -> FormatResult;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_report(&self, report: &Report, verbose: bool) -> FormatResult {
        let mut output = String::new();

        if !report.executed.is_empty() {
            let mut table = Table::new();
            table.set_header(vec!["Script", "Status", "Duration (ms)", "Output"]);
            for script in &report.executed {
                table.add_row(vec![
                    script.name().to_string(),
                    script.status().to_string(),
                    script.duration_millis().to_string(),
                    script.output().unwrap_or_default().to_string(),
                ]);
            }
            output.push_str(&table.to_string());
            output.push('\n');
        }

        output.push_str(&report.summary_lines(verbose).join("\n"));
        Ok(output)
    }

    fn format_history(&self, records: &[ScriptRecord]) -> FormatResult {
        if records.is_empty() {
            return Ok("No executed scripts".to_string());
        }

        let mut table = Table::new();
        table.set_header(vec!["Script", "Status", "Duration (ms)"]);
        for record in records {
            table.add_row(vec![
                format!("{} ({})", record.name, record.checksum),
                record.status.to_string(),
                record.duration_millis.to_string(),
            ]);
        }
        Ok(table.to_string())
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_report(&self, report: &Report, _verbose: bool) -> FormatResult {
        serde_json::to_string_pretty(report)
    }

    fn format_history(&self, records: &[ScriptRecord]) -> FormatResult {
        serde_json::to_string_pretty(records)
    }
}
