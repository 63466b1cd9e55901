//! Output formatters and run records
//!
//! Provides text and JSON report formats plus an optional JSON run record
//! saved to disk.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BenchResult;
use crate::stats::SummaryReport;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format the summary report for the terminal.
    pub fn format_report(&self, report: &SummaryReport) -> String {
        match self.format {
            OutputFormat::Text => Self::format_text(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        }
    }

    fn format_text(report: &SummaryReport) -> String {
        format!(
            "\nSummary of Latencies:\n\
             Samples: {} ({})\n\
             Average Latency: {:.2} milliseconds\n\
             Max Latency: {:.2} milliseconds\n\
             Min Latency: {:.2} milliseconds\n\
             Median Latency: {:.2} milliseconds\n\
             99th Percentile Latency: {:.2} milliseconds",
            report.count,
            report.strategy,
            report.mean_ms,
            report.max_ms,
            report.min_ms,
            report.median_ms,
            report.p99_ms
        )
    }
}

/// A saved run: summary plus enough metadata to compare runs later.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub target: String,
    pub executions: u32,
    pub failures: u32,
    pub completed_at: DateTime<Utc>,
    pub report: SummaryReport,
}

impl RunRecord {
    /// Write the record as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> BenchResult<()> {
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}
