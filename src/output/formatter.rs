//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and the plain text
//! implementation used for files, pipes and `--no-color` runs.

use crate::{
    error::Result,
    executor::DispatchSummary,
    models::RankedResult,
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// One `address  latency` row per measurement, for interactive output
    fn format_table(&self, result: &RankedResult) -> Result<String>;

    /// Bare addresses, one per line, for persisted output
    fn format_address_list(&self, result: &RankedResult) -> Result<String>;

    /// Round counters shown in verbose mode
    fn format_summary(&self, summary: &DispatchSummary) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show the round summary after the table
    pub verbose_mode: bool,
    /// Minimum width of the address column
    pub address_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: false,
            verbose_mode: false,
            address_width: 15,
        }
    }
}

/// Plain text formatter
#[derive(Debug, Clone)]
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Latency cell, milliseconds with two decimals
    pub fn format_latency(latency_ms: f64) -> String {
        format!("{:.2}ms", latency_ms)
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new(FormattingOptions::default())
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_table(&self, result: &RankedResult) -> Result<String> {
        let mut output = String::new();
        for measurement in result {
            writeln!(
                output,
                "{:<width$} {}",
                measurement.address(),
                Self::format_latency(measurement.latency_ms()),
                width = self.options.address_width
            )
            .map_err(|e| crate::error::AppError::internal(e.to_string()))?;
        }
        Ok(output)
    }

    fn format_address_list(&self, result: &RankedResult) -> Result<String> {
        let mut output = String::new();
        for measurement in result {
            output.push_str(measurement.address());
            output.push('\n');
        }
        Ok(output)
    }

    fn format_summary(&self, summary: &DispatchSummary) -> Result<String> {
        let mut lines = vec![
            format!("Candidates probed: {}", summary.candidates),
            format!("Qualified: {}", summary.qualified),
            format!("Disqualified: {}", summary.disqualified()),
        ];
        if summary.failed_tasks > 0 {
            lines.push(format!("Failed tasks: {}", summary.failed_tasks));
        }
        lines.push(format!("Round time: {:.3}s", summary.duration.as_secs_f64()));
        Ok(lines.join("\n"))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("Warning: {}", warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;
    use std::time::Duration;

    fn result() -> RankedResult {
        RankedResult::new(
            vec![
                Measurement::new("1.1.1.1", Duration::from_micros(12_345)),
                Measurement::new("208.67.222.222", Duration::from_micros(98_760)),
                Measurement::new("2001:4860:4860::8888", Duration::from_millis(5)),
            ],
            false,
        )
    }

    #[test]
    fn test_table_rows_are_aligned() {
        let table = PlainFormatter::default().format_table(&result()).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "1.1.1.1         12.35ms");
        assert_eq!(lines[1], "208.67.222.222  98.76ms");
        // Longer addresses overflow the column instead of being cut
        assert_eq!(lines[2], "2001:4860:4860::8888 5.00ms");
    }

    #[test]
    fn test_address_list_has_one_address_per_line() {
        let list = PlainFormatter::default().format_address_list(&result()).unwrap();
        assert_eq!(list, "1.1.1.1\n208.67.222.222\n2001:4860:4860::8888\n");
    }

    #[test]
    fn test_empty_result_formats_to_nothing() {
        let formatter = PlainFormatter::default();
        assert_eq!(formatter.format_table(&RankedResult::default()).unwrap(), "");
        assert_eq!(formatter.format_address_list(&RankedResult::default()).unwrap(), "");
    }

    #[test]
    fn test_summary() {
        let summary = DispatchSummary {
            candidates: 5,
            qualified: 3,
            failed_tasks: 0,
            duration: Duration::from_millis(1250),
        };
        let text = PlainFormatter::default().format_summary(&summary).unwrap();

        assert!(text.contains("Candidates probed: 5"));
        assert!(text.contains("Qualified: 3"));
        assert!(text.contains("Disqualified: 2"));
        assert!(text.contains("Round time: 1.250s"));
        assert!(!text.contains("Failed tasks"));
    }

    #[test]
    fn test_latency_cell() {
        assert_eq!(PlainFormatter::format_latency(0.0), "0.00ms");
        assert_eq!(PlainFormatter::format_latency(999.999), "1000.00ms");
    }
}
