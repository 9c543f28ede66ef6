//! Colored formatter implementation with terminal color support

use crate::{
    error::Result,
    executor::DispatchSummary,
    models::RankedResult,
};
use super::formatter::{OutputFormatter, FormattingOptions, PlainFormatter};
use colored::*;
use std::fmt::Write as _;

/// Latency tier used for color coding
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceLevel {
    Excellent,  // < 20ms
    Good,       // 20-50ms
    Fair,       // 50-150ms
    Poor,       // 150-500ms
    VeryPoor,   // >= 500ms
}

impl PerformanceLevel {
    /// Determine the tier from an average query latency in milliseconds
    pub fn from_latency_ms(latency_ms: f64) -> Self {
        if latency_ms < 20.0 {
            Self::Excellent
        } else if latency_ms < 50.0 {
            Self::Good
        } else if latency_ms < 150.0 {
            Self::Fair
        } else if latency_ms < 500.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub warning: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            warning: Color::Yellow,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_table(&self, result: &RankedResult) -> Result<String> {
        let mut output = String::new();
        for measurement in result {
            let latency_ms = measurement.latency_ms();
            let level = PerformanceLevel::from_latency_ms(latency_ms);
            // Pad the plain address so escape codes never skew the column
            writeln!(
                output,
                "{:<width$} {}",
                measurement.address(),
                self.colorize(&PlainFormatter::format_latency(latency_ms), level.color()),
                width = self.options.address_width
            )
            .map_err(|e| crate::error::AppError::internal(e.to_string()))?;
        }
        Ok(output)
    }

    fn format_address_list(&self, result: &RankedResult) -> Result<String> {
        // Addresses are meant for files and scripts
        self.plain_formatter.format_address_list(result)
    }

    fn format_summary(&self, summary: &DispatchSummary) -> Result<String> {
        let plain = self.plain_formatter.format_summary(summary)?;
        Ok(plain
            .lines()
            .map(|line| self.colorize(line, self.color_scheme.muted).to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!(
            "{} {}",
            self.colorize("Warning:", self.color_scheme.warning).bold(),
            warning
        ))
    }
}
