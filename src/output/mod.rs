//! Output formatting and display system
//!
//! Ranked results go either to the console as an aligned `address  latency`
//! table, optionally colored, or to a file as bare addresses, one per line.

mod formatter;
mod colored;

pub use formatter::{
    OutputFormatter,
    PlainFormatter,
    FormattingOptions,
};
pub use colored::{
    ColoredFormatter,
    ColorScheme,
    PerformanceLevel,
};

use crate::{
    error::{AppError, Result},
    executor::DispatchSummary,
    models::RankedResult,
};
use std::{
    io::Write,
    path::{Path, PathBuf},
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Where ranked results are delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Table on stdout
    Console,
    /// Address list written to a file, created or truncated
    File(PathBuf),
}

impl OutputDestination {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(path),
            None => Self::Console,
        }
    }
}

/// Delivers ranked results and auxiliary messages
pub struct OutputWriter {
    formatter: Box<dyn OutputFormatter>,
    destination: OutputDestination,
}

impl OutputWriter {
    pub fn new(formatter: Box<dyn OutputFormatter>, destination: OutputDestination) -> Self {
        Self { formatter, destination }
    }

    pub fn destination(&self) -> &OutputDestination {
        &self.destination
    }

    /// Text that `write_results` would deliver
    pub fn render(&self, result: &RankedResult) -> Result<String> {
        match self.destination {
            OutputDestination::Console => self.formatter.format_table(result),
            OutputDestination::File(_) => self.formatter.format_address_list(result),
        }
    }

    /// Deliver the ranked result to the destination
    pub fn write_results(&self, result: &RankedResult) -> Result<()> {
        let rendered = self.render(result)?;

        match &self.destination {
            OutputDestination::Console => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()?;
            }
            OutputDestination::File(path) => write_file(path, &rendered)?,
        }

        Ok(())
    }

    /// Round counters, for stderr
    pub fn summary(&self, summary: &DispatchSummary) -> Result<String> {
        self.formatter.format_summary(summary)
    }

    pub fn warning(&self, message: &str) -> Result<String> {
        self.formatter.format_warning(message)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create output file {}: {}", path.display(), e)))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| AppError::io(format!("Failed to write output file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;
    use std::time::Duration;

    fn result() -> RankedResult {
        RankedResult::new(
            vec![
                Measurement::new("1.1.1.1", Duration::from_millis(12)),
                Measurement::new("8.8.8.8", Duration::from_millis(30)),
            ],
            true,
        )
    }

    #[test]
    fn test_factory_respects_color_preference() {
        let plain = OutputFormatterFactory::create_plain_formatter();
        let table = plain.format_table(&result()).unwrap();
        assert!(!table.contains('\x1b'));
        assert!(table.starts_with("1.1.1.1         12.00ms\n"));
    }

    #[test]
    fn test_destination_from_path() {
        assert_eq!(OutputDestination::from_path(None), OutputDestination::Console);
        assert_eq!(
            OutputDestination::from_path(Some(PathBuf::from("out.txt"))),
            OutputDestination::File(PathBuf::from("out.txt"))
        );
    }

    #[test]
    fn test_file_output_is_address_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fastest.txt");
        let writer = OutputWriter::new(
            OutputFormatterFactory::create_formatter(true, false),
            OutputDestination::File(path.clone()),
        );

        writer.write_results(&result()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.1.1.1\n8.8.8.8\n");
    }

    #[test]
    fn test_file_output_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fastest.txt");
        std::fs::write(&path, "stale\ncontent\nfrom\nlast\nrun\n").unwrap();

        let writer = OutputWriter::new(
            OutputFormatterFactory::create_plain_formatter(),
            OutputDestination::File(path.clone()),
        );
        writer.write_results(&RankedResult::default()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_unwritable_destination_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("fastest.txt");
        let writer = OutputWriter::new(
            OutputFormatterFactory::create_plain_formatter(),
            OutputDestination::File(path),
        );

        let error = writer.write_results(&result()).unwrap_err();
        assert_eq!(error.category(), "IO");
        assert!(error.to_string().contains("fastest.txt"));
    }
}
