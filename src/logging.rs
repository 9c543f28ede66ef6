//! Structured logging for the DNS latency ranker
//!
//! This module provides:
//! - Structured log entries with levels, fields and correlation IDs
//! - Console and JSON output formats
//! - A probe logger that records per-candidate outcomes and the round summary
//!
//! Every entry goes to stderr so that stdout only ever carries results.

use crate::error::{AppError, Result};
use crate::executor::DispatchSummary;
use crate::models::{Candidate, Config, Measurement};
use crate::probe::ProbeReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
    /// Fatal level - errors that end the run
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
            LogLevel::Fatal => "\x1b[35m",    // Magenta
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }

    /// Minimum level implied by the verbosity flags
    pub fn for_config(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
}

/// Logger implementation with multiple output formats
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: LogLevel::for_config(config),
            use_color: config.enable_color,
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Set output format
    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Fatal, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }
        drop(context);

        let output = self.render(&entry);
        let _ = writeln!(io::stderr(), "{}", output);
    }

    /// Render an entry in the configured format
    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }

    #[cfg(test)]
    fn build(self) -> LogEntry {
        self.entry
    }
}

/// Logger for probing rounds
pub struct ProbeLogger {
    logger: Logger,
    round_id: String,
}

impl ProbeLogger {
    /// Create a new probe logger
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("PROBE".to_string(), config))
    }

    /// Wrap an existing logger
    pub fn from_logger(logger: Logger) -> Self {
        Self {
            logger,
            round_id: Uuid::new_v4().to_string(),
        }
    }

    /// Correlation ID shared by every entry of this round
    pub fn round_id(&self) -> &str {
        &self.round_id
    }

    /// Log the start of a probing round
    pub async fn log_round_start(&self, candidate_count: usize, config: &Config) {
        self.logger.info(&format!("Probing {} candidates", candidate_count))
            .correlation_id(&self.round_id)
            .field("candidates", candidate_count)
            .field("ceiling_ms", config.ceiling_ms)
            .field("threshold_ms", config.threshold_ms)
            .field("sample_queries", config.sample_queries.len())
            .log()
            .await;
    }

    /// Log the outcome of one probe
    pub async fn log_probe_report(&self, candidate: &Candidate, report: &ProbeReport) {
        match report {
            ProbeReport::Completed { average, samples } => {
                let samples_ms: Vec<f64> = samples.iter().map(|s| s.as_secs_f64() * 1000.0).collect();
                self.logger.debug(&format!("{} answered all sample queries", candidate))
                    .correlation_id(&self.round_id)
                    .field("candidate", candidate.address())
                    .field("average_ms", average.as_secs_f64() * 1000.0)
                    .field("samples_ms", samples_ms)
                    .log()
                    .await;
            }
            ProbeReport::Disqualified { failure, attempted } => {
                self.logger.debug(&format!("{} disqualified: {}", candidate, failure))
                    .correlation_id(&self.round_id)
                    .field("candidate", candidate.address())
                    .field("failure", failure)
                    .field("attempted", attempted)
                    .log()
                    .await;
            }
        }
    }

    /// Log a candidate whose average did not beat the threshold
    pub async fn log_rejected(&self, candidate: &Candidate, average_ms: f64, threshold_ms: u64) {
        self.logger.debug(&format!("{} rejected: {:.2}ms is not below {}ms", candidate, average_ms, threshold_ms))
            .correlation_id(&self.round_id)
            .field("candidate", candidate.address())
            .field("average_ms", average_ms)
            .field("threshold_ms", threshold_ms)
            .log()
            .await;
    }

    /// Log a qualifying measurement
    pub async fn log_measurement(&self, measurement: &Measurement) {
        self.logger.debug(&format!("{} qualified at {:.2}ms", measurement.address(), measurement.latency_ms()))
            .correlation_id(&self.round_id)
            .field("candidate", measurement.address())
            .field("average_ms", measurement.latency_ms())
            .log()
            .await;
    }

    /// Log a probe task that ended without reporting
    pub async fn log_task_failure(&self, error: &AppError) {
        self.logger.error(&format!("Probe task failed: {}", error))
            .correlation_id(&self.round_id)
            .error_info(error)
            .log()
            .await;
    }

    /// Log the round summary
    pub async fn log_dispatch_summary(&self, summary: &DispatchSummary) {
        self.logger.info(&format!(
            "Round finished: {}/{} candidates qualified in {:.3}s",
            summary.qualified,
            summary.candidates,
            summary.duration.as_secs_f64()
        ))
            .correlation_id(&self.round_id)
            .field("candidates", summary.candidates)
            .field("qualified", summary.qualified)
            .field("disqualified", summary.disqualified())
            .field("failed_tasks", summary.failed_tasks)
            .field("duration_ms", summary.duration.as_secs_f64() * 1000.0)
            .log()
            .await;
    }
}

/// Global logger factory and management
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    /// Create a new logger factory
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    /// Create a probe logger tagged with this session
    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }

    /// Get session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeFailure;
    use std::str::FromStr;
    use std::time::Duration;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_level_follows_verbosity_flags() {
        let mut config = Config::default();
        assert_eq!(LogLevel::for_config(&config), LogLevel::Warn);

        config.verbose = true;
        assert_eq!(LogLevel::for_config(&config), LogLevel::Info);

        config.debug = true;
        assert_eq!(LogLevel::for_config(&config), LogLevel::Debug);
    }

    #[test]
    fn test_logger_with_debug_config() {
        let config = Config {
            debug: true,
            enable_color: false,
            ..Default::default()
        };

        let logger = Logger::with_config("TEST".to_string(), &config);
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert_eq!(logger.format, LogFormat::Json);
        assert!(!logger.use_color);
        assert!(logger.include_location);
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(LogLevel::Warn);

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Fatal));
    }

    #[test]
    fn test_console_rendering() {
        let mut logger = Logger::new("PROBE".to_string());
        logger.set_color(false);

        let entry = logger.info("8.8.8.8 qualified")
            .correlation_id("0123456789abcdef")
            .field("average_ms", 12.5)
            .build();
        let line = logger.render(&entry);

        assert!(line.contains(" INFO [PROBE] 8.8.8.8 qualified"));
        assert!(line.contains("[01234567]"));
        assert!(line.contains("average_ms=12.5"));
    }

    #[test]
    fn test_json_rendering() {
        let mut logger = Logger::new("PROBE".to_string());
        logger.set_format(LogFormat::Json);

        let failure = ProbeFailure::CeilingExceeded;
        let entry = logger.debug("1.2.3.4 disqualified")
            .field("failure", &failure)
            .build();
        let value: serde_json::Value = serde_json::from_str(&logger.render(&entry)).unwrap();

        assert_eq!(value["level"], "Debug");
        assert_eq!(value["logger"], "PROBE");
        assert_eq!(value["fields"]["failure"], "CeilingExceeded");
    }

    #[test]
    fn test_error_info_fields() {
        let logger = Logger::new("TEST".to_string());
        let error = AppError::internal("task 3 panicked");

        let entry = logger.error("task failed").error_info(&error).build();

        let mut keys: Vec<&str> = entry.fields.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["error_category", "error_exit_code"]);
        assert_eq!(entry.fields["error_category"], "INTERNAL");
        assert_eq!(entry.fields["error_exit_code"], 99);
    }

    #[tokio::test]
    async fn test_session_id_management() {
        let logger = Logger::new("TEST".to_string());
        logger.set_session_id("test-session".to_string()).await;

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some("test-session"));
    }

    #[tokio::test]
    async fn test_probe_logger_accepts_every_report() {
        let mut config = Config::default();
        config.debug = true;
        let logger = ProbeLogger::new(&config);
        let candidate = Candidate::new("192.0.2.1");

        logger.log_round_start(1, &config).await;
        logger.log_probe_report(&candidate, &ProbeReport::Completed {
            average: Duration::from_millis(12),
            samples: vec![Duration::from_millis(12)],
        }).await;
        logger.log_probe_report(&candidate, &ProbeReport::Disqualified {
            failure: ProbeFailure::CeilingExceeded,
            attempted: 1,
        }).await;
        logger.log_dispatch_summary(&DispatchSummary {
            candidates: 1,
            qualified: 0,
            failed_tasks: 0,
            duration: Duration::from_millis(5),
        }).await;

        assert!(!logger.round_id().is_empty());
    }

    #[tokio::test]
    async fn test_logger_factory() {
        let factory = LoggerFactory::new(Config::default());

        let logger = factory.create_logger("TEST").await;
        assert_eq!(logger.name(), "TEST");
        assert!(!factory.session_id().is_empty());

        let probe_logger = factory.create_probe_logger().await;
        assert_eq!(probe_logger.logger.name(), "PROBE");
    }

    #[test]
    fn test_macros_attach_location() {
        let mut logger = Logger::new("MACRO".to_string());
        logger.set_level(LogLevel::Fatal);

        tokio_test::block_on(async {
            crate::log_debug!(logger, "suppressed {}", 1);
            crate::log_info!(logger, "suppressed {}", 2);
            crate::log_error!(logger, "suppressed {}", 3);
        });

        let entry = logger.error("located")
            .location(file!(), line!(), Some(module_path!()))
            .build();
        let location = entry.location.unwrap();
        assert!(location.file.ends_with("logging.rs"));
        assert_eq!(location.module.as_deref(), Some(module_path!()));
    }
}
