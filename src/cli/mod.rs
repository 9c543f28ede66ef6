//! Command-line interface

use crate::config::EnvManager;
use clap::Parser;
use std::path::PathBuf;

/// DNS Latency Ranker - probe DNS resolvers concurrently and rank them by latency
#[derive(Parser, Debug, Clone)]
#[command(name = "dns-latency-ranker")]
#[command(version, about, long_about = None)]
#[command(after_help = EnvManager::display_env_help())]
pub struct Cli {
    /// Candidate list, one resolver address per line ('#' starts a comment)
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Write the ranked addresses to this file instead of printing a table
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Keep the N fastest resolvers, sorted; 0 or a negative value keeps all, unsorted [default: -1]
    #[arg(short = 'n', long = "top", value_name = "N", allow_negative_numbers = true)]
    pub top: Option<i64>,

    /// Per-query ceiling in milliseconds [default: 1000]
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub ceiling_ms: Option<u64>,

    /// Average latency a resolver must beat to be reported, in milliseconds [default: 1000]
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub threshold_ms: Option<u64>,

    /// Port used for candidates given without one [default: 53]
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.file.as_os_str().is_empty() {
            return Err("Candidate list path cannot be empty".to_string());
        }

        if let Some(output) = &self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path cannot be empty".to_string());
            }
            if output == &self.file {
                return Err("Output file must differ from the candidate list".to_string());
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && self.output.is_none() && supports_color()
    }
}

/// Parse a latency bound in milliseconds
fn parse_millis(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    let max_ms = crate::defaults::MAX_LATENCY_BOUND.as_millis() as u64;
    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|ms| {
            if ms == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if ms > max_ms {
                Err(format!("Duration cannot exceed {}ms", max_ms))
            } else {
                Ok(ms)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
