//! Configuration data model and validation

use crate::types::{Result, AppError};
use crate::models::SampleQuery;
use crate::probe::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-query ceiling in milliseconds
    #[serde(default = "default_ceiling_ms")]
    pub ceiling_ms: u64,

    /// Average latency a candidate must beat to be reported, in milliseconds
    #[serde(default = "default_threshold_ms")]
    pub threshold_ms: u64,

    /// Port used for candidates given as a bare IP
    #[serde(default = "default_resolver_port")]
    pub resolver_port: u16,

    /// Number of fastest candidates to keep; values <= 0 keep everything unsorted
    #[serde(default = "default_top_n")]
    pub top_n: i64,

    /// Lookups issued against every candidate, in order
    #[serde(default = "default_sample_queries")]
    pub sample_queries: Vec<SampleQuery>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ceiling_ms: default_ceiling_ms(),
            threshold_ms: default_threshold_ms(),
            resolver_port: default_resolver_port(),
            top_n: default_top_n(),
            sample_queries: default_sample_queries(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-query ceiling as Duration
    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms)
    }

    /// Qualifying threshold as Duration
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }

    /// Settings handed to every probe
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            sample_queries: self.sample_queries.clone(),
            ceiling: self.ceiling(),
            resolver_port: self.resolver_port,
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        let max_ms = crate::defaults::MAX_LATENCY_BOUND.as_millis() as u64;

        if self.ceiling_ms == 0 {
            return Err(AppError::config("Ceiling must be greater than 0"));
        }

        if self.ceiling_ms > max_ms {
            return Err(AppError::config(format!("Ceiling cannot exceed {}ms", max_ms)));
        }

        if self.threshold_ms == 0 {
            return Err(AppError::config("Qualifying threshold must be greater than 0"));
        }

        if self.threshold_ms > max_ms {
            return Err(AppError::config(format!("Qualifying threshold cannot exceed {}ms", max_ms)));
        }

        if self.resolver_port == 0 {
            return Err(AppError::config("Resolver port must be greater than 0"));
        }

        if self.sample_queries.is_empty() {
            return Err(AppError::config("At least one sample query is required"));
        }

        for query in &self.sample_queries {
            if query.name.trim_end_matches('.').is_empty() {
                return Err(AppError::config("Sample query name cannot be empty"));
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(ceiling) = std::env::var("PROBE_CEILING_MS") {
            self.ceiling_ms = ceiling.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_CEILING_MS value '{}': {}", ceiling, e)))?;
        }

        if let Ok(threshold) = std::env::var("QUALIFY_THRESHOLD_MS") {
            self.threshold_ms = threshold.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid QUALIFY_THRESHOLD_MS value '{}': {}", threshold, e)))?;
        }

        if let Ok(port) = std::env::var("RESOLVER_PORT") {
            self.resolver_port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid RESOLVER_PORT value '{}': {}", port, e)))?;
        }

        if let Ok(top_n) = std::env::var("TOP_N") {
            self.top_n = top_n.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TOP_N value '{}': {}", top_n, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_ceiling_ms() -> u64 {
    crate::defaults::DEFAULT_CEILING.as_millis() as u64
}

fn default_threshold_ms() -> u64 {
    crate::defaults::DEFAULT_QUALIFY_THRESHOLD.as_millis() as u64
}

fn default_resolver_port() -> u16 {
    crate::defaults::DEFAULT_RESOLVER_PORT
}

fn default_top_n() -> i64 {
    crate::defaults::DEFAULT_TOP_N
}

fn default_sample_queries() -> Vec<SampleQuery> {
    crate::defaults::DEFAULT_SAMPLE_DOMAINS
        .iter()
        .map(|&name| SampleQuery::a(name))
        .collect()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
