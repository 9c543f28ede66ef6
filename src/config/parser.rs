//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::Result,
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        // .env only fills variables the environment does not already set
        EnvManager::load_env_file(self.cli.debug)?;

        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ceiling_ms) = self.cli.ceiling_ms {
            config.ceiling_ms = ceiling_ms;
        }

        if let Some(threshold_ms) = self.cli.threshold_ms {
            config.threshold_ms = threshold_ms;
        }

        if let Some(port) = self.cli.port {
            config.resolver_port = port;
        }

        if let Some(top) = self.cli.top {
            config.top_n = top;
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        // CLI-only
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!(
                "Final config: ceiling={}ms, threshold={}ms, port={}, top_n={}, enable_color={}",
                config.ceiling_ms, config.threshold_ms, config.resolver_port, config.top_n, config.enable_color
            );
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let queries: Vec<String> = config.sample_queries.iter().map(|q| q.to_string()).collect();
    let top_n = if config.top_n > 0 {
        config.top_n.to_string()
    } else {
        "all (unsorted)".to_string()
    };

    let summary = [
        format!("Sample queries: {}", queries.join(", ")),
        format!("Ceiling: {}ms", config.ceiling_ms),
        format!("Qualifying threshold: {}ms", config.threshold_ms),
        format!("Resolver port: {}", config.resolver_port),
        format!("Top N: {}", top_n),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{clear_env, ENV_LOCK};
    use clap::Parser;
    use std::env;

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let cli = Cli::parse_from([
            "test", "-f", "list.txt",
            "--ceiling-ms", "400",
            "--threshold-ms", "150",
            "--port", "5353",
            "--top", "2",
            "--no-color",
            "--verbose",
        ]);
        let config = ConfigParser::new(cli).parse().unwrap();

        assert_eq!(config.ceiling_ms, 400);
        assert_eq!(config.threshold_ms, 150);
        assert_eq!(config.resolver_port, 5353);
        assert_eq!(config.top_n, 2);
        assert!(!config.enable_color);
        assert!(config.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_env_fills_unset_cli_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PROBE_CEILING_MS", "800");
        env::set_var("TOP_N", "4");

        let cli = Cli::parse_from(["test", "-f", "list.txt"]);
        let config = ConfigParser::new(cli).parse();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.ceiling_ms, 800);
        assert_eq!(config.top_n, 4);
        assert_eq!(config.threshold_ms, 1000);
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("TOP_N", "8");
        env::set_var("QUALIFY_THRESHOLD_MS", "900");

        let cli = Cli::parse_from(["test", "-f", "list.txt", "-n", "-1", "--threshold-ms", "100"]);
        let config = ConfigParser::new(cli).parse();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.top_n, -1);
        assert_eq!(config.threshold_ms, 100);
    }

    #[test]
    fn test_invalid_env_value_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("RESOLVER_PORT", "not-a-port");

        let cli = Cli::parse_from(["test", "-f", "list.txt"]);
        let result = ConfigParser::new(cli).parse();
        clear_env();

        let error = result.unwrap_err();
        assert_eq!(error.category(), "CONFIG");
        assert!(error.to_string().contains("RESOLVER_PORT"));
    }

    #[test]
    fn test_out_of_range_env_value_fails_validation() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PROBE_CEILING_MS", "0");

        let cli = Cli::parse_from(["test", "-f", "list.txt"]);
        let result = ConfigParser::new(cli).parse();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_config_summary() {
        let config = Config::default();
        let summary = display_config_summary(&config);

        assert!(summary.contains("Sample queries: www.google.com. A, youtube.com. A, facebook.com. A"));
        assert!(summary.contains("Ceiling: 1000ms"));
        assert!(summary.contains("Qualifying threshold: 1000ms"));
        assert!(summary.contains("Top N: all (unsorted)"));
    }
}
