//! DNS Latency Ranker
//!
//! Probes a list of candidate DNS resolvers concurrently, measures the average
//! latency of a small set of sample queries against each one, discards the
//! resolvers that are too slow or failing, and ranks the rest.

pub mod candidates;
pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod selector;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Candidate, Config, Measurement, RankedResult, SampleQuery};
pub use dns::{QueryTransport, ResolverTransport};
pub use probe::{Prober, ProbeConfig, ProbeReport};
pub use executor::{Dispatcher, DispatchSummary};
pub use selector::Selector;
pub use output::{OutputFormatter, ColoredFormatter, PlainFormatter, OutputFormatterFactory, OutputWriter};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Bound on each sample query; also the latency reported for a failed probe
    pub const DEFAULT_CEILING: Duration = Duration::from_secs(1);
    /// Averages at or above this never qualify
    pub const DEFAULT_QUALIFY_THRESHOLD: Duration = Duration::from_secs(1);
    pub const DEFAULT_RESOLVER_PORT: u16 = 53;
    /// Non-positive means keep every qualified candidate, unsorted
    pub const DEFAULT_TOP_N: i64 = -1;
    pub const DEFAULT_SAMPLE_DOMAINS: &[&str] = &[
        "www.google.com.",
        "youtube.com.",
        "facebook.com.",
    ];
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    /// Upper bound accepted for the ceiling and the threshold
    pub const MAX_LATENCY_BOUND: Duration = Duration::from_secs(60);
}
