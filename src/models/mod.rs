//! Data models and structures for the DNS latency ranker

pub mod config;
pub mod measurement;

// Re-export main model types
pub use config::Config;
pub use measurement::{Candidate, Measurement, RankedResult, SampleQuery};
