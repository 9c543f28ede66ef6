//! Type definitions and aliases

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Record types a sample query may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::A => f.write_str("A"),
            QueryType::AAAA => f.write_str("AAAA"),
        }
    }
}

impl FromStr for QueryType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(QueryType::A),
            "AAAA" => Ok(QueryType::AAAA),
            other => Err(AppError::parse(format!("Unsupported record type: {}", other))),
        }
    }
}

/// Why a probe stopped early and reported the ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeFailure {
    /// The exchange returned an error before the deadline
    QueryError { message: String },
    /// The exchange was aborted by the deadline or took at least the ceiling
    CeilingExceeded,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::QueryError { message } => write!(f, "query error: {}", message),
            ProbeFailure::CeilingExceeded => f.write_str("ceiling exceeded"),
        }
    }
}
