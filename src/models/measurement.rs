//! Candidate, sample query and measurement data models

use crate::types::{AppError, QueryType, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// A resolver address under evaluation, exactly as it was read
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate(String);

impl Candidate {
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &str {
        &self.0
    }

    /// Resolve the candidate to the socket the exchange is sent to.
    ///
    /// Accepts `IP`, `IP:port` and `[IPv6]:port`; a bare IP gets `default_port`.
    pub fn socket_addr(&self, default_port: u16) -> Result<SocketAddr> {
        let address = self.0.trim();

        if let Ok(socket) = address.parse::<SocketAddr>() {
            return Ok(socket);
        }

        address
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, default_port))
            .map_err(|e| AppError::parse(format!("Invalid resolver address '{}': {}", address, e)))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Candidate {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// One fixed lookup used as a latency sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleQuery {
    /// Fully qualified domain name, trailing dot included
    pub name: String,
    pub query_type: QueryType,
}

impl SampleQuery {
    /// Create a sample query; the name is made fully qualified
    pub fn new<S: AsRef<str>>(name: S, query_type: QueryType) -> Self {
        let name = name.as_ref().trim();
        let name = if name.ends_with('.') {
            name.to_string()
        } else {
            format!("{}.", name)
        };
        Self { name, query_type }
    }

    pub fn a<S: AsRef<str>>(name: S) -> Self {
        Self::new(name, QueryType::A)
    }
}

impl fmt::Display for SampleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.query_type)
    }
}

/// A qualifying candidate paired with its average query latency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    address: String,
    average_latency: Duration,
}

impl Measurement {
    pub fn new<S: Into<String>>(address: S, average_latency: Duration) -> Self {
        Self {
            address: address.into(),
            average_latency,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn average_latency(&self) -> Duration {
        self.average_latency
    }

    /// Average latency in seconds
    pub fn latency_secs(&self) -> f64 {
        self.average_latency.as_secs_f64()
    }

    /// Average latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.average_latency.as_secs_f64() * 1000.0
    }
}

/// Final list of measurements handed to the output layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    measurements: Vec<Measurement>,
    /// Whether the list is ordered by latency or left in arrival order
    sorted: bool,
}

impl RankedResult {
    pub fn new(measurements: Vec<Measurement>, sorted: bool) -> Self {
        Self { measurements, sorted }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }

    /// The fastest measurement, if the list is ordered and not empty
    pub fn best(&self) -> Option<&Measurement> {
        if self.sorted {
            self.measurements.first()
        } else {
            self.measurements.iter().min_by_key(|m| m.average_latency)
        }
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}
