//! Per-candidate latency probe
//!
//! A probe sends every sample query to one candidate, in order, and reduces the
//! elapsed times to a single average. Each exchange runs under an explicit
//! deadline equal to the ceiling; the first query that fails, is cut off by the
//! deadline, or takes at least the ceiling ends the probe and the candidate is
//! reported at exactly the ceiling.

use crate::{
    dns::QueryTransport,
    models::{Candidate, SampleQuery},
    types::ProbeFailure,
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::time::{timeout, Instant};

/// Settings shared by every probe of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Lookups issued against each candidate, in order
    pub sample_queries: Vec<SampleQuery>,
    /// Per-query bound; also the value reported for a disqualified candidate
    pub ceiling: Duration,
    /// Port used when a candidate has none
    pub resolver_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        crate::models::Config::default().probe_config()
    }
}

/// Detailed outcome of probing one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeReport {
    /// Every sample query answered under the ceiling
    Completed {
        average: Duration,
        samples: Vec<Duration>,
    },
    /// The probe stopped at the first failing query
    Disqualified {
        failure: ProbeFailure,
        /// Queries issued before stopping, the failing one included
        attempted: usize,
    },
}

impl ProbeReport {
    /// Reduce the report to a single latency figure, the ceiling standing in
    /// for any disqualification
    pub fn latency(&self, ceiling: Duration) -> Duration {
        match self {
            ProbeReport::Completed { average, .. } => *average,
            ProbeReport::Disqualified { .. } => ceiling,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ProbeReport::Completed { .. })
    }
}

/// Runs probes against candidates through a shared transport
pub struct Prober {
    config: ProbeConfig,
    transport: Arc<dyn QueryTransport>,
}

impl Prober {
    pub fn new(config: ProbeConfig, transport: Arc<dyn QueryTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn ceiling(&self) -> Duration {
        self.config.ceiling
    }

    /// Average latency of `candidate`, or exactly the ceiling if any query failed
    pub async fn probe(&self, candidate: &Candidate) -> Duration {
        self.run(candidate).await.latency(self.config.ceiling)
    }

    /// Probe `candidate` and keep the per-query detail
    pub async fn run(&self, candidate: &Candidate) -> ProbeReport {
        let ceiling = self.config.ceiling;

        let server = match candidate.socket_addr(self.config.resolver_port) {
            Ok(server) => server,
            Err(e) => {
                return ProbeReport::Disqualified {
                    failure: ProbeFailure::QueryError { message: e.to_string() },
                    attempted: 0,
                };
            }
        };

        let mut samples = Vec::with_capacity(self.config.sample_queries.len());

        for query in &self.config.sample_queries {
            let started = Instant::now();
            let outcome = timeout(ceiling, self.transport.exchange(server, query, ceiling)).await;
            let elapsed = started.elapsed();
            let attempted = samples.len() + 1;

            match outcome {
                Err(_) => {
                    return ProbeReport::Disqualified {
                        failure: ProbeFailure::CeilingExceeded,
                        attempted,
                    };
                }
                Ok(Err(e)) => {
                    return ProbeReport::Disqualified {
                        failure: ProbeFailure::QueryError { message: e.to_string() },
                        attempted,
                    };
                }
                Ok(Ok(())) if elapsed >= ceiling => {
                    return ProbeReport::Disqualified {
                        failure: ProbeFailure::CeilingExceeded,
                        attempted,
                    };
                }
                Ok(Ok(())) => samples.push(elapsed),
            }
        }

        if samples.is_empty() {
            // Config validation rejects this; treat it as nothing measured
            return ProbeReport::Disqualified {
                failure: ProbeFailure::QueryError { message: "no sample queries configured".to_string() },
                attempted: 0,
            };
        }

        let total: Duration = samples.iter().sum();
        let average = total / samples.len() as u32;

        ProbeReport::Completed { average, samples }
    }
}
