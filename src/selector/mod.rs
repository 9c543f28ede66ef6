//! Aggregation and selection of measurements
//!
//! The selector drains the dispatcher's channel until it closes, then applies
//! the top-N policy: a positive `top_n` sorts ascending by average latency
//! (stable, so equal latencies keep their arrival order) and truncates; zero or
//! a negative value keeps every measurement in arrival order.

use crate::models::{Measurement, RankedResult};
use tokio::sync::mpsc;

/// Top-N selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    top_n: i64,
}

impl Selector {
    pub fn new(top_n: i64) -> Self {
        Self { top_n }
    }

    /// Keep everything, unsorted
    pub fn all() -> Self {
        Self { top_n: 0 }
    }

    /// Number of entries kept, or `None` when no truncation applies
    pub fn limit(&self) -> Option<usize> {
        if self.top_n > 0 {
            Some(usize::try_from(self.top_n).unwrap_or(usize::MAX))
        } else {
            None
        }
    }

    /// Receive every measurement until all senders are gone
    pub async fn drain(receiver: &mut mpsc::UnboundedReceiver<Measurement>) -> Vec<Measurement> {
        let mut measurements = Vec::new();
        while let Some(measurement) = receiver.recv().await {
            measurements.push(measurement);
        }
        measurements
    }

    /// Apply the policy to measurements in arrival order
    pub fn select(&self, mut measurements: Vec<Measurement>) -> RankedResult {
        match self.limit() {
            Some(limit) => {
                measurements.sort_by_key(|m| m.average_latency());
                measurements.truncate(limit);
                RankedResult::new(measurements, true)
            }
            None => RankedResult::new(measurements, false),
        }
    }

    /// Drain `receiver` and apply the policy
    pub async fn collect(&self, receiver: &mut mpsc::UnboundedReceiver<Measurement>) -> RankedResult {
        self.select(Self::drain(receiver).await)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_TOP_N)
    }
}
