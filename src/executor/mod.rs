//! Probe dispatcher
//!
//! One tokio task is spawned per candidate, with no cap on how many run at
//! once. Every task holds a clone of the sending half of an unbounded channel
//! and sends at most one [`Measurement`]. The channel closes when the last task
//! drops its sender, which is the signal the selector's drain loop waits for.

use crate::{
    dns::QueryTransport,
    error::{AppError, Result},
    logging::ProbeLogger,
    models::{Candidate, Config, Measurement, RankedResult},
    probe::Prober,
    selector::Selector,
};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use futures::future::join_all;
use tokio::{sync::mpsc, task::JoinHandle};

/// Counters for one probing round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Candidates probed, duplicates included
    pub candidates: usize,
    /// Measurements sent to the selector
    pub qualified: usize,
    /// Tasks that ended without reporting (panics)
    pub failed_tasks: usize,
    /// Wall-clock time from spawn to the last task joining
    pub duration: Duration,
}

impl DispatchSummary {
    /// Candidates that were probed but did not qualify
    pub fn disqualified(&self) -> usize {
        self.candidates
            .saturating_sub(self.qualified)
            .saturating_sub(self.failed_tasks)
    }
}

/// Launches one probe per candidate and forwards qualifying results
pub struct Dispatcher {
    prober: Arc<Prober>,
    threshold: Duration,
    logger: Option<Arc<ProbeLogger>>,
}

impl Dispatcher {
    pub fn new(prober: Prober, threshold: Duration) -> Self {
        Self {
            prober: Arc::new(prober),
            threshold,
            logger: None,
        }
    }

    /// Build a dispatcher from the application configuration
    pub fn from_config(config: &Config, transport: Arc<dyn QueryTransport>) -> Self {
        Self::new(Prober::new(config.probe_config(), transport), config.threshold())
    }

    /// Log every probe outcome through `logger`
    pub fn with_logger(mut self, logger: Arc<ProbeLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Spawn the probes. Must be called from within a tokio runtime.
    pub fn dispatch(&self, candidates: Vec<Candidate>) -> Dispatch {
        let started = Instant::now();
        let (sender, receiver) = mpsc::unbounded_channel();
        let qualified = Arc::new(AtomicUsize::new(0));
        let candidate_count = candidates.len();

        let handles = candidates
            .into_iter()
            .map(|candidate| {
                let prober = self.prober.clone();
                let logger = self.logger.clone();
                let sender = sender.clone();
                let qualified = qualified.clone();
                let threshold = self.threshold;

                tokio::spawn(async move {
                    let report = prober.run(&candidate).await;
                    if let Some(logger) = &logger {
                        logger.log_probe_report(&candidate, &report).await;
                    }

                    // Disqualified probes never qualify, even with a ceiling below the threshold
                    if !report.is_completed() {
                        return;
                    }

                    let average = report.latency(prober.ceiling());
                    if average >= threshold {
                        if let Some(logger) = &logger {
                            logger
                                .log_rejected(&candidate, average.as_secs_f64() * 1000.0, threshold.as_millis() as u64)
                                .await;
                        }
                        return;
                    }

                    let measurement = Measurement::new(candidate.address(), average);
                    if let Some(logger) = &logger {
                        logger.log_measurement(&measurement).await;
                    }
                    qualified.fetch_add(1, Ordering::Relaxed);
                    // The receiver only goes away if the caller gave up on the round
                    let _ = sender.send(measurement);
                })
            })
            .collect();

        Dispatch {
            receiver,
            handles,
            qualified,
            candidates: candidate_count,
            started,
            logger: self.logger.clone(),
        }
    }

    /// Probe every candidate, drain the results and apply `selector`
    pub async fn run_round(
        &self,
        candidates: Vec<Candidate>,
        selector: &Selector,
    ) -> Result<(RankedResult, DispatchSummary)> {
        let mut dispatch = self.dispatch(candidates);
        let result = selector.collect(dispatch.receiver()).await;
        let summary = dispatch.finish().await;

        if summary.failed_tasks > 0 && summary.failed_tasks == summary.candidates {
            return Err(AppError::internal(format!(
                "All {} probe tasks failed",
                summary.failed_tasks
            )));
        }

        Ok((result, summary))
    }
}

/// A round in flight
pub struct Dispatch {
    receiver: mpsc::UnboundedReceiver<Measurement>,
    handles: Vec<JoinHandle<()>>,
    qualified: Arc<AtomicUsize>,
    candidates: usize,
    started: Instant,
    logger: Option<Arc<ProbeLogger>>,
}

impl Dispatch {
    /// The stream of qualifying measurements; ends once every probe finished
    pub fn receiver(&mut self) -> &mut mpsc::UnboundedReceiver<Measurement> {
        &mut self.receiver
    }

    pub fn candidates(&self) -> usize {
        self.candidates
    }

    /// Wait for every probe task and summarise the round
    pub async fn finish(self) -> DispatchSummary {
        let Dispatch { receiver, handles, qualified, candidates, started, logger } = self;
        drop(receiver);

        let mut failed_tasks = 0;
        for joined in join_all(handles).await {
            if let Err(e) = joined {
                failed_tasks += 1;
                if let Some(logger) = &logger {
                    logger.log_task_failure(&AppError::internal(e.to_string())).await;
                }
            }
        }

        let summary = DispatchSummary {
            candidates,
            qualified: qualified.load(Ordering::Relaxed),
            failed_tasks,
            duration: started.elapsed(),
        };

        if let Some(logger) = &logger {
            logger.log_dispatch_summary(&summary).await;
        }

        summary
    }
}
