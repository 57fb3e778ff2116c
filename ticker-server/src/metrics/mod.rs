//! Process counters
//!
//! The single entry point through which poll cycles are counted. Counters
//! live for the life of the process; every increment is also forwarded to a
//! [`MetricsSink`].

pub mod sink;

pub use sink::{HttpSink, LogSink, MetricsSink, SinkError};

use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::warn;

use crate::scheduler::CycleOutcome;

pub const CALLS: &str = "Calls";
pub const ERRORS: &str = "Errors";
pub const FETCH_ERRORS: &str = "FetchErrors";
pub const PERSISTENCE_ERRORS: &str = "PersistenceErrors";

/// Point-in-time copy of the process counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub calls: u64,
    pub errors: u64,
    pub fetch_errors: u64,
    pub status_errors: u64,
    pub persistence_errors: u64,
}

/// Call and error tallies shared by every job
pub struct Metrics {
    namespace: String,
    sink: Arc<dyn MetricsSink>,
    calls: AtomicU64,
    errors: AtomicU64,
    fetch_errors: AtomicU64,
    status_errors: AtomicU64,
    persistence_errors: AtomicU64,
}

impl Metrics {
    pub fn new(namespace: impl Into<String>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            namespace: namespace.into(),
            sink,
            calls: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            fetch_errors: AtomicU64::new(0),
            status_errors: AtomicU64::new(0),
            persistence_errors: AtomicU64::new(0),
        }
    }

    /// Counts one cycle and forwards the matching increments to the sink.
    ///
    /// A recorded non-200 response counts as both a call and an error.
    pub async fn record(&self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Recorded { status } => {
                self.calls.fetch_add(1, Ordering::Relaxed);
                self.emit(CALLS).await;

                if *status != 200 {
                    self.errors.fetch_add(1, Ordering::Relaxed);
                    self.status_errors.fetch_add(1, Ordering::Relaxed);
                    self.emit(ERRORS).await;
                }
            }
            CycleOutcome::FetchFailed(_) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                self.fetch_errors.fetch_add(1, Ordering::Relaxed);
                self.emit(ERRORS).await;
                self.emit(FETCH_ERRORS).await;
            }
            CycleOutcome::PersistFailed(_) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                self.persistence_errors.fetch_add(1, Ordering::Relaxed);
                self.emit(ERRORS).await;
                self.emit(PERSISTENCE_ERRORS).await;
            }
        }
    }

    async fn emit(&self, metric: &str) {
        if let Err(e) = self.sink.increment(&self.namespace, metric, 1.0).await {
            warn!("Failed to emit metric {}: {}", metric, e);
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            status_errors: self.status_errors.load(Ordering::Relaxed),
            persistence_errors: self.persistence_errors.load(Ordering::Relaxed),
        }
    }

    /// Prometheus text exposition of the counters
    pub fn export(&self) -> String {
        let snapshot = self.snapshot();
        let counters = [
            ("ticker_calls_total", "Completed fetches that were stored", snapshot.calls),
            ("ticker_errors_total", "Failed or non-200 poll cycles", snapshot.errors),
            ("ticker_fetch_errors_total", "Fetches that never completed", snapshot.fetch_errors),
            ("ticker_status_errors_total", "Stored responses with a non-200 status", snapshot.status_errors),
            ("ticker_persistence_errors_total", "Responses that could not be stored", snapshot.persistence_errors),
        ];

        let mut output = String::new();
        for (name, help, value) in counters {
            let _ = writeln!(output, "# HELP {} {}", name, help);
            let _ = writeln!(output, "# TYPE {} counter", name);
            let _ = writeln!(output, "{} {}", name, value);
        }
        output
    }
}
