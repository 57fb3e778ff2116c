//! Test doubles for the server's collaborators

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::metrics::{MetricsSink, SinkError};
use crate::repository::{RecordStore, StoreError};
use crate::service::fetch::{FetchError, FetchedResponse, Fetcher};

/// Records every increment it receives
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn increment(&self, namespace: &str, metric: &str, _value: f64) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Rejected {
                status: 500,
                message: "sink down".to_string(),
            });
        }
        self.events
            .lock()
            .unwrap()
            .push((namespace.to_string(), metric.to_string()));
        Ok(())
    }
}

enum StoreMode {
    Ok,
    Fail,
    Stall,
}

/// Keeps inserted bodies in memory
pub struct MemoryRecordStore {
    records: Mutex<Vec<(Uuid, String)>>,
    mode: StoreMode,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            mode: StoreMode::Ok,
        }
    }
}

impl MemoryRecordStore {
    pub fn failing() -> Self {
        Self {
            mode: StoreMode::Fail,
            ..Default::default()
        }
    }

    /// Never completes an insert
    pub fn stalled() -> Self {
        Self {
            mode: StoreMode::Stall,
            ..Default::default()
        }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.records.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, job_id: Uuid, data: &str) -> Result<(), StoreError> {
        match self.mode {
            StoreMode::Ok => {
                self.records.lock().unwrap().push((job_id, data.to_string()));
                Ok(())
            }
            StoreMode::Fail => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
            StoreMode::Stall => std::future::pending().await,
        }
    }
}

/// Answers every fetch the same way without touching the network
pub struct StubFetcher {
    status: Option<u16>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            status: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers with `status` after `delay`
    pub fn slow(status: u16, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::status(status)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.status {
            Some(status) => Ok(FetchedResponse {
                status,
                body: format!("body from {}", url),
            }),
            None => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout: Duration::from_secs(30),
            }),
        }
    }
}
