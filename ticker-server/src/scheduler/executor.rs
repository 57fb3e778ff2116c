//! Poll executor
//!
//! Drives one job: on every tick it either observes expiry and exits, or
//! performs a single fetch-and-record cycle. A failed cycle never stops the
//! job, and no cycle runs past the job's expiry.

use std::sync::Arc;

use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::repository::{RecordStore, StoreError};
use crate::scheduler::registry::JobRegistry;
use crate::service::fetch::{FetchError, Fetcher};

/// Result of one fetch-and-record cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// The exchange completed and its body was stored
    Recorded { status: u16 },
    /// The target could not be reached or did not answer in time
    FetchFailed(FetchError),
    /// The body was fetched but could not be stored
    PersistFailed(StoreError),
}

/// What a tick did
#[derive(Debug)]
pub enum TickOutcome {
    Expired,
    Cycle(CycleOutcome),
}

/// Collaborators shared by every job
#[derive(Clone)]
pub struct PollServices {
    pub fetcher: Arc<dyn Fetcher>,
    pub store: Arc<dyn RecordStore>,
    pub metrics: Arc<Metrics>,
    pub store_timeout: Duration,
}

/// The recurring unit of work for a single job
pub struct PollExecutor {
    job_id: Uuid,
    endpoint: String,
    /// `None` means the job never expires
    expiry: Option<Instant>,
    services: PollServices,
}

impl PollExecutor {
    pub fn new(
        job_id: Uuid,
        endpoint: impl Into<String>,
        expiry: Option<Instant>,
        services: PollServices,
    ) -> Self {
        Self {
            job_id,
            endpoint: endpoint.into(),
            expiry,
            services,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    /// Handles one timer tick observed at `now`.
    ///
    /// A cycle still in flight when the job expires is dropped uncounted.
    pub async fn tick(&self, now: Instant) -> TickOutcome {
        if self.is_expired(now) {
            return TickOutcome::Expired;
        }

        let outcome = match self.expiry {
            Some(expiry) => match time::timeout_at(expiry, self.run_cycle()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    debug!("Job {} expired with a cycle in flight", self.job_id);
                    return TickOutcome::Expired;
                }
            },
            None => self.run_cycle().await,
        };
        self.services.metrics.record(&outcome).await;
        TickOutcome::Cycle(outcome)
    }

    /// One GET, then one insert of whatever body came back
    async fn run_cycle(&self) -> CycleOutcome {
        let response = match self.services.fetcher.fetch(&self.endpoint).await {
            Ok(response) => response,
            Err(e) => return CycleOutcome::FetchFailed(e),
        };

        let store_timeout = self.services.store_timeout;
        let insert = self.services.store.insert(self.job_id, &response.body);

        match time::timeout(store_timeout, insert).await {
            Ok(Ok(())) => CycleOutcome::Recorded {
                status: response.status,
            },
            Ok(Err(e)) => CycleOutcome::PersistFailed(e),
            Err(_) => CycleOutcome::PersistFailed(StoreError::Timeout(store_timeout)),
        }
    }

    /// Runs the job until it expires or `cancel` fires.
    ///
    /// The first tick fires immediately, then every `period`. Ticks missed
    /// while a slow cycle runs are skipped rather than burst. Cancellation is
    /// only observed between cycles.
    pub async fn run(
        self,
        period: Duration,
        registry: Arc<JobRegistry>,
        cancel: CancellationToken,
    ) {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Job {} cancelled, exiting", self.job_id);
                    return;
                }
                _ = ticker.tick() => {}
            }

            if !registry.is_active(self.job_id) {
                debug!("Job {} is no longer active, exiting", self.job_id);
                return;
            }

            match self.tick(Instant::now()).await {
                TickOutcome::Expired => {
                    if registry.mark_expired(self.job_id) {
                        info!("Job {} expired, polling stopped", self.job_id);
                    }
                    return;
                }
                TickOutcome::Cycle(outcome) => {
                    self.log_outcome(&outcome);
                    registry.record_cycle(self.job_id);
                }
            }
        }
    }

    fn log_outcome(&self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Recorded { status: 200 } => {
                debug!("Job {} polled {} (200)", self.job_id, self.endpoint);
            }
            CycleOutcome::Recorded { status } => {
                warn!(
                    "Job {} polled {} with non-success status {}",
                    self.job_id, self.endpoint, status
                );
            }
            CycleOutcome::FetchFailed(e) => {
                warn!("Job {} upstream fetch failed: {}", self.job_id, e);
            }
            CycleOutcome::PersistFailed(e) => {
                error!("Job {} storage write failed: {}", self.job_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::CounterSnapshot;
    use crate::service::fetch::HttpFetcher;
    use crate::testing::{MemoryRecordStore, RecordingSink, StubFetcher};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn services(fetcher: Arc<dyn Fetcher>, store: Arc<MemoryRecordStore>) -> PollServices {
        PollServices {
            fetcher,
            store,
            metrics: Arc::new(Metrics::new("MyApp", Arc::new(RecordingSink::default()))),
            store_timeout: Duration::from_secs(5),
        }
    }

    fn http_fetcher() -> Arc<dyn Fetcher> {
        Arc::new(HttpFetcher::new(Duration::from_secs(5)).unwrap())
    }

    async fn upstream(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    fn active_executor(endpoint: String, services: PollServices) -> PollExecutor {
        PollExecutor::new(
            Uuid::new_v4(),
            endpoint,
            Some(Instant::now() + Duration::from_secs(3600)),
            services,
        )
    }

    #[tokio::test]
    async fn test_ok_response_is_stored_and_counted() {
        let server = upstream(200, "chuck").await;
        let store = Arc::new(MemoryRecordStore::default());
        let services = services(http_fetcher(), store.clone());
        let metrics = services.metrics.clone();
        let executor = active_executor(format!("{}/ok", server.uri()), services);

        let outcome = executor.tick(Instant::now()).await;

        assert!(matches!(
            outcome,
            TickOutcome::Cycle(CycleOutcome::Recorded { status: 200 })
        ));
        assert_eq!(store.bodies(), vec!["chuck"]);
        assert_eq!(
            metrics.snapshot(),
            CounterSnapshot {
                calls: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_not_found_counts_call_and_error() {
        let server = upstream(404, "nope").await;
        let store = Arc::new(MemoryRecordStore::default());
        let services = services(http_fetcher(), store.clone());
        let metrics = services.metrics.clone();
        let executor = active_executor(server.uri(), services);

        executor.tick(Instant::now()).await;

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls, 1);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(store.bodies(), vec!["nope"]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_writes_nothing() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = Arc::new(MemoryRecordStore::default());
        let services = services(http_fetcher(), store.clone());
        let metrics = services.metrics.clone();
        let executor = active_executor(format!("http://{}/", addr), services);

        let outcome = executor.tick(Instant::now()).await;

        assert!(matches!(
            outcome,
            TickOutcome::Cycle(CycleOutcome::FetchFailed(_))
        ));
        assert!(store.bodies().is_empty());
        assert_eq!(metrics.snapshot().calls, 0);
        assert_eq!(metrics.snapshot().errors, 1);
        assert_eq!(metrics.snapshot().fetch_errors, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_separately() {
        let store = Arc::new(MemoryRecordStore::failing());
        let services = services(Arc::new(StubFetcher::status(200)), store.clone());
        let metrics = services.metrics.clone();
        let executor = active_executor("http://example.test/ok".to_string(), services);

        let outcome = executor.tick(Instant::now()).await;

        assert!(matches!(
            outcome,
            TickOutcome::Cycle(CycleOutcome::PersistFailed(StoreError::Database(_)))
        ));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls, 0);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.persistence_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_storage_times_out() {
        let store = Arc::new(MemoryRecordStore::stalled());
        let services = services(Arc::new(StubFetcher::status(200)), store);
        let metrics = services.metrics.clone();
        let executor = active_executor("http://example.test/ok".to_string(), services);

        let outcome = executor.tick(Instant::now()).await;

        assert!(matches!(
            outcome,
            TickOutcome::Cycle(CycleOutcome::PersistFailed(StoreError::Timeout(_)))
        ));
        assert_eq!(metrics.snapshot().persistence_errors, 1);
    }

    #[tokio::test]
    async fn test_expired_tick_does_not_fetch() {
        let fetcher = Arc::new(StubFetcher::status(200));
        let store = Arc::new(MemoryRecordStore::default());
        let services = services(fetcher.clone(), store.clone());
        let now = Instant::now();
        let executor = PollExecutor::new(Uuid::new_v4(), "http://example.test", Some(now), services);

        assert!(matches!(executor.tick(now).await, TickOutcome::Expired));
        assert_eq!(fetcher.calls(), 0);
        assert!(store.bodies().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_cut_short_at_expiry() {
        let fetcher = Arc::new(StubFetcher::slow(200, Duration::from_secs(30)));
        let store = Arc::new(MemoryRecordStore::default());
        let services = services(fetcher.clone(), store.clone());
        let metrics = services.metrics.clone();
        let start = Instant::now();
        let executor = PollExecutor::new(
            Uuid::new_v4(),
            "http://example.test",
            Some(start + Duration::from_secs(1)),
            services,
        );

        assert!(matches!(executor.tick(start).await, TickOutcome::Expired));
        assert!(Instant::now() < start + Duration::from_secs(2));
        assert_eq!(fetcher.calls(), 1);
        assert!(store.bodies().is_empty());
        assert_eq!(metrics.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_unbounded_job_never_expires() {
        let services = services(
            Arc::new(StubFetcher::status(200)),
            Arc::new(MemoryRecordStore::default()),
        );
        let executor = PollExecutor::new(Uuid::new_v4(), "http://example.test", None, services);
        assert!(!executor.is_expired(Instant::now() + Duration::from_secs(10 * 365 * 24 * 3600)));
    }
}
