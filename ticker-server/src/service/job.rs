//! Job Service
//!
//! Job lifecycle: validating specs, spawning poll tasks, and answering
//! queries and stop requests.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use ticker_core::domain::job::{JobSpec, ScheduledJob, SpecError};
use tokio::time::Instant;
use uuid::Uuid;

use crate::scheduler::{JobRegistry, PollExecutor, PollServices, StopResult};

/// Service error type
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] SpecError),
}

/// Creates and tracks polling jobs
pub struct JobController {
    registry: Arc<JobRegistry>,
    services: PollServices,
    max_active_jobs: usize,
}

impl JobController {
    pub fn new(services: PollServices, max_active_jobs: usize) -> Self {
        Self {
            registry: Arc::new(JobRegistry::new()),
            services,
            max_active_jobs,
        }
    }

    /// Keeps at most `retain_finished` expired or cancelled jobs queryable
    pub fn with_retention(mut self, retain_finished: usize) -> Self {
        self.registry = Arc::new(JobRegistry::with_retention(retain_finished));
        self
    }

    /// Validates `spec` and starts polling it.
    ///
    /// Returns once the task is spawned; no network or storage I/O happens
    /// on this path. Every call creates an independent job.
    pub fn start_job(&self, spec: JobSpec) -> Result<ScheduledJob, JobError> {
        spec.validate()?;
        let interval = spec.interval()?;

        let id = Uuid::new_v4();
        let expiry = spec
            .lifetime()
            .and_then(|lifetime| Instant::now().checked_add(lifetime));
        let job = ScheduledJob::new(id, &spec, interval, Utc::now());

        let Some(cancel) = self
            .registry
            .insert_if_capacity(job.clone(), self.max_active_jobs)
        else {
            return Err(JobError::Conflict(format!(
                "Already running the maximum of {} active jobs",
                self.max_active_jobs
            )));
        };

        let executor = PollExecutor::new(id, spec.endpoint, expiry, self.services.clone());
        tokio::spawn(executor.run(interval, Arc::clone(&self.registry), cancel));

        tracing::info!(
            "Job {} started: polling {} every {:?} for {} hour(s)",
            id,
            job.endpoint,
            interval,
            job.duration
        );

        Ok(job)
    }

    pub fn get_job(&self, id: Uuid) -> Result<ScheduledJob, JobError> {
        self.registry.get(id).ok_or(JobError::NotFound(id))
    }

    pub fn list_jobs(&self) -> Vec<ScheduledJob> {
        self.registry.list()
    }

    /// Cancels an active job before its natural expiry
    pub fn stop_job(&self, id: Uuid) -> Result<ScheduledJob, JobError> {
        match self.registry.stop(id) {
            StopResult::Stopped(job) => {
                tracing::info!("Job {} cancelled", id);
                Ok(job)
            }
            StopResult::AlreadyFinished(job) => Err(JobError::Conflict(format!(
                "Job {} already finished ({:?})",
                id, job.status
            ))),
            StopResult::NotFound => Err(JobError::NotFound(id)),
        }
    }

    /// Cancels every active job; used on shutdown
    pub fn shutdown(&self) {
        let stopped = self.registry.stop_all();
        tracing::info!("Cancelled {} active job(s)", stopped);
    }
}
