//! Job registry
//!
//! Maps job ids to their state and cancellation token. The request path and
//! the tick path both go through this map; the lock is never held across an
//! await point.
//!
//! Finished jobs stay queryable until `retain_finished` newer jobs have
//! finished after them, so the map is bounded by the active-job cap plus
//! the retention count.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use ticker_core::domain::job::{JobStatus, ScheduledJob};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Finished jobs kept for queries when no retention is configured
pub const DEFAULT_FINISHED_RETENTION: usize = 100;

struct JobEntry {
    job: ScheduledJob,
    cancel: CancellationToken,
}

#[derive(Default)]
struct RegistryState {
    jobs: HashMap<Uuid, JobEntry>,
    /// Finished job ids, oldest first
    finished: VecDeque<Uuid>,
}

impl RegistryState {
    fn retire(&mut self, id: Uuid, retain: usize) {
        self.finished.push_back(id);
        while self.finished.len() > retain {
            if let Some(evicted) = self.finished.pop_front() {
                self.jobs.remove(&evicted);
            }
        }
    }
}

/// Result of a stop request
#[derive(Debug)]
pub enum StopResult {
    Stopped(ScheduledJob),
    AlreadyFinished(ScheduledJob),
    NotFound,
}

pub struct JobRegistry {
    state: Mutex<RegistryState>,
    retain_finished: usize,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_retention(DEFAULT_FINISHED_RETENTION)
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retain_finished: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            retain_finished,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an active job unless `max_active` jobs are already active.
    ///
    /// Returns the token the job's task must watch for cancellation.
    pub fn insert_if_capacity(
        &self,
        job: ScheduledJob,
        max_active: usize,
    ) -> Option<CancellationToken> {
        let mut state = self.lock();

        let active = state
            .jobs
            .values()
            .filter(|entry| entry.job.status == JobStatus::Active)
            .count();
        if active >= max_active {
            return None;
        }

        let cancel = CancellationToken::new();
        state.jobs.insert(
            job.id,
            JobEntry {
                job,
                cancel: cancel.clone(),
            },
        );
        Some(cancel)
    }

    pub fn get(&self, id: Uuid) -> Option<ScheduledJob> {
        self.lock().jobs.get(&id).map(|entry| entry.job.clone())
    }

    /// All retained jobs, newest first
    pub fn list(&self) -> Vec<ScheduledJob> {
        let mut jobs: Vec<ScheduledJob> = self
            .lock()
            .jobs
            .values()
            .map(|entry| entry.job.clone())
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn is_active(&self, id: Uuid) -> bool {
        self.lock()
            .jobs
            .get(&id)
            .is_some_and(|entry| entry.job.status == JobStatus::Active)
    }

    pub fn record_cycle(&self, id: Uuid) {
        if let Some(entry) = self.lock().jobs.get_mut(&id) {
            entry.job.cycles += 1;
        }
    }

    /// Moves an active job to `Expired`. Returns false if it had already finished.
    pub fn mark_expired(&self, id: Uuid) -> bool {
        let mut state = self.lock();
        let Some(entry) = state.jobs.get_mut(&id) else {
            return false;
        };

        if entry.job.status.is_finished() {
            return false;
        }

        entry.job.status = JobStatus::Expired;
        entry.job.finished_at = Some(Utc::now());
        state.retire(id, self.retain_finished);
        true
    }

    /// Cancels an active job.
    ///
    /// The task leaves at its next wait; a cycle already in flight completes
    /// and is counted.
    pub fn stop(&self, id: Uuid) -> StopResult {
        let mut state = self.lock();

        let Some(entry) = state.jobs.get_mut(&id) else {
            return StopResult::NotFound;
        };

        if entry.job.status.is_finished() {
            return StopResult::AlreadyFinished(entry.job.clone());
        }

        entry.job.status = JobStatus::Cancelled;
        entry.job.finished_at = Some(Utc::now());
        entry.cancel.cancel();
        let job = entry.job.clone();

        state.retire(id, self.retain_finished);
        StopResult::Stopped(job)
    }

    /// Cancels every active job. Returns how many were cancelled.
    pub fn stop_all(&self) -> usize {
        let mut state = self.lock();
        let now = Utc::now();
        let mut stopped = 0;

        for entry in state.jobs.values_mut() {
            if entry.job.status == JobStatus::Active {
                entry.job.status = JobStatus::Cancelled;
                entry.job.finished_at = Some(now);
                entry.cancel.cancel();
                stopped += 1;
            }
        }

        stopped
    }
}
