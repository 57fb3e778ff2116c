//! Job domain types

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// What to poll, how often, and for how long.
///
/// `frequency` is in polls per hour, `duration` in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub endpoint: String,
    pub frequency: f64,
    pub duration: f64,
}

/// Reasons a job specification is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("endpoint must be an absolute http(s) URL, got '{0}'")]
    InvalidEndpoint(String),

    #[error("frequency must be a positive number of polls per hour, got {0}")]
    InvalidFrequency(f64),

    #[error("duration must be a non-negative number of hours, got {0}")]
    InvalidDuration(f64),

    #[error("frequency {0} yields a polling interval that cannot be scheduled")]
    UnschedulableInterval(f64),
}

impl JobSpec {
    pub fn new(endpoint: impl Into<String>, frequency: f64, duration: f64) -> Self {
        Self {
            endpoint: endpoint.into(),
            frequency,
            duration,
        }
    }

    /// Checks every field, including that the derived interval is usable.
    ///
    /// The frequency is checked before anything divides by it.
    pub fn validate(&self) -> Result<(), SpecError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(SpecError::InvalidFrequency(self.frequency));
        }

        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SpecError::InvalidDuration(self.duration));
        }

        match url::Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => return Err(SpecError::InvalidEndpoint(self.endpoint.clone())),
        }

        self.interval().map(|_| ())
    }

    /// Time between two polls: `60 / frequency` minutes.
    pub fn interval(&self) -> Result<Duration, SpecError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(SpecError::InvalidFrequency(self.frequency));
        }

        match Duration::try_from_secs_f64(SECONDS_PER_HOUR / self.frequency) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(SpecError::UnschedulableInterval(self.frequency)),
        }
    }

    /// How long the job stays active after registration.
    ///
    /// `None` means the duration is too large to represent and the job
    /// effectively never expires.
    pub fn lifetime(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.duration * SECONDS_PER_HOUR).ok()
    }
}

/// Lifecycle of a scheduled job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Active,
    Expired,
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, JobStatus::Active)
    }
}

/// A live (or finished) polling job derived from a [`JobSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: Uuid,
    pub endpoint: String,
    pub frequency: f64,
    pub duration: f64,
    pub interval_secs: f64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// `None` when the job never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Number of fetch-and-record cycles performed so far
    pub cycles: u64,
}

impl ScheduledJob {
    /// Builds an active job record for a validated spec.
    pub fn new(
        id: Uuid,
        spec: &JobSpec,
        interval: Duration,
        created_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = spec
            .lifetime()
            .and_then(|lifetime| chrono::Duration::from_std(lifetime).ok())
            .and_then(|lifetime| created_at.checked_add_signed(lifetime));

        Self {
            id,
            endpoint: spec.endpoint.clone(),
            frequency: spec.frequency,
            duration: spec.duration,
            interval_secs: interval.as_secs_f64(),
            status: JobStatus::Active,
            created_at,
            expires_at,
            finished_at: None,
            cycles: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(frequency: f64, duration: f64) -> JobSpec {
        JobSpec::new("https://api.chucknorris.io/jokes/random", frequency, duration)
    }

    #[test]
    fn test_interval_is_sixty_minutes_over_frequency() {
        assert_eq!(spec(1.0, 1.0).interval().unwrap(), Duration::from_secs(3600));
        assert_eq!(spec(60.0, 1.0).interval().unwrap(), Duration::from_secs(60));
        assert_eq!(spec(0.5, 1.0).interval().unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_zero_or_negative_frequency_rejected() {
        assert_eq!(spec(0.0, 1.0).validate(), Err(SpecError::InvalidFrequency(0.0)));
        assert_eq!(spec(-3.0, 1.0).validate(), Err(SpecError::InvalidFrequency(-3.0)));
        assert!(spec(f64::NAN, 1.0).validate().is_err());
        assert!(spec(f64::INFINITY, 1.0).validate().is_err());
        assert!(spec(0.0, 1.0).interval().is_err());
    }

    #[test]
    fn test_duration_validation() {
        assert!(spec(1.0, 0.0).validate().is_ok());
        assert_eq!(spec(1.0, -1.0).validate(), Err(SpecError::InvalidDuration(-1.0)));
        assert!(spec(1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(JobSpec::new("http://localhost:8080/ok", 1.0, 1.0).validate().is_ok());
        assert!(JobSpec::new("not a url", 1.0, 1.0).validate().is_err());
        assert!(JobSpec::new("ftp://example.test/file", 1.0, 1.0).validate().is_err());
        assert!(JobSpec::new("", 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_tiny_frequency_is_unschedulable() {
        assert_eq!(
            spec(1e-300, 1.0).validate(),
            Err(SpecError::UnschedulableInterval(1e-300))
        );
    }

    #[test]
    fn test_huge_frequency_is_unschedulable() {
        assert!(spec(1e300, 1.0).validate().is_err());
    }

    #[test]
    fn test_lifetime() {
        assert_eq!(spec(1.0, 0.0).lifetime(), Some(Duration::ZERO));
        assert_eq!(spec(1.0, 2.0).lifetime(), Some(Duration::from_secs(7200)));
        assert_eq!(spec(1.0, 1e300).lifetime(), None);
    }

    #[test]
    fn test_scheduled_job_expiry() {
        let now = Utc::now();
        let s = spec(2.0, 1.5);
        let job = ScheduledJob::new(Uuid::new_v4(), &s, s.interval().unwrap(), now);

        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(job.interval_secs, 1800.0);
        assert_eq!(job.expires_at, Some(now + chrono::Duration::seconds(5400)));
        assert_eq!(job.cycles, 0);
    }

    #[test]
    fn test_unbounded_job_has_no_expiry() {
        let s = spec(1.0, 1e300);
        let job = ScheduledJob::new(Uuid::new_v4(), &s, s.interval().unwrap(), Utc::now());
        assert!(job.expires_at.is_none());
    }

    #[test]
    fn test_status_is_finished() {
        assert!(!JobStatus::Active.is_finished());
        assert!(JobStatus::Expired.is_finished());
        assert!(JobStatus::Cancelled.is_finished());
    }
}
