//! Job DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::JobSpec;

/// Body of `POST /start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJob {
    pub endpoint: String,
    pub frequency: f64,
    pub duration: f64,
}

impl From<StartJob> for JobSpec {
    fn from(req: StartJob) -> Self {
        JobSpec {
            endpoint: req.endpoint,
            frequency: req.frequency,
            duration: req.duration,
        }
    }
}

/// Acknowledgement returned when a job starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobResponse {
    pub message: String,
    pub job_id: Uuid,
}

impl StartJobResponse {
    pub fn running(job_id: Uuid) -> Self {
        Self {
            message: "Running!".to_string(),
            job_id,
        }
    }
}

/// Informational `{ "message": ... }` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
