//! Job-related API endpoints

use ticker_core::domain::job::ScheduledJob;
use ticker_core::dto::job::{StartJob, StartJobResponse};
use uuid::Uuid;

use crate::TickerClient;
use crate::error::Result;

impl TickerClient {
    /// Start polling a URL
    ///
    /// # Returns
    /// The server's acknowledgement, including the new job's id
    pub async fn start_job(&self, req: &StartJob) -> Result<StartJobResponse> {
        let url = format!("{}/start", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List all jobs, newest first
    pub async fn list_jobs(&self) -> Result<Vec<ScheduledJob>> {
        let url = format!("{}/jobs", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: Uuid) -> Result<ScheduledJob> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.authorize(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Stop a job before it expires
    pub async fn stop_job(&self, job_id: Uuid) -> Result<()> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.authorize(self.client.delete(&url)).send().await?;

        self.handle_empty_response(response).await
    }
}
