//! Batch job polling
//!
//! Submitting a translation in batch mode yields a `job_id`; the job is then
//! driven to a terminal state by repeatedly asking the service for its status.
//! The server decides both the status and how long to wait before asking
//! again. The only local bound is the attempt budget.

use crate::api::{ApiError, FluentCApi};
use crate::config::PollConfig;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

const LOG_TARGET: &str = "fluentc::poll";

/// Status of a batch job as reported by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Complete,
    Failed,
    /// Anything that is not terminal, including a missing status.
    Pending,
}

impl JobStatus {
    pub fn of(response: &Value) -> Self {
        match response.get("status").and_then(Value::as_str) {
            Some("complete") => JobStatus::Complete,
            Some("failed") => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PollError {
    #[error("Batch translation failed for job_id {job_id}: {error}")]
    Failed { job_id: String, error: String },

    #[error("Batch translation timed out for job_id {job_id} after {attempts} attempts. Last response: {last_response}")]
    Timeout {
        job_id: String,
        attempts: u32,
        last_response: Value,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct BatchPoller<'a, A: ?Sized> {
    api: &'a A,
    config: PollConfig,
}

impl<'a, A> BatchPoller<'a, A>
where
    A: FluentCApi + ?Sized,
{
    pub fn new(api: &'a A, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Polls `job_id` until the service reports `complete` or `failed`, or the
    /// attempt budget runs out.
    ///
    /// Returns the `complete` payload untouched. Transport errors are not
    /// retried.
    pub async fn wait_for(&self, job_id: &str) -> Result<Value, PollError> {
        let max_attempts = self.config.max_attempts;
        let mut last_response = Value::Null;

        for attempt in 1..=max_attempts {
            let response = self.api.job_results(job_id.to_owned()).await?;
            debug!(target: LOG_TARGET, job_id, attempt, max_attempts, "polled batch job");

            match JobStatus::of(&response) {
                JobStatus::Complete => {
                    debug!(target: LOG_TARGET, job_id, attempt, "batch job complete");
                    return Ok(response);
                }
                JobStatus::Failed => {
                    let error = response
                        .get("error")
                        .map(|e| match e {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_else(|| "unknown error".to_string());
                    warn!(target: LOG_TARGET, job_id, %error, "batch job failed");
                    return Err(PollError::Failed {
                        job_id: job_id.to_owned(),
                        error,
                    });
                }
                JobStatus::Pending => {
                    if attempt < max_attempts {
                        let hint = response
                            .get("estimated_wait_seconds")
                            .and_then(Value::as_f64);
                        let wait = self.config.wait_for(hint);
                        debug!(target: LOG_TARGET, job_id, ?wait, "batch job pending, waiting");
                        sleep(wait).await;
                    }
                    last_response = response;
                }
            }
        }

        warn!(target: LOG_TARGET, job_id, max_attempts, "batch job timed out");
        Err(PollError::Timeout {
            job_id: job_id.to_owned(),
            attempts: max_attempts,
            last_response,
        })
    }
}
