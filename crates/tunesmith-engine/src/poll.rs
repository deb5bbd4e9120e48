use crate::api::{ApiError, GenerationClient};
use crate::cli::OutputHandlers;
use crate::session::Session;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use tunesmith_common::protocol::{JobId, JobStatus};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Stop after this many status checks. Unbounded when `None`.
    pub max_polls: Option<u32>,
    /// Stop once another wait would pass this much wall-clock time.
    /// Unbounded when `None`.
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    Failed,
    /// A configured limit ran out while the job was still pending.
    Exhausted { polls: u32, last: JobStatus },
}

/// Poll the status endpoint until the job reaches a terminal status.
///
/// An HTTP error ends polling at once, before any further wait.
pub async fn poll_job(
    client: &GenerationClient,
    session: &Session,
    job: &JobId,
    settings: &PollSettings,
    output: OutputHandlers,
) -> Result<PollOutcome, ApiError> {
    (output.out)("Checking song generation status...");
    let started = Instant::now();
    let mut polls: u32 = 0;

    loop {
        let status = match client.status(session, job).await {
            Ok(status) => status,
            Err(e) => {
                (output.err)(&format!("Error checking song status: {}", e.response_text()));
                return Err(e);
            }
        };
        polls += 1;
        (output.out)(&format!("Song status: {}", status));

        match &status {
            JobStatus::Completed => {
                (output.out)("Song generation completed!");
                info!("Job {} completed after {} polls", job, polls);
                return Ok(PollOutcome::Completed);
            }
            JobStatus::Failed => {
                (output.out)("Song generation failed.");
                info!("Job {} failed after {} polls", job, polls);
                return Ok(PollOutcome::Failed);
            }
            JobStatus::Pending(Some(raw)) => debug!("Job {} still pending ({})", job, raw),
            JobStatus::Pending(None) => debug!("Job {} returned no status; still waiting", job),
        }

        if let Some(max) = settings.max_polls {
            if polls >= max {
                (output.err)(&format!("Giving up on job {} after {} polls.", job, polls));
                return Ok(PollOutcome::Exhausted {
                    polls,
                    last: status,
                });
            }
        }
        if let Some(timeout) = settings.timeout {
            if started.elapsed() + settings.interval > timeout {
                (output.err)(&format!(
                    "Giving up on job {} after {:?} without a terminal status.",
                    job, timeout
                ));
                return Ok(PollOutcome::Exhausted {
                    polls,
                    last: status,
                });
            }
        }

        tokio::time::sleep(settings.interval).await;
    }
}
