//! Job Client
//!
//! Submits generation requests and drives the status polling loop.
//!
//! # Poll Loop
//!
//! ```text
//! watch(job_id)
//!     │
//!     ▼
//! ┌──────────────┐  response   ┌──────────────┐ terminal ┌──────┐
//! │ query status │────────────▶│   deliver    │─────────▶│ stop │
//! └──────────────┘             └──────┬───────┘          └──────┘
//!     ▲    │ error                    │ not terminal         ▲
//!     │    └──▶ deliver PollFailed ───┼──────────────────────┤
//!     │                               ▼                      │
//!     │                        ┌──────────────┐   cancel     │
//!     └────────────────────────│ wait interval│──────────────┘
//!                              └──────────────┘
//! ```
//!
//! Every suspension point (the query and the wait) is raced against the
//! watch's cancellation token, and the token is checked again before a
//! response is delivered. A response that lands after `cancel()` is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ApiError, PollTransportError, SubmissionError};
use crate::job::{GenerationRequest, JobId, JobSnapshot, JobSummary};
use crate::service::GenerationService;

/// Delay between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll loop settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchOptions {
    /// Delay between a non-terminal response and the next query
    pub poll_interval: Duration,
    /// Give up after this much wall-clock time (`None` = never)
    pub max_duration: Option<Duration>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_duration: None,
        }
    }
}

/// Something the poll loop reports to its observer
#[derive(Debug)]
pub enum JobUpdate {
    /// A status reading from the service
    Snapshot(JobSnapshot),
    /// A status query failed; the loop has stopped
    PollFailed(PollTransportError),
    /// The watch budget ran out before a terminal status; the loop has stopped
    TimedOut {
        /// The job being watched
        job_id: JobId,
        /// How long the watch ran
        elapsed: Duration,
    },
}

impl JobUpdate {
    /// The job this update is about
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        match self {
            Self::Snapshot(snapshot) => &snapshot.job_id,
            Self::PollFailed(err) => &err.job_id,
            Self::TimedOut { job_id, .. } => job_id,
        }
    }

    /// Whether this is the last update the loop will deliver
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Snapshot(snapshot) => snapshot.is_terminal(),
            Self::PollFailed(_) | Self::TimedOut { .. } => true,
        }
    }

    /// View as a snapshot; loop failures become a synthetic `failed` snapshot
    #[must_use]
    pub fn snapshot(&self) -> JobSnapshot {
        match self {
            Self::Snapshot(snapshot) => snapshot.clone(),
            Self::PollFailed(err) => JobSnapshot::failed(err.job_id.clone(), err.to_string()),
            Self::TimedOut { job_id, elapsed } => JobSnapshot::failed(
                job_id.clone(),
                format!("gave up waiting after {}s", elapsed.as_secs()),
            ),
        }
    }
}

// ============================================================================
// Watch Handle
// ============================================================================

/// Handle to a running poll loop
///
/// Dropping the handle cancels the watch.
#[derive(Debug)]
pub struct WatchHandle {
    job_id: JobId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// The job being watched
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Stop the loop: no further queries, no further deliveries
    ///
    /// Idempotent, and harmless after the loop has ended on its own.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() && !self.task.is_finished() {
            debug!(job_id = %self.job_id, "Cancelling watch");
        }
        self.token.cancel();
    }

    /// Whether `cancel` has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the loop has exited (terminal status, error, or cancellation)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Token that cancels this watch, for use from another task
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the loop to exit
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                warn!(job_id = %self.job_id, "Watch observer panicked");
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ============================================================================
// Job Client
// ============================================================================

/// Submits jobs and watches them to completion
pub struct JobClient<S: ?Sized> {
    service: Arc<S>,
    options: WatchOptions,
}

impl<S: ?Sized> Clone for JobClient<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            options: self.options.clone(),
        }
    }
}

impl<S: GenerationService + 'static> JobClient<S> {
    /// Create a client over a service
    pub fn new(service: S) -> Self {
        Self::from_arc(Arc::new(service))
    }
}

impl<S: GenerationService + ?Sized + 'static> JobClient<S> {
    /// Create a client over a shared service
    pub fn from_arc(service: Arc<S>) -> Self {
        Self {
            service,
            options: WatchOptions::default(),
        }
    }

    /// Replace the poll loop settings
    #[must_use]
    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the delay between status queries
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Current poll loop settings
    #[must_use]
    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// The underlying service
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Create a job; one request, no retry
    ///
    /// The caller is expected to have validated the topic (see
    /// [`GenerationRequest::new`]).
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if the request could not be sent or the
    /// service rejected it.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<JobId, SubmissionError> {
        debug!(
            service = self.service.name(),
            topic = request.topic(),
            color = request.waveform_color(),
            "Submitting generation request"
        );

        match self.service.submit(request).await {
            Ok(response) => {
                info!(job_id = %response.job_id, topic = request.topic(), "Generation job accepted");
                Ok(response.job_id)
            }
            Err(e) => {
                warn!(error = %e, "Generation request rejected");
                Err(SubmissionError::from(e))
            }
        }
    }

    /// Start polling `job_id`, delivering every update to `on_update`
    ///
    /// Must be called from within a tokio runtime. Only one watch per job
    /// should be live at a time; cancel the previous handle before watching
    /// again (see [`GenerationSession`](crate::session::GenerationSession)).
    pub fn watch<F>(&self, job_id: JobId, on_update: F) -> WatchHandle
    where
        F: FnMut(JobUpdate) + Send + 'static,
    {
        let token = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.service),
            job_id.clone(),
            self.options.clone(),
            token.clone(),
            on_update,
        ));

        debug!(job_id = %job_id, interval_ms = self.options.poll_interval.as_millis(), "Watch started");
        WatchHandle {
            job_id,
            token,
            task,
        }
    }

    /// One-off status query
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success response.
    pub async fn status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError> {
        self.service.status(job_id).await
    }

    /// List all jobs known to the service
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success response.
    pub async fn list(&self) -> Result<Vec<(JobId, JobSummary)>, ApiError> {
        self.service.list().await
    }

    /// Delete a job and its artifacts
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a non-success response
    /// (404 if the job is unknown).
    pub async fn delete(&self, job_id: &JobId) -> Result<(), ApiError> {
        self.service.delete(job_id).await?;
        info!(job_id = %job_id, "Job deleted");
        Ok(())
    }

    /// Whether the service is reachable
    pub async fn health_check(&self) -> bool {
        self.service.health_check().await
    }
}

async fn poll_loop<S, F>(
    service: Arc<S>,
    job_id: JobId,
    options: WatchOptions,
    token: CancellationToken,
    mut on_update: F,
) where
    S: GenerationService + ?Sized,
    F: FnMut(JobUpdate),
{
    let started = Instant::now();
    let deadline = options.max_duration.map(|budget| started + budget);
    let mut polls: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(job_id = %job_id, polls, "Watch cancelled");
                return;
            }
            () = budget_elapsed(deadline) => {
                on_update(timed_out(&job_id, started));
                return;
            }
            result = service.status(&job_id) => result,
        };
        polls += 1;

        // Cancelled while the response was being read: it is stale
        if token.is_cancelled() {
            debug!(job_id = %job_id, "Discarding response received after cancel");
            return;
        }

        match result {
            Ok(snapshot) => {
                let terminal = snapshot.is_terminal();
                debug!(
                    job_id = %job_id,
                    status = %snapshot.status,
                    progress = snapshot.progress,
                    poll = polls,
                    "Job status"
                );
                if snapshot.is_failed() {
                    warn!(
                        job_id = %job_id,
                        error = snapshot.error.as_deref().unwrap_or("unknown error"),
                        "Job failed"
                    );
                } else if terminal {
                    info!(job_id = %job_id, polls, "Job completed");
                }

                on_update(JobUpdate::Snapshot(snapshot));
                if terminal {
                    return;
                }
            }
            Err(source) => {
                warn!(job_id = %job_id, error = %source, "Status query failed, stopping watch");
                on_update(JobUpdate::PollFailed(PollTransportError { job_id, source }));
                return;
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(job_id = %job_id, polls, "Watch cancelled");
                return;
            }
            () = budget_elapsed(deadline) => {
                on_update(timed_out(&job_id, started));
                return;
            }
            () = tokio::time::sleep(options.poll_interval) => {}
        }
    }
}

/// Resolves at the watch deadline; never, without one
async fn budget_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn timed_out(job_id: &JobId, started: Instant) -> JobUpdate {
    let elapsed = started.elapsed();
    warn!(job_id = %job_id, elapsed_secs = elapsed.as_secs(), "Watch budget exhausted");
    JobUpdate::TimedOut {
        job_id: job_id.clone(),
        elapsed,
    }
}
