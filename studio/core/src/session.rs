//! Generation Session
//!
//! Owns at most one live watch. Starting a new generation cancels the
//! previous watch before anything else happens, so a shell never has two
//! poll loops feeding the same view.

use tracing::debug;

use crate::client::{JobClient, JobUpdate, WatchHandle};
use crate::error::SubmissionError;
use crate::job::{GenerationRequest, JobId};
use crate::service::GenerationService;

/// One shell's view of "the job I'm currently generating"
pub struct GenerationSession<S: ?Sized> {
    client: JobClient<S>,
    active: Option<WatchHandle>,
}

impl<S: GenerationService + ?Sized + 'static> GenerationSession<S> {
    /// Create a session with no active job
    pub fn new(client: JobClient<S>) -> Self {
        Self {
            client,
            active: None,
        }
    }

    /// The client this session submits through
    #[must_use]
    pub fn client(&self) -> &JobClient<S> {
        &self.client
    }

    /// Cancel any current watch, submit `request`, and watch the new job
    ///
    /// If submission fails the previous watch stays cancelled and no new one
    /// is started.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if the service did not accept the job.
    pub async fn start<F>(
        &mut self,
        request: &GenerationRequest,
        on_update: F,
    ) -> Result<JobId, SubmissionError>
    where
        F: FnMut(JobUpdate) + Send + 'static,
    {
        self.cancel();
        let job_id = self.client.submit(request).await?;
        self.active = Some(self.client.watch(job_id.clone(), on_update));
        Ok(job_id)
    }

    /// Cancel any current watch and watch an existing job instead
    pub fn resume<F>(&mut self, job_id: JobId, on_update: F)
    where
        F: FnMut(JobUpdate) + Send + 'static,
    {
        self.cancel();
        self.active = Some(self.client.watch(job_id, on_update));
    }

    /// Stop watching the current job, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            debug!(job_id = %handle.job_id(), "Session dropping watch");
            handle.cancel();
        }
    }

    /// The job currently being watched
    ///
    /// Stays set after the loop ends on its own, until the next
    /// `start`/`resume`/`cancel`.
    #[must_use]
    pub fn active_job(&self) -> Option<&JobId> {
        self.active.as_ref().map(WatchHandle::job_id)
    }

    /// Whether a poll loop is still running
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.active.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the current loop to exit; returns immediately if none
    pub async fn wait(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.join().await;
        }
    }
}
