//! Display State Types
//!
//! What the TUI knows about the current generation, derived from
//! `JobUpdate`s and used for rendering.
//!
//! The TUI is a thin client: it never decides whether a job is done. It
//! records what the poll loop reported and answers a few questions the
//! frame loop asks (may the user submit? should the waveform animate?).

use studio_core::job;
use studio_core::{JobId, JobSnapshot, JobStatus, JobUpdate, SubmissionError};

/// Where the current generation stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted yet
    Idle,
    /// Waiting for the service to accept the request
    Submitting,
    /// Job accepted, poll loop running
    Watching,
    /// Job finished with a result
    Completed,
    /// Submission, job, or polling failed
    Failed,
}

/// The job being shown
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayJob {
    /// Service-assigned ID
    pub job_id: JobId,
    /// Topic as submitted
    pub topic: String,
    /// Last reported status
    pub status: JobStatus,
    /// Last reported progress, as received
    pub progress: f64,
    /// Server-relative audio path
    pub audio_url: Option<String>,
    /// Server-relative video path
    pub video_url: Option<String>,
}

impl DisplayJob {
    fn new(job_id: JobId, topic: String) -> Self {
        Self {
            job_id,
            topic,
            status: JobStatus::Queued,
            progress: 0.0,
            audio_url: None,
            video_url: None,
        }
    }

    fn apply(&mut self, snapshot: JobSnapshot) {
        self.status = snapshot.status;
        self.progress = snapshot.progress;
        if snapshot.audio_url.is_some() {
            self.audio_url = snapshot.audio_url;
        }
        if snapshot.video_url.is_some() {
            self.video_url = snapshot.video_url;
        }
    }

    /// Whether there is something to play
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.audio_url.is_some() || self.video_url.is_some()
    }

    /// Progress as a whole percentage for the gauge
    #[must_use]
    pub fn progress_percent(&self) -> u16 {
        u16::from(job::progress_percent(self.progress))
    }
}

/// Notification level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Something went wrong
    Error,
}

/// A one-line notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Current phase
    pub phase: Phase,
    /// The job being shown (if any)
    pub job: Option<DisplayJob>,
    /// Whether the user is "playing" a completed result
    pub result_playing: bool,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            job: None,
            result_playing: false,
            notification: None,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A submission is on its way; previous results are cleared
    pub fn begin_submission(&mut self) {
        self.phase = Phase::Submitting;
        self.job = None;
        self.result_playing = false;
        self.notification = None;
    }

    /// The service accepted the job
    pub fn submitted(&mut self, job_id: JobId, topic: String) {
        self.notification = Some(DisplayNotification {
            level: NotifyLevel::Info,
            message: format!("Job {job_id} accepted"),
        });
        self.job = Some(DisplayJob::new(job_id, topic));
        self.phase = Phase::Watching;
    }

    /// The service did not accept the job
    pub fn submission_failed(&mut self, error: &SubmissionError) {
        self.phase = Phase::Failed;
        self.notify_error(format!("Submission failed: {}", error.cause()));
    }

    /// Show an error without changing the phase
    pub fn notify_error(&mut self, message: String) {
        self.notification = Some(DisplayNotification {
            level: NotifyLevel::Error,
            message,
        });
    }

    /// Apply a poll loop update; returns false if it was for another job
    pub fn apply_update(&mut self, update: JobUpdate) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        if update.job_id() != &job.job_id {
            return false;
        }

        match update {
            JobUpdate::Snapshot(snapshot) => {
                let error = snapshot.error.clone();
                job.apply(snapshot);
                match job.status.clone() {
                    JobStatus::Completed => {
                        self.phase = Phase::Completed;
                        self.notification = Some(DisplayNotification {
                            level: NotifyLevel::Info,
                            message: "Podcast ready. Press Ctrl-P to play".to_string(),
                        });
                    }
                    JobStatus::Failed => {
                        self.phase = Phase::Failed;
                        self.notify_error(format!(
                            "Generation failed: {}",
                            error.as_deref().unwrap_or("no reason given")
                        ));
                    }
                    _ => {}
                }
            }
            other => {
                let message = other.snapshot().error.unwrap_or_default();
                self.phase = Phase::Failed;
                self.notify_error(message);
            }
        }
        true
    }

    /// Start or stop playing a completed result; returns the new state
    pub fn toggle_playback(&mut self) -> bool {
        let playable = self.phase == Phase::Completed
            && self.job.as_ref().is_some_and(DisplayJob::has_result);
        self.result_playing = playable && !self.result_playing;
        self.result_playing
    }

    /// Whether a new submission is allowed
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase != Phase::Submitting
    }

    /// Whether the waveform should animate
    #[must_use]
    pub fn waveform_playing(&self) -> bool {
        matches!(self.phase, Phase::Submitting | Phase::Watching) || self.result_playing
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}
