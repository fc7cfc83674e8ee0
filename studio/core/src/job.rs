//! Job Types
//!
//! Client-side mirror of a generation job. The service owns job state; the
//! client never edits a snapshot, it only replaces the whole thing with the
//! next one it receives.
//!
//! Status strings on the wire are free-form. The known ones get their own
//! variants; anything else is preserved verbatim in [`JobStatus::Other`].
//! Only `completed` and `failed` end a job.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RequestError;
use crate::palette::{self, Color};

/// Job identifier assigned by the generation service
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a job ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Status of a generation job as reported by the service
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted, not started
    #[default]
    Queued,
    /// Generic in-progress state
    Processing,
    /// Writing the conversation script
    GeneratingScript,
    /// Synthesising speech
    GeneratingAudio,
    /// Rendering the waveform video
    GeneratingVideo,
    /// Finished; result refs are populated
    Completed,
    /// Finished unsuccessfully; `error` explains why
    Failed,
    /// A status string this client does not know
    Other(String),
}

impl JobStatus {
    /// Parse a wire status string; only exact known values are recognised
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "generating_script" => Self::GeneratingScript,
            "generating_audio" => Self::GeneratingAudio,
            "generating_video" => Self::GeneratingVideo,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::GeneratingScript => "generating_script",
            Self::GeneratingAudio => "generating_audio",
            Self::GeneratingVideo => "generating_video",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Queued => "Queued",
            Self::Processing => "Processing",
            Self::GeneratingScript => "Writing script",
            Self::GeneratingAudio => "Generating audio",
            Self::GeneratingVideo => "Rendering video",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Get a status icon (for UI display)
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Queued => "...",
            Self::Processing | Self::Other(_) => ">>>",
            Self::GeneratingScript => "[s]",
            Self::GeneratingAudio => "[a]",
            Self::GeneratingVideo => "[v]",
            Self::Completed => "[+]",
            Self::Failed => "[!]",
        }
    }

    /// Whether the job will not change any more
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// One status reading of a job, as returned by `GET /api/podcast/{id}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// The job this snapshot describes
    pub job_id: JobId,
    /// Current status
    pub status: JobStatus,
    /// Fraction complete, passed through as reported (not clamped, may go backwards)
    #[serde(default)]
    pub progress: f64,
    /// Server-relative path of the generated audio
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Server-relative path of the generated video
    #[serde(default)]
    pub video_url: Option<String>,
    /// Failure message when `status` is failed
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSnapshot {
    /// Synthetic failed snapshot for failures the service never reported
    pub fn failed(job_id: JobId, error: impl Into<String>) -> Self {
        Self {
            job_id,
            status: JobStatus::Failed,
            progress: 0.0,
            audio_url: None,
            video_url: None,
            error: Some(error.into()),
        }
    }

    /// Whether no further snapshots will follow
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the job finished successfully
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Whether the job failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }

    /// Whether any playable or downloadable result is available
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.audio_url.is_some() || self.video_url.is_some()
    }

    /// Status icon and label, e.g. "[a] Generating audio"
    #[must_use]
    pub fn stage_label(&self) -> String {
        format!("{} {}", self.status.icon(), self.status.label())
    }

    /// Progress as a whole percentage, bounded to 0..=100 for display
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.progress)
    }

    /// Unicode progress bar
    #[must_use]
    pub fn progress_bar(&self, width: usize) -> String {
        let filled = (usize::from(self.progress_percent()) * width) / 100;
        let empty = width.saturating_sub(filled);

        format!(
            "{}{}",
            "\u{2588}".repeat(filled), // full block
            "\u{2591}".repeat(empty)   // light shade
        )
    }
}

/// Body of a successful `POST /api/podcast`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Newly assigned job ID
    pub job_id: JobId,
    /// Topic echoed back by the service
    #[serde(default)]
    pub topic: Option<String>,
    /// Initial status (normally queued)
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// One entry of the `GET /api/podcast` listing
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSummary {
    /// Requested topic
    pub topic: String,
    /// Current status
    pub status: JobStatus,
    /// Fraction complete
    pub progress: f64,
    /// Server-relative path of the generated audio
    pub audio_url: Option<String>,
    /// Server-relative path of the generated video
    pub video_url: Option<String>,
    /// Requested waveform color
    pub waveform_color: Option<String>,
    /// Failure message
    pub error: Option<String>,
}

impl JobSummary {
    /// Progress as a whole percentage, bounded to 0..=100 for display
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.progress)
    }
}

/// Bound a reported progress fraction to a whole 0..=100 percentage for display
///
/// NaN shows as 0. The value stored in snapshots is never altered.
#[must_use]
pub fn progress_percent(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    // Bounded above, so the cast cannot truncate
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (progress * 100.0).round().clamp(0.0, 100.0) as u8;
    percent
}

// ============================================================================
// Requests
// ============================================================================

/// Immutable input to a generation job
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    topic: String,
    waveform_color: String,
}

impl GenerationRequest {
    /// Build a request, rejecting an empty topic
    pub fn new(topic: impl Into<String>, color: Color) -> Result<Self, RequestError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(RequestError::EmptyTopic);
        }

        Ok(Self {
            topic,
            waveform_color: color.to_hex(),
        })
    }

    /// Build a request from a preset name (or raw `#RRGGBB`)
    pub fn with_color_name(topic: impl Into<String>, color: &str) -> Result<Self, RequestError> {
        Self::new(topic, palette::resolve_or_hex(color)?)
    }

    /// The topic to generate a podcast about
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waveform color as `#RRGGBB`
    #[must_use]
    pub fn waveform_color(&self) -> &str {
        &self.waveform_color
    }
}
