//! Error Types
//!
//! Failures the core surfaces to its callers. None of these are retried
//! automatically: submission errors go straight back to the caller, poll
//! errors terminate the watch loop.
//!
//! A job that the service reports as `failed` is *not* an error here. It is
//! a normal terminal [`JobStatus::Failed`](crate::job::JobStatus::Failed)
//! snapshot carrying the service's message.

use std::path::PathBuf;

use thiserror::Error;

use crate::job::JobId;

// =============================================================================
// Service Boundary
// =============================================================================

/// Errors talking to the generation service over HTTP
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read)
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The URL that was requested
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("{url} returned {status}: {body}")]
    Status {
        /// The URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("could not decode response from {url}: {reason}")]
    Decode {
        /// The URL that was requested
        url: String,
        /// Decoder message
        reason: String,
    },

    /// A base URL or resource reference could not be turned into a URL
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Writing a downloaded artifact failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status code, if the service answered at all
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service reported the resource as unknown
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

// =============================================================================
// Job Lifecycle
// =============================================================================

/// The generation request could not be created or was rejected
#[derive(Debug, Error)]
#[error("failed to submit generation request: {source}")]
pub struct SubmissionError {
    #[from]
    source: ApiError,
}

impl SubmissionError {
    /// The underlying service error
    #[must_use]
    pub fn cause(&self) -> &ApiError {
        &self.source
    }
}

/// A status query failed; the watch loop for this job has stopped
#[derive(Debug, Error)]
#[error("status query for job {job_id} failed: {source}")]
pub struct PollTransportError {
    /// The job being watched
    pub job_id: JobId,
    /// The underlying service error
    #[source]
    pub source: ApiError,
}

// =============================================================================
// Input Validation
// =============================================================================

/// Invalid input to a [`GenerationRequest`](crate::job::GenerationRequest)
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Topic is empty or whitespace only
    #[error("topic must not be empty")]
    EmptyTopic,

    /// Color is not a `#RRGGBB` hex string
    #[error("invalid color {0:?}, expected hex like #00FF00")]
    InvalidColor(String),
}
