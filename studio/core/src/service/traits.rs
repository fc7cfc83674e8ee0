//! Generation Service Trait
//!
//! The JobClient only ever talks to the generation service through this
//! trait, so the poll loop can run against the real HTTP service or an
//! in-memory stand-in without changing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::job::{GenerationRequest, JobId, JobSnapshot, JobSummary, SubmitResponse};

/// Remote generation service
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Service name for logs (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Check if the service is reachable and healthy
    async fn health_check(&self) -> bool;

    /// Create a job (`POST /api/podcast`)
    async fn submit(&self, request: &GenerationRequest) -> Result<SubmitResponse, ApiError>;

    /// Read the current state of a job (`GET /api/podcast/{id}`)
    async fn status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError>;

    /// List every job the service knows about, ordered by ID
    async fn list(&self) -> Result<Vec<(JobId, JobSummary)>, ApiError>;

    /// Remove a job and its artifacts
    async fn delete(&self, job_id: &JobId) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: GenerationService + ?Sized> GenerationService for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<SubmitResponse, ApiError> {
        (**self).submit(request).await
    }

    async fn status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError> {
        (**self).status(job_id).await
    }

    async fn list(&self) -> Result<Vec<(JobId, JobSummary)>, ApiError> {
        (**self).list().await
    }

    async fn delete(&self, job_id: &JobId) -> Result<(), ApiError> {
        (**self).delete(job_id).await
    }
}
