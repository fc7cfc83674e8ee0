//! HTTP Generation Service
//!
//! reqwest-backed implementation of [`GenerationService`] for the podcast
//! generation API. Every non-success status is surfaced as
//! [`ApiError::Status`] with the response body attached; nothing is retried
//! here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use super::traits::GenerationService;
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::job::{GenerationRequest, JobId, JobSnapshot, JobSummary, SubmitResponse};

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Health checks should answer fast or not at all
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Generation service reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpGenerationService {
    /// Base URL, always ending in `/`
    base_url: Url,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpGenerationService {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base.to_string(),
                source,
            })?;

        Ok(Self {
            base_url: base,
            http_client,
        })
    }

    /// Create from [`ServiceConfig`]
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ApiError> {
        Self::with_timeout(&config.base_url, config.request_timeout)
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a server-relative result reference (e.g. `/videos/x.mp4`)
    pub fn resolve_url(&self, reference: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(reference)
            .map_err(|e| ApiError::InvalidUrl(format!("{reference}: {e}")))
    }

    /// Collection endpoint
    fn jobs_url(&self) -> Result<Url, ApiError> {
        self.resolve_url("api/podcast")
    }

    /// Per-job endpoint; the ID is pushed as a single escaped segment
    fn job_url(&self, job_id: &JobId) -> Result<Url, ApiError> {
        let mut url = self.jobs_url()?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .push(job_id.as_str());
        Ok(url)
    }

    /// Health endpoint
    fn health_url(&self) -> Result<Url, ApiError> {
        self.resolve_url("health")
    }

    /// Download a result artifact into `dest_dir`, returning the written path
    pub async fn download(&self, reference: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        let url = self.resolve_url(reference)?;
        let file_name = url
            .path_segments()
            .and_then(Iterator::last)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::InvalidUrl(reference.to_string()))?
            .to_string();
        let path = dest_dir.join(file_name);

        let response = self.send(self.http_client.get(url.clone()), &url).await?;
        let response = check_status(&url, response).await?;

        let chunks = response.bytes_stream().map(|chunk| {
            chunk.map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })
        });
        let written = save_stream(chunks, &path).await?;

        tracing::info!(path = %path.display(), bytes = written, "Downloaded artifact");
        Ok(path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, ApiError> {
        request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

/// Turn a non-success status into [`ApiError::Status`]
/// Stream chunks into `path` via a `.part` file; nothing is left behind on error
async fn save_stream<St, B>(chunks: St, path: &Path) -> Result<u64, ApiError>
where
    St: Stream<Item = Result<B, ApiError>>,
    B: AsRef<[u8]>,
{
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let result = match write_chunks(chunks, &part).await {
        Ok(written) => tokio::fs::rename(&part, path)
            .await
            .map(|()| written)
            .map_err(|source| ApiError::Io {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) => Err(e),
    };

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&part).await {
            tracing::debug!(path = %part.display(), error = %e, "Could not remove partial download");
        }
    }
    result
}

async fn write_chunks<St, B>(chunks: St, part: &Path) -> Result<u64, ApiError>
where
    St: Stream<Item = Result<B, ApiError>>,
    B: AsRef<[u8]>,
{
    let io_error = |source| ApiError::Io {
        path: part.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::create(part).await.map_err(io_error)?;
    let mut chunks = std::pin::pin!(chunks);
    let mut written: u64 = 0;

    while let Some(chunk) = chunks.next().await {
        let bytes = chunk?;
        file.write_all(bytes.as_ref()).await.map_err(io_error)?;
        written += bytes.as_ref().len() as u64;
    }
    file.flush().await.map_err(io_error)?;
    Ok(written)
}

async fn check_status(url: &Url, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        url: url.to_string(),
        status,
        body,
    })
}

/// Check status, read the body, decode it as JSON
async fn read_json<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T, ApiError> {
    let response = check_status(url, response).await?;
    let body = response.text().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;

    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        let Ok(url) = self.health_url() else {
            return false;
        };

        match self
            .http_client
            .get(url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<SubmitResponse, ApiError> {
        let url = self.jobs_url()?;
        let response = self
            .send(self.http_client.post(url.clone()).json(request), &url)
            .await?;
        read_json(&url, response).await
    }

    async fn status(&self, job_id: &JobId) -> Result<JobSnapshot, ApiError> {
        let url = self.job_url(job_id)?;
        let response = self.send(self.http_client.get(url.clone()), &url).await?;
        read_json(&url, response).await
    }

    async fn list(&self) -> Result<Vec<(JobId, JobSummary)>, ApiError> {
        let url = self.jobs_url()?;
        let response = self.send(self.http_client.get(url.clone()), &url).await?;
        let jobs: std::collections::BTreeMap<JobId, JobSummary> = read_json(&url, response).await?;
        Ok(jobs.into_iter().collect())
    }

    async fn delete(&self, job_id: &JobId) -> Result<(), ApiError> {
        let url = self.job_url(job_id)?;
        let response = self.send(self.http_client.delete(url.clone()), &url).await?;
        check_status(&url, response).await?;
        Ok(())
    }
}
