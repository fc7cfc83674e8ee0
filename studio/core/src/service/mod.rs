//! Generation Service Integration
//!
//! Abstracted access to the remote podcast generation service through a
//! common trait interface.
//!
//! # Endpoints
//!
//! - `POST /api/podcast` - create a job
//! - `GET /api/podcast/{id}` - job status
//! - `GET /api/podcast` - list jobs
//! - `DELETE /api/podcast/{id}` - delete a job and its files
//! - `GET /health` - liveness
//!
//! # Usage
//!
//! ```ignore
//! use studio_core::service::{GenerationService, HttpGenerationService};
//!
//! let service = HttpGenerationService::new("http://localhost:8000")?;
//! let snapshot = service.status(&job_id).await?;
//! ```

mod http;
mod traits;

pub use http::HttpGenerationService;
pub use traits::GenerationService;
