//! Studio Core - Headless Job Lifecycle Client for podcast-studio
//!
//! This crate holds everything a podcast-studio front end needs that is not
//! drawing: submitting generation requests, polling jobs until they finish,
//! cancelling watches, resolving waveform colors, and driving the decorative
//! waveform bars. It is independent of any UI framework and drives both the
//! CLI and the TUI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Shells                                   │
//! │   ┌──────────────┐                      ┌──────────────────┐     │
//! │   │ studio-cli   │                      │   studio-tui     │     │
//! │   │   (clap)     │                      │   (ratatui)      │     │
//! │   └──────┬───────┘                      └────────┬─────────┘     │
//! │          │   JobUpdate (callback)                │               │
//! └──────────┼───────────────────────────────────────┼───────────────┘
//!            │                                       │
//! ┌──────────┼───────────────────────────────────────┼───────────────┐
//! │          │            STUDIO CORE                │               │
//! │  ┌───────┴──────────────────────┐   ┌────────────┴─────────────┐ │
//! │  │ GenerationSession            │   │ WaveformRenderer         │ │
//! │  │  └─ JobClient ── poll loop   │   │  └─ ColorPalette         │ │
//! │  │      └─ GenerationService    │   └──────────────────────────┘ │
//! │  └──────────────┬───────────────┘                                │
//! └─────────────────┼────────────────────────────────────────────────┘
//!                   │ HTTP
//!          ┌────────┴─────────┐
//!          │ generation API   │
//!          └──────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`JobClient`]: submits requests and spawns poll loops
//! - [`WatchHandle`]: cancels a running poll loop
//! - [`JobUpdate`]: what a poll loop delivers (snapshot, poll failure, timeout)
//! - [`GenerationSession`]: at most one live watch per shell
//! - [`WaveformRenderer`]: 64 bars, redrawn at random every tick while playing
//! - [`palette::resolve`]: color name to RGB, falling back to the default
//!
//! # Quick Start
//!
//! ```ignore
//! use studio_core::{GenerationRequest, HttpGenerationService, JobClient, JobUpdate};
//!
//! let client = JobClient::new(HttpGenerationService::new("http://localhost:8000")?);
//! let request = GenerationRequest::with_color_name("Rust ownership", "cyan")?;
//! let job_id = client.submit(&request).await?;
//!
//! let handle = client.watch(job_id, |update| match update {
//!     JobUpdate::Snapshot(s) => println!("{} {}%", s.status, s.progress_percent()),
//!     other => eprintln!("{}", other.snapshot().error.unwrap_or_default()),
//! });
//! handle.join().await;
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod job;
pub mod palette;
pub mod service;
pub mod session;
pub mod waveform;

// Re-exports for convenience
pub use client::{JobClient, JobUpdate, WatchHandle, WatchOptions, DEFAULT_POLL_INTERVAL};
pub use config::{
    load_config, load_config_from_path, ConfigError, ConfigOverrides, ConfigSource, ServiceConfig,
    StudioConfig,
};
pub use error::{ApiError, PollTransportError, RequestError, SubmissionError};
pub use job::{GenerationRequest, JobId, JobSnapshot, JobStatus, JobSummary, SubmitResponse};
pub use palette::{Color, Preset};
pub use service::{GenerationService, HttpGenerationService};
pub use session::GenerationSession;
pub use waveform::{VisualizerState, WaveformRenderer, BAR_COUNT, IDLE_HEIGHT, TICK_INTERVAL};
