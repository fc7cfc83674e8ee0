//! Studio TUI - Terminal interface for podcast-studio
//!
//! A full-screen terminal UI for generating a podcast from a topic and
//! watching it come together, with the waveform bars as live feedback.
//!
//! # Architecture
//!
//! - **App**: frame loop, key handling, layout
//! - **Display**: state derived from poll loop updates
//! - **Widgets**: waveform bar rendering
//! - **Theme**: UI colors and palette bridging
//!
//! All job logic (submission, polling, cancellation) lives in `studio-core`.

pub mod app;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
