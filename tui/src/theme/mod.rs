//! Theme and Colors
//!
//! Fixed UI colors plus the bridge from palette colors to terminal colors.
//! The waveform itself is drawn in whatever color the user picked.

use ratatui::style::Color;

use studio_core::{palette, JobStatus};

// ============================================================================
// UI Colors
// ============================================================================

/// Title and accents
pub const ACCENT: Color = Color::Rgb(139, 92, 246);

/// Topic input text
pub const INPUT_GREEN: Color = Color::Rgb(130, 220, 130);

/// Hints and secondary text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// In-progress stages
pub const WORKING_BLUE: Color = Color::Rgb(100, 180, 255);

/// Convert a palette color to a terminal color
#[must_use]
pub fn terminal_color(color: palette::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Color used for a job status label
#[must_use]
pub fn status_color(status: &JobStatus) -> Color {
    match status {
        JobStatus::Completed => SUCCESS_GREEN,
        JobStatus::Failed => ERROR_RED,
        JobStatus::Queued => DIM_GRAY,
        _ => WORKING_BLUE,
    }
}
