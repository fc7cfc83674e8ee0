//! Waveform Renderer
//!
//! Decorative amplitude bars shown while a job is in flight or a result is
//! playing. There is no audio analysis here: each tick redraws every bar
//! from a uniform pseudo-random draw, and stopping snaps every bar back to
//! a flat idle height.
//!
//! The renderer is driven by the caller's frame loop through
//! [`WaveformRenderer::update`], the same way sprite animations advance on
//! frame deltas. It knows nothing about jobs; the shell decides when it plays.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::palette::{self, Color, Preset};

/// Number of bars
pub const BAR_COUNT: usize = 64;

/// Bar height while not playing (fraction of max amplitude)
pub const IDLE_HEIGHT: f32 = 0.2;

/// Redraw period while playing
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Copy of the visual state at one instant
#[derive(Clone, Debug, PartialEq)]
pub struct VisualizerState {
    /// Bar heights in `[0, 1]`, left to right
    pub bars: [f32; BAR_COUNT],
    /// Whether the bars are animating
    pub playing: bool,
}

/// Drives the bar heights
#[derive(Clone, Debug)]
pub struct WaveformRenderer {
    bars: [f32; BAR_COUNT],
    playing: bool,
    color: Color,
    tick_interval: Duration,
    /// Time accumulated towards the next tick
    elapsed: Duration,
    rng: StdRng,
}

impl WaveformRenderer {
    /// Create an idle renderer seeded from the OS
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an idle renderer with a fixed seed
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            bars: [IDLE_HEIGHT; BAR_COUNT],
            playing: false,
            color: Preset::default().color(),
            tick_interval: TICK_INTERVAL,
            elapsed: Duration::ZERO,
            rng,
        }
    }

    /// Use a different redraw period; zero is bumped to 1ms
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Start or stop the animation
    ///
    /// Stopping resets every bar to [`IDLE_HEIGHT`] immediately. Starting
    /// leaves the bars alone until the first tick elapses.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }

        self.playing = playing;
        self.elapsed = Duration::ZERO;
        if !playing {
            self.bars = [IDLE_HEIGHT; BAR_COUNT];
        }
        tracing::trace!(playing, "Waveform playback toggled");
    }

    /// Whether the bars are animating
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Advance by a frame delta; returns true if the bars were redrawn
    ///
    /// Several elapsed ticks collapse into one redraw, since each redraw is
    /// independent of the previous one anyway.
    pub fn update(&mut self, delta: Duration) -> bool {
        if !self.playing {
            return false;
        }

        self.elapsed += delta;
        if self.elapsed < self.tick_interval {
            return false;
        }

        let remainder = self.elapsed.as_nanos() % self.tick_interval.as_nanos();
        // remainder < tick_interval, which itself came from a Duration
        self.elapsed = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
        self.tick();
        true
    }

    /// Redraw every bar now (no-op while stopped)
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        for bar in &mut self.bars {
            *bar = self.rng.gen_range(0.0..=1.0);
        }
    }

    /// Current bar heights
    #[must_use]
    pub fn bars(&self) -> &[f32; BAR_COUNT] {
        &self.bars
    }

    /// Current bar color
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Select a color by preset name; unknown names use the default preset
    pub fn set_color(&mut self, name: &str) {
        self.color = palette::resolve(name);
    }

    /// Select an exact color
    pub fn set_color_value(&mut self, color: Color) {
        self.color = color;
    }

    /// Copy of the current visual state
    #[must_use]
    pub fn state(&self) -> VisualizerState {
        VisualizerState {
            bars: self.bars,
            playing: self.playing,
        }
    }
}

impl Default for WaveformRenderer {
    fn default() -> Self {
        Self::new()
    }
}
