//! Custom Widgets

mod waveform;

pub use waveform::WaveformView;
