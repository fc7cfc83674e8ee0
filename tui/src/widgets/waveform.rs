//! Waveform Widget
//!
//! Draws the renderer's bar heights as vertical columns growing up from the
//! bottom edge, with eighth-block glyphs for the partial top cell. Columns
//! are sampled from the bars, so any width works.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

/// Partial cells, one to seven eighths tall
const EIGHTHS: [&str; 7] = [
    "\u{2581}", "\u{2582}", "\u{2583}", "\u{2584}", "\u{2585}", "\u{2586}", "\u{2587}",
];

const FULL: &str = "\u{2588}";

/// Renders bar heights in `[0, 1]`
pub struct WaveformView<'a> {
    bars: &'a [f32],
    color: Color,
}

impl<'a> WaveformView<'a> {
    /// Create a view over `bars`
    pub fn new(bars: &'a [f32], color: Color) -> Self {
        Self { bars, color }
    }
}

impl Widget for WaveformView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.bars.is_empty() || area.is_empty() {
            return;
        }

        let columns = usize::from(area.width);
        let rows = u32::from(area.height);

        for col in 0..area.width {
            let bar = usize::from(col) * self.bars.len() / columns;
            let height = self.bars[bar].clamp(0.0, 1.0);
            // At most area.height * 8, which fits easily
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let mut eighths = (height * (rows * 8) as f32).round() as u32;

            let x = area.x + col;
            for row in (0..area.height).rev() {
                if eighths == 0 {
                    break;
                }
                let symbol = if eighths >= 8 {
                    FULL
                } else {
                    EIGHTHS[(eighths - 1) as usize]
                };
                buf[(x, area.y + row)].set_symbol(symbol).set_fg(self.color);
                eighths = eighths.saturating_sub(8);
            }
        }
    }
}
