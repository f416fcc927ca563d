//! Confidence bar widget for inline visualization

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Partial block characters, one to eight eighths of a cell
const EIGHTHS: [char; 8] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Character used for the unfilled part of the bar
const TRACK: char = '░';

/// Color for a confidence score (higher = greener)
pub fn confidence_color(confidence: f64) -> Color {
    if confidence >= 0.8 {
        Color::Green
    } else if confidence >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// A horizontal bar filled in proportion to a confidence in [0, 1]
pub struct ConfidenceBar {
    /// Confidence score
    confidence: f64,
    /// Style for the empty track
    track_style: Style,
}

impl ConfidenceBar {
    /// Creates a bar for `confidence`, filled in the score's color
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            track_style: Style::default().fg(Color::DarkGray),
        }
    }

    /// Cells of the bar for a given width
    fn cells(&self, width: usize) -> Vec<char> {
        let eighths = (self.confidence.clamp(0.0, 1.0) * (width * 8) as f64).round() as usize;
        let full = eighths / 8;
        let partial = eighths % 8;

        let mut cells = vec![EIGHTHS[7]; full];
        if partial > 0 {
            cells.push(EIGHTHS[partial - 1]);
        }
        cells.resize(width, TRACK);
        cells
    }
}

impl Widget for ConfidenceBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let fill_style = Style::default().fg(confidence_color(self.confidence));

        for (i, symbol) in self.cells(area.width as usize).into_iter().enumerate() {
            let style = if symbol == TRACK {
                self.track_style
            } else {
                fill_style
            };

            if let Some(cell) = buf.cell_mut((area.x + i as u16, area.y)) {
                cell.set_char(symbol).set_style(style);
            }
        }
    }
}
