//! # Ticker Component
//!
//! Scrolling strip of market symbols shown above the empty screen. Quotes
//! themselves come from an outside feed; this strip only animates the
//! configured symbol list.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::component::Component;

const SEPARATOR: &str = "   ·   ";

pub struct Ticker<'a> {
    pub symbols: &'a [String],
    /// Animation step; each step shifts the strip one column left.
    pub offset: usize,
}

impl<'a> Ticker<'a> {
    pub fn new(symbols: &'a [String], offset: usize) -> Self {
        Self { symbols, offset }
    }

    /// The visible window of the looping strip, `width` chars wide.
    fn window(&self, width: usize) -> String {
        if self.symbols.is_empty() || width == 0 {
            return String::new();
        }
        let tape: Vec<char> = self
            .symbols
            .iter()
            .map(|s| format!("{s}{SEPARATOR}"))
            .collect::<String>()
            .chars()
            .collect();
        let start = self.offset % tape.len();
        tape.iter().cycle().skip(start).take(width).collect()
    }
}

impl<'a> Component for Ticker<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        let strip = Paragraph::new(self.window(inner.width as usize))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(block);
        frame.render_widget(strip, area);
    }
}
