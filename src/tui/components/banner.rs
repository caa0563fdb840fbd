//! # Banner Component
//!
//! Warning strip shown above the message list, one line per missing
//! configuration key. Renders nothing when every key is set.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::view::missing_key_warning;
use crate::tui::component::Component;

pub struct Banner<'a> {
    pub missing_keys: &'a [String],
}

impl<'a> Banner<'a> {
    pub fn new(missing_keys: &'a [String]) -> Self {
        Self { missing_keys }
    }

    pub fn height(missing_keys: &[String]) -> u16 {
        missing_keys.len() as u16
    }
}

impl<'a> Component for Banner<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.missing_keys.is_empty() {
            return;
        }
        let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = self
            .missing_keys
            .iter()
            .map(|key| Line::from(Span::styled(format!(" ! {}", missing_key_warning(key)), style)))
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}
