//! # Toasts Component
//!
//! Short-lived notices stacked in the top-right corner. `Toasts` is the
//! persistent state (kept in `TuiState`); expired entries are pruned each
//! frame.

use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};

use crate::tui::component::Component;

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(6);
const TOAST_HEIGHT: u16 = 3;
const MAX_TOAST_WIDTH: u16 = 56;

#[derive(Debug, Clone)]
struct Toast {
    text: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Toasts {
    entries: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.entries.push(Toast {
            text: text.into(),
            expires_at: now + TOAST_TTL,
        });
    }

    /// Drop expired toasts. Returns true if any were removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.expires_at > now);
        self.entries.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Component for Toasts {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = MAX_TOAST_WIDTH.min(area.width);
        let x = area.x + area.width - width;
        let mut y = area.y;

        for toast in &self.entries {
            if y + TOAST_HEIGHT > area.y + area.height {
                break;
            }
            let rect = Rect::new(x, y, width, TOAST_HEIGHT);
            frame.render_widget(Clear, rect);
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Yellow));
            frame.render_widget(
                Paragraph::new(toast.text.as_str())
                    .style(Style::default().fg(Color::Yellow))
                    .block(block),
                rect,
            );
            y += TOAST_HEIGHT;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_toasts_expire() {
        let now = Instant::now();
        let mut toasts = Toasts::new();
        toasts.push("first", now);
        toasts.push("second", now + Duration::from_secs(3));

        assert!(!toasts.prune(now + Duration::from_secs(1)));
        assert_eq!(toasts.len(), 2);

        assert!(toasts.prune(now + TOAST_TTL));
        assert_eq!(toasts.len(), 1);

        toasts.prune(now + TOAST_TTL + Duration::from_secs(3));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_render_stacks_toasts() {
        let now = Instant::now();
        let mut toasts = Toasts::new();
        toasts.push("Missing OPENAI_API_KEY environment variable!", now);
        toasts.push("Second notice", now);

        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(|f| toasts.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Missing OPENAI_API_KEY"));
        assert!(text.contains("Second notice"));
    }
}
