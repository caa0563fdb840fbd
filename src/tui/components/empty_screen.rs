//! # Empty Screen Component
//!
//! Onboarding shown while the conversation has no messages.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

const SUGGESTIONS: &[&str] = &[
    "How did the S&P 500 do this week?",
    "Explain the difference between an ETF and a mutual fund",
    "What does a rising 10-year yield mean for tech stocks?",
];

pub struct EmptyScreen;

impl Component for EmptyScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::DarkGray);

        let mut lines = vec![
            Line::from(Span::styled(
                "Charla",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Your markets assistant", dim)),
            Line::default(),
            Line::from("Try asking:"),
        ];
        lines.extend(
            SUGGESTIONS
                .iter()
                .map(|s| Line::from(Span::styled(format!("\"{s}\""), Style::default().fg(Color::Cyan)))),
        );
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("v{}  |  Ctrl+O conversations  |  Ctrl+C quit", env!("CARGO_PKG_VERSION")),
            dim,
        )));

        let [centered] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_renders_onboarding() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| EmptyScreen.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Charla"));
        assert!(text.contains("Try asking"));
        assert!(text.contains("Ctrl+O"));
    }
}
